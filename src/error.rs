use std::path::PathBuf;

use thiserror::Error;

/// Catalog (SQLite) failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create store directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reading tags from a single file failed. Never fatal for a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not read tags: {0}")]
    Read(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A track whose tags do not satisfy the catalog constraints.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("artist is missing")]
    MissingArtist,

    #[error("title is missing")]
    MissingTitle,

    #[error("artist has {0} characters (allowed 1..=192)")]
    ArtistLength(usize),

    #[error("title has {0} characters (allowed 1..=192)")]
    TitleLength(usize),
}

/// Errors that abort a whole crawl or clean run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("naming rules file {path}: {message}")]
    RulesFile { path: PathBuf, message: String },

    /// The naming rules produced nothing for a valid track. This is a setup
    /// defect, so the run stops instead of filing tracks nowhere.
    #[error("naming rules produced an empty path for {path}")]
    EmptyTargetPath { path: PathBuf },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
