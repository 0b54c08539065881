use std::fmt;

use crate::error::TrackError;

/// Longest artist or title the catalog accepts, in characters.
pub const MAX_FIELD_LEN: usize = 192;

/// One catalog row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    /// Assigned by the store on first insert.
    pub id: Option<i64>,
    /// Current location below the library root, `/`-separated with a leading `/`.
    pub file_path: String,
    /// Where the naming rules want the file, as of the last tag read.
    pub target_file_path: Option<String>,
    pub file_path_correct: bool,
    /// File mtime (epoch millis) at the last accepted tag read or move.
    pub modification_date: Option<i64>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub track: Option<String>,
    pub genre: Option<i32>,
    pub genre_description: Option<String>,
}

/// Tag values read from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub track: Option<String>,
    pub genre_code: Option<i32>,
    pub genre_description: Option<String>,
}

impl Track {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Replace the tag-derived columns with a fresh read.
    pub fn apply_tags(&mut self, tags: TrackTags) {
        self.album = tags.album;
        self.artist = tags.artist;
        self.title = tags.title;
        self.track = tags.track;
        self.genre = tags.genre_code;
        self.genre_description = tags.genre_description;
    }

    /// Check the columns the catalog requires before a row may be stored.
    pub fn validate(&self) -> Result<(), TrackError> {
        let artist = self.artist.as_deref().ok_or(TrackError::MissingArtist)?;
        let len = artist.chars().count();
        if !(1..=MAX_FIELD_LEN).contains(&len) {
            return Err(TrackError::ArtistLength(len));
        }

        let title = self.title.as_deref().ok_or(TrackError::MissingTitle)?;
        let len = title.chars().count();
        if !(1..=MAX_FIELD_LEN).contains(&len) {
            return Err(TrackError::TitleLength(len));
        }
        Ok(())
    }
}

fn opt<T: fmt::Display>(v: &Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "track #{} '{}' - '{}' ({}, #{}, genre {}) at {} -> {}",
            opt(&self.id),
            opt(&self.artist),
            opt(&self.title),
            opt(&self.album),
            opt(&self.track),
            opt(&self.genre_description),
            self.file_path,
            opt(&self.target_file_path),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Track {
        Track {
            artist: Some("Artist".into()),
            title: Some("Title".into()),
            ..Track::new("/a.mp3")
        }
    }

    #[test]
    fn validate_accepts_regular_track() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_missing_and_empty_fields() {
        let mut t = valid();
        t.artist = None;
        assert_eq!(t.validate(), Err(TrackError::MissingArtist));

        let mut t = valid();
        t.title = Some(String::new());
        assert_eq!(t.validate(), Err(TrackError::TitleLength(0)));
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let mut t = valid();
        t.artist = Some("ü".repeat(MAX_FIELD_LEN));
        assert_eq!(t.validate(), Ok(()));

        t.artist = Some("a".repeat(MAX_FIELD_LEN + 1));
        assert_eq!(t.validate(), Err(TrackError::ArtistLength(MAX_FIELD_LEN + 1)));
    }

    #[test]
    fn apply_tags_replaces_previous_values() {
        let mut t = valid();
        t.album = Some("Old".into());
        t.apply_tags(TrackTags {
            artist: Some("New".into()),
            title: Some("Song".into()),
            genre_code: Some(17),
            ..TrackTags::default()
        });
        assert_eq!(t.album, None);
        assert_eq!(t.artist.as_deref(), Some("New"));
        assert_eq!(t.genre, Some(17));
        assert_eq!(t.file_path, "/a.mp3");
    }
}
