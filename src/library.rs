//! The catalog and the reconciliation engine.
//!
//! A crawl walks the library root and upserts one row per MP3 ([`crawl`]),
//! the relocator moves misplaced files to where the naming rules want them
//! ([`relocate`]) and the pruner removes directories left empty ([`prune`]).
//! The cleaner ([`cleaner`]) runs separately against the catalog alone.

mod cleaner;
mod crawl;
mod extract;
mod model;
mod paths;
mod prune;
mod relocate;
mod store;

pub use cleaner::CatalogCleaner;
pub use crawl::Reconciler;
pub use extract::TagExtractor;
pub use model::Track;
pub use prune::prune_empty_dirs;
pub use relocate::Relocator;
pub use store::{SqliteStore, TrackStore};
