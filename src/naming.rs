//! Naming rule engine.
//!
//! Turns track tags into the canonical path a track should live at. The
//! engine is a pure function of a [`RuleTable`] and a [`Track`]; it never
//! touches the filesystem and leaves root prefixes and separators to callers.
//!
//! [`Track`]: crate::library::Track

mod generator;
mod rules;
mod sanitize;

pub use generator::RuleTable;
pub use rules::*;
pub use sanitize::clear_string;
