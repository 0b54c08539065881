//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive a crawl or clean run and
//! helpers to load them from disk and the environment.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
