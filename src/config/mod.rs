//! Configuration module for bucketfill
//!
//! Provides types and parsing for `bfill.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
