//! Common types, route definitions, and errors shared across `dicer` crates.

pub mod error;
pub mod protocol;

pub use error::ConfigError;
pub use protocol::{DieFace, Route};
