//! colmap command-line front end.
//!
//! Loads a record shape from a JSON schema file and records from JSON
//! documents, then runs the `colmap-core` builders and diffing over them.

pub mod cli;
pub mod json;
pub mod schema;

pub use cli::{run, Cli, ColumnMode, Commands, SetStyle};
