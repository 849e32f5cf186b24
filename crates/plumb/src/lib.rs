//! Plumb command-line surface, exposed as a library for integration tests

#![warn(rust_2024_compatibility, clippy::all)]
#![allow(clippy::needless_pass_by_value, clippy::missing_errors_doc)]

pub mod census;
pub mod cli;
pub mod config;
pub mod files;
pub mod lint;
pub mod occupy;
pub mod output;
pub mod regime;
