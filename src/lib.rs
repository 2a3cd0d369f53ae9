//! cxxmate - heuristic C/C++ structure model
//!
//! Answers "where should this go" questions about C/C++ code: header guards,
//! includes, accessors, new methods and out-of-line definitions. Symbol
//! outlines and definitions come from clangd; everything else is text
//! heuristics over the raw source.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;
pub mod source;

pub use error::{CxxError, CxxResult};
