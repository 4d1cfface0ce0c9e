//! Quarry is a tag-based file catalogue with a boolean query language.
//!
//! Files are tagged with names, optionally paired with values (`year=2017`),
//! and queried with expressions like `music and not (live or bootleg)`.
//! Implication rules ("mp3 implies music") are honored transitively when
//! queries run. The query pipeline of lexer, recursive-descent parser and
//! implication-aware SQL compiler lives in [`query`]; the SQLite-backed
//! catalogue in [`storage`]; the command implementations in [`cli`].

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;

pub use error::{Error, Result};
