//! Polyglot opening book reader.
//!
//! - [`book`]: record decoding, the in-memory book and position lookup
//! - [`types`]: chess crate re-exports and shakmaty conversions
//! - [`shell`]: line-oriented command front end over a loaded book

pub mod book;
pub mod shell;
pub mod types;
