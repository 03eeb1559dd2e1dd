//! Preprocessor protocol and chapter rewriting engine.
//!
//! A preprocessor is a process the host book builder runs once per build.
//! It is asked either whether it supports a renderer, or to transform a book
//! read from standard input. This crate implements both halves of that
//! contract and the engine shared by every preprocessor:
//!
//! - [`ChapterGenerator`]: the per-preprocessor strategy deciding which
//!   chapters qualify and what their content becomes
//! - [`PathPattern`] and [`FencePattern`]: matching primitives over source
//!   paths and fenced blocks
//! - [`process_book`]: walks the book, asks the generator, rewrites chapters
//! - [`handle`]: the two-mode protocol over any reader/writer pair
//!
//! # Example
//!
//! ```ignore
//! use mdpp_preprocess::{Mode, Outcome, handle};
//!
//! let mode = Mode::from_tokens(std::env::args().skip(1));
//! let outcome = handle(&mode, std::io::stdin().lock(), std::io::stdout().lock(), |ctx| {
//!     MyGenerator::from_context(ctx)
//! })?;
//! ```

mod engine;
mod error;
mod generator;
mod pattern;
mod protocol;
mod rewrite;

pub use engine::{Stats, process_book};
pub use error::PreprocessError;
pub use generator::{ChapterGenerator, Rewrite};
pub use pattern::{FencePattern, FencedBlock, PathPattern};
pub use protocol::{CapabilityQuery, Mode, Outcome, SUPPORTED_RENDERER, handle};
