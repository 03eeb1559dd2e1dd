//! Book model shared by mdpp preprocessors.
//!
//! The host build tool hands a preprocessor a `[context, book]` pair as JSON.
//! This crate provides typed views over both halves:
//! - [`Context`]: read-only invocation metadata (book root, host configuration)
//! - [`Book`]: the section tree, where only chapter `content` is ever rewritten
//! - [`ChaptersMut`]: post-order traversal yielding mutable chapter views
//!
//! Fields the model does not interpret are carried through untouched, so a
//! book that is deserialized and serialized again keeps its shape.
//!
//! # Example
//!
//! ```
//! use mdpp_book::Book;
//!
//! let mut book: Book = serde_json::from_str(
//!     r#"{"sections":[{"Chapter":{"content":"a","sub_items":[]}}]}"#,
//! ).unwrap();
//!
//! for mut chapter in book.chapters_mut() {
//!     chapter.content_mut().push('!');
//! }
//! ```

mod book;
mod context;
mod walk;

pub use book::{Book, Chapter, Section};
pub use context::Context;
pub use walk::{ChapterMut, ChaptersMut};
