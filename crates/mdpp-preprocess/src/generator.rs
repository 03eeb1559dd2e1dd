//! Generator trait implemented by each preprocessor.

use mdpp_book::{ChapterMut, Context};

/// Result of generating replacement content for a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Leave the chapter content as it is.
    Unchanged,
    /// Replace the whole chapter content.
    Replace(String),
}

/// Strategy deciding which chapters a preprocessor rewrites, and how.
///
/// The engine calls [`matches`](Self::matches) for every chapter and
/// [`generate`](Self::generate) only for those that match. Both must be pure
/// with respect to the book: the engine applies the returned [`Rewrite`].
///
/// # Example
///
/// ```ignore
/// struct Shout;
///
/// impl ChapterGenerator for Shout {
///     type Error = std::convert::Infallible;
///
///     fn name(&self) -> &str {
///         "shout"
///     }
///
///     fn matches(&self, chapter: &ChapterMut<'_>) -> bool {
///         chapter.content().contains('!')
///     }
///
///     fn generate(&self, _ctx: &Context, chapter: &ChapterMut<'_>) -> Result<Rewrite, Self::Error> {
///         Ok(Rewrite::Replace(chapter.content().to_uppercase()))
///     }
/// }
/// ```
pub trait ChapterGenerator {
    /// Error returned when a matched chapter cannot be processed.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Preprocessor name, used in diagnostics.
    fn name(&self) -> &str;

    /// Whether the chapter qualifies for rewriting.
    fn matches(&self, chapter: &ChapterMut<'_>) -> bool;

    /// Produce the new content of a matched chapter.
    fn generate(&self, ctx: &Context, chapter: &ChapterMut<'_>) -> Result<Rewrite, Self::Error>;
}
