//! Book traversal and rewriting.

use mdpp_book::{Book, Context};

use crate::error::PreprocessError;
use crate::generator::ChapterGenerator;
use crate::rewrite;

/// Counters collected while processing a book.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Chapters visited.
    pub chapters: usize,
    /// Chapters accepted by the generator.
    pub matched: usize,
    /// Chapters whose content changed.
    pub rewritten: usize,
}

/// Run a generator over every chapter of a book, rewriting in place.
///
/// Chapters are visited children first. The first generator error aborts
/// processing; chapters rewritten before it stay rewritten in `book`, so the
/// caller must discard the book on error.
pub fn process_book<G: ChapterGenerator>(
    ctx: &Context,
    book: &mut Book,
    generator: &G,
) -> Result<Stats, PreprocessError> {
    let mut stats = Stats::default();

    for mut chapter in book.chapters_mut() {
        stats.chapters += 1;
        if !generator.matches(&chapter) {
            continue;
        }
        stats.matched += 1;

        let label = chapter.label();
        let output = generator
            .generate(ctx, &chapter)
            .map_err(|e| PreprocessError::Generate {
                preprocessor: generator.name().to_owned(),
                chapter: label.to_owned(),
                source: Box::new(e),
            })?;

        if rewrite::apply(&mut chapter, output) {
            stats.rewritten += 1;
            tracing::debug!(preprocessor = generator.name(), chapter = label, "Rewrote chapter");
        }
    }

    tracing::info!(
        preprocessor = generator.name(),
        chapters = stats.chapters,
        matched = stats.matched,
        rewritten = stats.rewritten,
        "Book processed"
    );
    Ok(stats)
}
