//! Applies generator output back into chapters.

use mdpp_book::ChapterMut;

use crate::generator::Rewrite;

/// Apply a rewrite to a chapter in place.
///
/// Returns `true` if the content changed. A replacement equal to the current
/// content is not counted as a change.
pub(crate) fn apply(chapter: &mut ChapterMut<'_>, rewrite: Rewrite) -> bool {
    match rewrite {
        Rewrite::Unchanged => false,
        Rewrite::Replace(content) if content == chapter.content() => false,
        Rewrite::Replace(content) => {
            chapter.replace_content(content);
            true
        }
    }
}
