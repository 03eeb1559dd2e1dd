//! Post-order chapter traversal.
//!
//! [`ChaptersMut`] walks a section tree lazily with an explicit stack: a
//! chapter is yielded only after every chapter nested below it. Sections
//! that are not chapters are skipped.
//!
//! While a chapter's children are being walked, the chapter itself is held
//! as a [`ChapterMut`] borrowing its fields, and its `sub_items` are borrowed
//! by the child frame. The borrows are disjoint, so every yielded view can be
//! mutated independently.

use std::slice::IterMut;

use serde_json::{Map, Value};

use crate::book::{Chapter, Section};

/// Mutable view of a chapter yielded by [`ChaptersMut`].
///
/// Only the content is writable; the rest of the chapter is read-only.
#[derive(Debug)]
pub struct ChapterMut<'a> {
    content: &'a mut String,
    source_path: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> ChapterMut<'a> {
    fn split(chapter: &'a mut Chapter) -> (Self, &'a mut Vec<Section>) {
        let Chapter {
            content,
            source_path,
            sub_items,
            extra,
        } = chapter;
        let source_path: &'a Option<String> = source_path;
        let extra: &'a Map<String, Value> = extra;
        let view = Self {
            content,
            source_path: source_path.as_deref(),
            name: extra.get("name").and_then(Value::as_str),
        };
        (view, sub_items)
    }

    /// Current chapter content.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content
    }

    /// Mutable access to the chapter content.
    pub fn content_mut(&mut self) -> &mut String {
        self.content
    }

    /// Replace the chapter content, returning the previous content.
    pub fn replace_content(&mut self, content: String) -> String {
        std::mem::replace(self.content, content)
    }

    /// Source path of the chapter, if any.
    #[must_use]
    pub fn source_path(&self) -> Option<&'a str> {
        self.source_path
    }

    /// Chapter name, if the host provided one.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// Label for diagnostics: the name, then the source path, then a placeholder.
    #[must_use]
    pub fn label(&self) -> &'a str {
        self.name.or(self.source_path).unwrap_or("<unnamed chapter>")
    }
}

/// One level of the traversal stack.
struct Frame<'a> {
    items: IterMut<'a, Section>,
    /// Chapter owning `items`, yielded once `items` is exhausted.
    /// `None` for the top-level frame.
    parent: Option<ChapterMut<'a>>,
}

/// Lazy post-order iterator over the chapters of a section tree.
///
/// Created by [`Book::chapters_mut`](crate::Book::chapters_mut) or
/// [`ChaptersMut::new`]. Each chapter is yielded exactly once.
pub struct ChaptersMut<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ChaptersMut<'a> {
    /// Start a traversal over the given sections.
    pub fn new(sections: &'a mut [Section]) -> Self {
        Self {
            stack: vec![Frame {
                items: sections.iter_mut(),
                parent: None,
            }],
        }
    }
}

impl<'a> Iterator for ChaptersMut<'a> {
    type Item = ChapterMut<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.items.next() {
                Some(Section::Chapter(chapter)) => {
                    let (view, children) = ChapterMut::split(chapter);
                    self.stack.push(Frame {
                        items: children.iter_mut(),
                        parent: Some(view),
                    });
                }
                Some(Section::Separator | Section::Other(_)) => {}
                None => {
                    if let Some(parent) = self.stack.pop().and_then(|frame| frame.parent) {
                        return Some(parent);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Book;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn chapter(content: &str, sub_items: Vec<Section>) -> Section {
        let mut chapter = Chapter::new(content, Some(format!("{content}.md").as_str()));
        chapter.sub_items = sub_items;
        Section::Chapter(chapter)
    }

    fn visit_order(book: &mut Book) -> Vec<String> {
        book.chapters_mut()
            .map(|chapter| chapter.content().to_owned())
            .collect()
    }

    #[test]
    fn test_empty_book() {
        let mut book = Book::new(Vec::new());
        assert_eq!(book.chapters_mut().count(), 0);
    }

    #[test]
    fn test_flat_sections_in_order() {
        let mut book = Book::new(vec![chapter("a", vec![]), chapter("b", vec![])]);
        assert_eq!(visit_order(&mut book), ["a", "b"]);
    }

    #[test]
    fn test_children_before_parent() {
        let mut book = Book::new(vec![
            chapter(
                "root",
                vec![
                    chapter("child1", vec![chapter("grandchild", vec![])]),
                    chapter("child2", vec![]),
                ],
            ),
            chapter("next", vec![]),
        ]);

        assert_eq!(
            visit_order(&mut book),
            ["grandchild", "child1", "child2", "root", "next"]
        );
    }

    #[test]
    fn test_non_chapter_sections_skipped() {
        let mut book = Book::new(vec![
            Section::Other(json!({"PartTitle": "Part I"})),
            chapter("a", vec![Section::Separator, chapter("b", vec![])]),
            Section::Separator,
            Section::Other(json!({})),
        ]);

        assert_eq!(visit_order(&mut book), ["b", "a"]);
    }

    #[test]
    fn test_deep_nesting() {
        let mut nested = chapter("0", vec![]);
        for depth in 1..200 {
            nested = chapter(&depth.to_string(), vec![nested]);
        }
        let mut book = Book::new(vec![nested]);

        let order = visit_order(&mut book);

        assert_eq!(order.len(), 200);
        assert_eq!(order.first().map(String::as_str), Some("0"));
        assert_eq!(order.last().map(String::as_str), Some("199"));
    }

    #[test]
    fn test_mutation_through_views() {
        let mut book = Book::new(vec![chapter("p", vec![chapter("c", vec![])])]);

        for mut view in book.chapters_mut() {
            let upper = view.content().to_uppercase();
            view.replace_content(upper);
        }

        let Section::Chapter(parent) = &book.sections[0] else {
            panic!("expected chapter");
        };
        let Section::Chapter(child) = &parent.sub_items[0] else {
            panic!("expected chapter");
        };
        assert_eq!(parent.content, "P");
        assert_eq!(child.content, "C");
    }

    #[test]
    fn test_view_exposes_source_path_and_name() {
        let mut inner = Chapter::new("text", Some("ip/uart/data/uart.hjson"));
        inner.extra.insert("name".to_owned(), json!("UART"));
        let mut book = Book::new(vec![
            Section::Chapter(inner),
            Section::Chapter(Chapter::new("draft", None)),
        ]);

        let views: Vec<_> = book
            .chapters_mut()
            .map(|view| (view.source_path(), view.name(), view.label()))
            .collect();

        assert_eq!(
            views,
            [
                (Some("ip/uart/data/uart.hjson"), Some("UART"), "UART"),
                (None, None, "<unnamed chapter>"),
            ]
        );
    }

    #[test]
    fn test_restart_yields_same_order() {
        let mut book = Book::new(vec![chapter("a", vec![chapter("b", vec![])])]);

        let first = visit_order(&mut book);
        let second = visit_order(&mut book);

        assert_eq!(first, second);
    }
}
