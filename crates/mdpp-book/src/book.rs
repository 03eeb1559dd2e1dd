//! Section tree types.
//!
//! Sections are externally tagged the way the host serializes them:
//! `{"Chapter": {...}}`, the bare string `"Separator"`, or anything else
//! (part titles, future variants) which is kept as opaque JSON.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::walk::ChaptersMut;

/// Key of the chapter variant in a serialized section.
const CHAPTER_TAG: &str = "Chapter";

/// Serialized form of the separator variant.
const SEPARATOR_TAG: &str = "Separator";

/// Top-level document handed over by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Top-level sections in reading order.
    pub sections: Vec<Section>,
    /// Fields not interpreted by preprocessors.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Book {
    /// Create a book from its top-level sections.
    #[must_use]
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            extra: Map::new(),
        }
    }

    /// Iterate over every chapter in the book, children before parents.
    pub fn chapters_mut(&mut self) -> ChaptersMut<'_> {
        ChaptersMut::new(&mut self.sections)
    }
}

/// One entry of a section list.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// A chapter with content and nested sections.
    Chapter(Chapter),
    /// Visual separator between chapters.
    Separator,
    /// Any other section kind, passed through unchanged.
    Other(Value),
}

/// A document node carrying renderable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Markdown content of the chapter.
    pub content: String,
    /// Path of the originating file, relative to the book source directory.
    ///
    /// `None` for synthetic and draft chapters.
    #[serde(default)]
    pub source_path: Option<String>,
    /// Nested sections owned by this chapter.
    pub sub_items: Vec<Section>,
    /// Fields not interpreted by preprocessors (`name`, `number`, `path`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chapter {
    /// Create a chapter with the given content and no children.
    #[must_use]
    pub fn new(content: impl Into<String>, source_path: Option<&str>) -> Self {
        Self {
            content: content.into(),
            source_path: source_path.map(str::to_owned),
            sub_items: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Display name of the chapter, if the host provided one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Chapter(chapter) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(CHAPTER_TAG, chapter)?;
                map.end()
            }
            Self::Separator => serializer.serialize_str(SEPARATOR_TAG),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(tag) if tag == SEPARATOR_TAG => Ok(Self::Separator),
            Value::Object(mut map) if map.contains_key(CHAPTER_TAG) => {
                if map.len() != 1 {
                    return Err(D::Error::custom(
                        "chapter section must not carry keys besides `Chapter`",
                    ));
                }
                let chapter = map.remove(CHAPTER_TAG).unwrap_or(Value::Null);
                Chapter::deserialize(chapter)
                    .map(Self::Chapter)
                    .map_err(|e| D::Error::custom(format!("invalid chapter: {e}")))
            }
            other => Ok(Self::Other(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_chapter_roundtrip_keeps_unknown_fields() {
        let input = json!({
            "sections": [{
                "Chapter": {
                    "name": "Intro",
                    "content": "# Intro\n",
                    "number": [1],
                    "sub_items": [],
                    "path": "intro.md",
                    "source_path": "intro.md",
                    "parent_names": []
                }
            }],
            "__non_exhaustive": null
        });

        let book: Book = serde_json::from_value(input.clone()).unwrap();
        let output = serde_json::to_value(&book).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_separator_and_part_title() {
        let input = json!({
            "sections": ["Separator", {"PartTitle": "Reference"}, {}]
        });

        let book: Book = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(book.sections[0], Section::Separator);
        assert_eq!(
            book.sections[1],
            Section::Other(json!({"PartTitle": "Reference"}))
        );
        assert_eq!(book.sections[2], Section::Other(json!({})));
        assert_eq!(serde_json::to_value(&book).unwrap(), input);
    }

    #[test]
    fn test_missing_source_path_is_none() {
        let chapter: Chapter =
            serde_json::from_value(json!({"content": "", "sub_items": []})).unwrap();
        assert_eq!(chapter.source_path, None);

        let chapter: Chapter =
            serde_json::from_value(json!({"content": "", "source_path": null, "sub_items": []}))
                .unwrap();
        assert_eq!(chapter.source_path, None);
    }

    #[test]
    fn test_chapter_without_content_is_rejected() {
        let result: Result<Book, _> =
            serde_json::from_value(json!({"sections": [{"Chapter": {"sub_items": []}}]}));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid chapter"), "{err}");
        assert!(err.contains("content"), "{err}");
    }

    #[test]
    fn test_chapter_without_sub_items_is_rejected() {
        let result: Result<Book, _> =
            serde_json::from_value(json!({"sections": [{"Chapter": {"content": "x"}}]}));

        assert!(result.unwrap_err().to_string().contains("sub_items"));
    }

    #[test]
    fn test_nested_malformed_chapter_is_rejected() {
        let result: Result<Book, _> = serde_json::from_value(json!({
            "sections": [{"Chapter": {
                "content": "x",
                "sub_items": [{"Chapter": {"content": 5, "sub_items": []}}]
            }}]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_extra_keys_beside_chapter_are_rejected() {
        let result: Result<Book, _> = serde_json::from_value(json!({
            "sections": [{"Chapter": {"content": "x", "sub_items": []}, "Other": 1}]
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_sections_is_rejected() {
        let result: Result<Book, _> = serde_json::from_value(json!({"items": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_chapter_name() {
        let mut chapter = Chapter::new("text", Some("a.md"));
        assert_eq!(chapter.name(), None);

        chapter.extra.insert("name".to_owned(), json!("Overview"));
        assert_eq!(chapter.name(), Some("Overview"));
    }
}
