//! Invocation context sent alongside the book.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read-only metadata accompanying a book.
///
/// Only `root` is required. The host configuration, renderer name and
/// host version are reachable through accessors when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Book root directory, used to resolve chapter source paths.
    pub root: String,
    /// Everything else the host sent (`config`, `renderer`, `mdbook_version`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Context {
    /// Create a context with only a root directory.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extra: Map::new(),
        }
    }

    /// Book root as a path.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        Path::new(&self.root)
    }

    /// Name of the renderer the book is being built for.
    #[must_use]
    pub fn renderer(&self) -> Option<&str> {
        self.extra.get("renderer").and_then(Value::as_str)
    }

    /// Version of the host tool that produced the input.
    #[must_use]
    pub fn host_version(&self) -> Option<&str> {
        self.extra.get("mdbook_version").and_then(Value::as_str)
    }

    /// The `[preprocessor.<name>]` table of the host configuration.
    #[must_use]
    pub fn preprocessor_config(&self, name: &str) -> Option<&Value> {
        self.extra.get("config")?.get("preprocessor")?.get(name)
    }

    /// Human-readable origin label for a chapter source path.
    ///
    /// ```
    /// use mdpp_book::Context;
    ///
    /// let ctx = Context::new("/book");
    /// assert_eq!(ctx.origin_label("ip/uart/data/uart.hjson"), "file at /book/ip/uart/data/uart.hjson");
    /// ```
    #[must_use]
    pub fn origin_label(&self, source_path: &str) -> String {
        format!("file at {}/{source_path}", self.root)
    }
}
