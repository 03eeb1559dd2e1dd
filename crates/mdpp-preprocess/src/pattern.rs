//! Chapter matching primitives.
//!
//! Two kinds of rules select chapters:
//! - [`PathPattern`]: a regular expression searched in the chapter source path
//! - [`FencePattern`]: fenced blocks tagged with a given info string
//!
//! Both are pure: matching never touches the chapter.

use std::borrow::Cow;
use std::ops::Range;

use regex::{Captures, Regex};

/// Regular expression over chapter source paths.
///
/// The expression is searched anywhere in the path; anchor it with `^`/`$`
/// to require a full match. Backslash separators are normalized to `/`
/// before matching so one pattern works for host paths on every platform.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
}

impl PathPattern {
    /// Compile a path pattern.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Whether a chapter with this source path qualifies.
    ///
    /// Chapters without a source path never match.
    #[must_use]
    pub fn matches(&self, source_path: Option<&str>) -> bool {
        let Some(path) = source_path else {
            return false;
        };
        if path.contains('\\') {
            self.regex.is_match(&path.replace('\\', "/"))
        } else {
            self.regex.is_match(path)
        }
    }

    /// Source text of the compiled expression.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A fenced block found in chapter content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'c> {
    /// Byte range of the whole block, fences included.
    pub span: Range<usize>,
    /// Text between the opening and closing fence lines.
    pub inner: &'c str,
}

/// Fenced blocks with a fixed info string.
///
/// A block opens with three backticks immediately followed by the info
/// string and a newline, and closes at the first following newline plus
/// three backticks. The inner text must be non-empty. Blocks are found left
/// to right and never overlap.
///
/// ```
/// use mdpp_preprocess::FencePattern;
///
/// let pattern = FencePattern::new("wavejson").unwrap();
/// let blocks: Vec<_> = pattern.find_iter("a\n```wavejson\n{x:1}\n```\nb").collect();
///
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].inner, "{x:1}");
/// ```
#[derive(Debug, Clone)]
pub struct FencePattern {
    regex: Regex,
}

impl FencePattern {
    /// Build a pattern for blocks tagged with `language`.
    pub fn new(language: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(
            r"(?s)```{}\n(.+?)\n```",
            regex::escape(language)
        ))?;
        Ok(Self { regex })
    }

    /// Whether the content contains at least one block.
    #[must_use]
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }

    /// Iterate over blocks in left-to-right order.
    pub fn find_iter<'r, 'c>(
        &'r self,
        content: &'c str,
    ) -> impl Iterator<Item = FencedBlock<'c>> {
        self.regex
            .captures_iter(content)
            .filter_map(|caps| to_block(&caps))
    }

    /// Replace every block in a single pass, leaving other text untouched.
    ///
    /// Returns [`Cow::Borrowed`] when the content has no blocks.
    pub fn replace_all<'c, F>(&self, content: &'c str, mut replacement: F) -> Cow<'c, str>
    where
        F: FnMut(&FencedBlock<'_>) -> String,
    {
        self.regex.replace_all(content, |caps: &Captures<'_>| {
            to_block(caps).map_or_else(String::new, |block| replacement(&block))
        })
    }
}

fn to_block<'c>(caps: &Captures<'c>) -> Option<FencedBlock<'c>> {
    let whole = caps.get(0)?;
    let inner = caps.get(1)?;
    Some(FencedBlock {
        span: whole.range(),
        inner: inner.as_str(),
    })
}
