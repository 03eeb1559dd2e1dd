//! HTML rendering of parsed descriptors.
//!
//! Both renderers append to a `String` sink. They never emit heading
//! elements: descriptions written in Markdown have their headings demoted to
//! paragraphs and raw HTML escaped, so the caller controls the only headings
//! of the generated chapter.

mod interface;
mod registers;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

pub use interface::render_interfaces;
pub use registers::render_registers;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render a Markdown description to HTML.
///
/// The output never contains a blank line. The generated chapter is raw HTML
/// to mdBook, and a blank line would end the HTML block and let the rest of a
/// code block be read as Markdown again. Code block text therefore keeps its
/// line breaks as `&#10;`.
pub(crate) fn render_markdown(text: &str, out: &mut String) {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut in_code = false;
    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::Start(Tag::Heading { .. }) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::Heading(_)) => Event::End(TagEnd::Paragraph),
        Event::Start(Tag::CodeBlock(kind)) => {
            in_code = true;
            Event::Start(Tag::CodeBlock(kind))
        }
        Event::End(TagEnd::CodeBlock) => {
            in_code = false;
            Event::End(TagEnd::CodeBlock)
        }
        Event::Text(code) if in_code => {
            Event::Html(escape_html(&code).replace('\n', "&#10;").into())
        }
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        other => other,
    });
    pulldown_cmark::html::push_html(out, events);
}

/// First line of a description, escaped, for summary tables.
pub(crate) fn summary_line(desc: Option<&str>) -> String {
    desc.and_then(|d| d.lines().map(str::trim).find(|line| !line.is_empty()))
        .map(escape_html)
        .unwrap_or_default()
}
