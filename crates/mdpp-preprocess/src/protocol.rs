//! Two-mode preprocessor protocol.
//!
//! The host runs a preprocessor in one of two ways:
//!
//! - `<command> supports <renderer>`: exit status answers whether the
//!   renderer is supported. Standard input is not read.
//! - `<command>`: standard input holds a JSON `[context, book]` pair; the
//!   transformed book is written to standard output as JSON.
//!
//! The book is serialized into a buffer before anything is written, so a
//! failed transform never leaves a partial document on standard output.

use std::io::{Read, Write};

use mdpp_book::{Book, Context};
use mdpp_config::ConfigError;

use crate::engine::{Stats, process_book};
use crate::error::PreprocessError;
use crate::generator::ChapterGenerator;

/// The only renderer mdpp preprocessors produce output for.
pub const SUPPORTED_RENDERER: &str = "html";

/// Verb of a capability query.
const QUERY_VERB: &str = "supports";

/// A capability query: the first two invocation tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityQuery {
    pub verb: String,
    pub renderer: String,
}

impl CapabilityQuery {
    /// Whether the query is exactly `supports html`.
    ///
    /// Comparison is exact and case-sensitive.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.verb == QUERY_VERB && self.renderer == SUPPORTED_RENDERER
    }
}

/// Invocation mode selected from positional tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Two or more tokens: answer a capability query.
    Query(CapabilityQuery),
    /// Fewer than two tokens: transform a book.
    Transform,
}

impl Mode {
    /// Select the mode from positional tokens (program name excluded).
    ///
    /// Tokens past the second are ignored.
    ///
    /// ```
    /// use mdpp_preprocess::Mode;
    ///
    /// assert!(matches!(Mode::from_tokens(["supports", "html"]), Mode::Query(q) if q.is_supported()));
    /// assert_eq!(Mode::from_tokens(Vec::<String>::new()), Mode::Transform);
    /// ```
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);
        match (tokens.next(), tokens.next()) {
            (Some(verb), Some(renderer)) => {
                let ignored = tokens.count();
                if ignored > 0 {
                    tracing::warn!(ignored, "Ignoring extra capability query arguments");
                }
                Self::Query(CapabilityQuery { verb, renderer })
            }
            _ => Self::Transform,
        }
    }
}

/// Successful result of [`handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Capability query answered positively.
    Supported,
    /// Capability query answered negatively. The process should fail.
    Unsupported,
    /// Book transformed and written.
    Transformed(Stats),
}

/// Run one invocation of the protocol.
///
/// In transform mode the whole input is read, parsed as `[context, book]`,
/// handed to the generator built by `build`, and the book (without the
/// context) is written to `output` followed by a newline. Any failure is
/// returned before `output` is touched.
pub fn handle<G, F, R, W>(
    mode: &Mode,
    mut input: R,
    mut output: W,
    build: F,
) -> Result<Outcome, PreprocessError>
where
    G: ChapterGenerator,
    F: FnOnce(&Context) -> Result<G, ConfigError>,
    R: Read,
    W: Write,
{
    match mode {
        Mode::Query(query) => {
            let supported = query.is_supported();
            tracing::debug!(
                verb = %query.verb,
                renderer = %query.renderer,
                supported,
                "Capability query"
            );
            Ok(if supported {
                Outcome::Supported
            } else {
                Outcome::Unsupported
            })
        }
        Mode::Transform => {
            let mut raw = String::new();
            input.read_to_string(&mut raw)?;

            let (ctx, mut book): (Context, Book) =
                serde_json::from_str(&raw).map_err(PreprocessError::Input)?;
            if let Some(renderer) = ctx.renderer()
                && renderer != SUPPORTED_RENDERER
            {
                tracing::warn!(renderer, "Running for a renderer this preprocessor does not target");
            }

            let generator = build(&ctx)?;
            let stats = process_book(&ctx, &mut book, &generator)?;

            let mut json = serde_json::to_vec(&book).map_err(PreprocessError::Output)?;
            json.push(b'\n');
            output.write_all(&json)?;
            output.flush()?;

            Ok(Outcome::Transformed(stats))
        }
    }
}
