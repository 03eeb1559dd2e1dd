//! Preprocessor error types.

use mdpp_config::ConfigError;

/// Error that aborts a transform.
///
/// Every variant is fatal: the book is never written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Standard input is not a `[context, book]` pair of the expected shape.
    #[error("Malformed preprocessor input: {0}")]
    Input(#[source] serde_json::Error),

    #[error("Failed to serialize book: {0}")]
    Output(#[source] serde_json::Error),

    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The generator failed on a matched chapter.
    #[error("{preprocessor}: failed to process chapter '{chapter}': {source}")]
    Generate {
        preprocessor: String,
        chapter: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
