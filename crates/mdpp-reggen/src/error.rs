//! Descriptor error types.

/// Error raised while reading a register descriptor.
///
/// Every variant names the descriptor origin (e.g. `file at /book/ip/uart/data/uart.hjson`).
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The text is not valid Hjson.
    #[error("{origin}: invalid Hjson: {source}")]
    Syntax {
        origin: String,
        #[source]
        source: deser_hjson::Error,
    },

    /// The document parsed but does not have the descriptor shape.
    #[error("{origin}: {context}: {source}")]
    Shape {
        origin: String,
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The descriptor is well-formed but inconsistent.
    #[error("{origin}: {message}")]
    Invalid { origin: String, message: String },
}

/// Error raised while generating a register chapter.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError<E> {
    /// The descriptor could not be parsed.
    #[error(transparent)]
    Parse(E),

    #[error("failed to write register documentation: {0}")]
    Render(#[from] std::fmt::Error),
}
