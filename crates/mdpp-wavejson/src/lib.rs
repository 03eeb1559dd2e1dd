//! Waveform block expansion.
//!
//! Replaces fenced blocks tagged `wavejson` with WaveDrom script elements
//! that the WaveDrom viewer renders in the browser:
//!
//! ````text
//! ```wavejson
//! {signal: [{name: "clk", wave: "p..."}]}
//! ```
//! ````
//!
//! becomes
//!
//! ```text
//! <script type="WaveDrom">{signal: [{name: "clk", wave: "p..."}]}</script>
//! ```
//!
//! The block body is copied verbatim; it is not parsed or validated. Running
//! the expansion again is a no-op as long as no block body itself contains a
//! `wavejson` fence opener. Such a body survives into the script element and
//! can pair with a later closing fence on the next run.

use std::convert::Infallible;

use mdpp_book::{ChapterMut, Context};
use mdpp_config::{ConfigError, WAVEJSON, WaveJsonConfig};
use mdpp_preprocess::{ChapterGenerator, FencePattern, Rewrite};

/// Wrap waveform source in a WaveDrom script element.
#[must_use]
pub fn script_tag(source: &str) -> String {
    format!(r#"<script type="WaveDrom">{source}</script>"#)
}

/// Generator expanding fenced waveform blocks in chapter content.
#[derive(Debug, Clone)]
pub struct WaveJsonGenerator {
    pattern: FencePattern,
}

impl WaveJsonGenerator {
    /// Create a generator for blocks tagged with `language`.
    pub fn new(language: &str) -> Result<Self, ConfigError> {
        let pattern = FencePattern::new(language)
            .map_err(|e| ConfigError::Validation(format!("invalid fence language: {e}")))?;
        Ok(Self { pattern })
    }

    /// Create a generator from validated configuration.
    pub fn from_config(config: &WaveJsonConfig) -> Result<Self, ConfigError> {
        Self::new(&config.language)
    }

    /// Create a generator from the `[preprocessor.wavejson]` table of the context.
    pub fn from_context(ctx: &Context) -> Result<Self, ConfigError> {
        let config = WaveJsonConfig::load(ctx.preprocessor_config(WAVEJSON))?;
        Self::from_config(&config)
    }

    /// Expand every waveform block in `content`.
    #[must_use]
    pub fn expand(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, |block| script_tag(block.inner))
            .into_owned()
    }
}

impl ChapterGenerator for WaveJsonGenerator {
    type Error = Infallible;

    fn name(&self) -> &str {
        WAVEJSON
    }

    fn matches(&self, chapter: &ChapterMut<'_>) -> bool {
        self.pattern.is_match(chapter.content())
    }

    fn generate(&self, _ctx: &Context, chapter: &ChapterMut<'_>) -> Result<Rewrite, Infallible> {
        Ok(Rewrite::Replace(self.expand(chapter.content())))
    }
}
