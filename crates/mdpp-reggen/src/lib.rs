//! Register descriptor chapter expansion.
//!
//! Chapters whose source path matches the configured pattern (by default
//! `ip/<block>/data/<file>.hjson`) hold a hardware block descriptor. Their
//! content is replaced by generated documentation with exactly two headings:
//!
//! ```text
//! ## Hardware Interface
//!
//! <interface summary>
//!
//! ## Registers
//!
//! <register tables>
//! ```
//!
//! Parsing and rendering go through a [`RegisterBackend`]; [`NativeBackend`]
//! reads Hjson descriptors and renders HTML. A descriptor that fails to parse
//! fails the whole run: a book with a silently missing register section is
//! worse than a failed build.

mod backend;
pub mod descriptor;
mod error;
pub mod html;

use mdpp_book::{ChapterMut, Context};
use mdpp_config::{ConfigError, REGGEN, RegGenConfig};
use mdpp_preprocess::{ChapterGenerator, PathPattern, Rewrite};

pub use backend::{NativeBackend, RegisterBackend};
pub use descriptor::IpBlock;
pub use error::{DescriptorError, GenerateError};

/// Heading introducing the interface summary.
pub const INTERFACE_HEADING: &str = "## Hardware Interface";

/// Heading introducing the register tables.
pub const REGISTERS_HEADING: &str = "## Registers";

/// Generator replacing descriptor chapters with register documentation.
#[derive(Debug, Clone)]
pub struct RegGenGenerator<B = NativeBackend> {
    backend: B,
    paths: PathPattern,
    params: Vec<(String, String)>,
}

impl RegGenGenerator<NativeBackend> {
    /// Create a generator with the native backend from validated configuration.
    pub fn from_config(config: &RegGenConfig) -> Result<Self, ConfigError> {
        Self::with_backend(NativeBackend, config)
    }

    /// Create a generator from the `[preprocessor.reggen]` table of the context.
    pub fn from_context(ctx: &Context) -> Result<Self, ConfigError> {
        let config = RegGenConfig::load(ctx.preprocessor_config(REGGEN))?;
        Self::from_config(&config)
    }
}

impl<B: RegisterBackend> RegGenGenerator<B> {
    /// Create a generator with a custom backend.
    pub fn with_backend(backend: B, config: &RegGenConfig) -> Result<Self, ConfigError> {
        let paths = PathPattern::new(&config.path_pattern).map_err(|e| {
            ConfigError::Validation(format!("path-pattern is not a valid regex: {e}"))
        })?;
        Ok(Self {
            backend,
            paths,
            params: config.param_overrides(),
        })
    }

    /// Render documentation for one descriptor.
    ///
    /// Nothing is returned unless both parsing and rendering succeed.
    pub fn render(&self, text: &str, origin: &str) -> Result<String, GenerateError<B::Error>> {
        let block = self
            .backend
            .parse(text, &self.params, origin)
            .map_err(GenerateError::Parse)?;

        let mut out = String::new();
        out.push_str(INTERFACE_HEADING);
        out.push_str("\n\n");
        self.backend.render_interfaces(&block, &mut out)?;
        out.push('\n');
        out.push_str(REGISTERS_HEADING);
        out.push_str("\n\n");
        self.backend.render_registers(&block, &mut out)?;
        Ok(out)
    }
}

impl<B: RegisterBackend> ChapterGenerator for RegGenGenerator<B> {
    type Error = GenerateError<B::Error>;

    fn name(&self) -> &str {
        REGGEN
    }

    fn matches(&self, chapter: &ChapterMut<'_>) -> bool {
        self.paths.matches(chapter.source_path())
    }

    fn generate(&self, ctx: &Context, chapter: &ChapterMut<'_>) -> Result<Rewrite, Self::Error> {
        let origin = ctx.origin_label(chapter.source_path().unwrap_or_default());
        self.render(chapter.content(), &origin).map(Rewrite::Replace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpp_preprocess::{Mode, Outcome, PreprocessError, handle};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::fmt::{self, Write};

    #[derive(Debug, thiserror::Error)]
    #[error("{origin}: bad descriptor")]
    struct BadDescriptor {
        origin: String,
    }

    /// Echoes the descriptor text and records the calls it receives.
    #[derive(Default)]
    struct Echo {
        calls: RefCell<Vec<String>>,
    }

    impl RegisterBackend for &Echo {
        type Block = String;
        type Error = BadDescriptor;

        fn parse(
            &self,
            text: &str,
            params: &[(String, String)],
            origin: &str,
        ) -> Result<String, BadDescriptor> {
            self.calls
                .borrow_mut()
                .push(format!("parse {origin} {params:?}"));
            if text.contains("broken") {
                return Err(BadDescriptor {
                    origin: origin.to_owned(),
                });
            }
            Ok(text.to_owned())
        }

        fn render_interfaces(&self, block: &String, out: &mut String) -> fmt::Result {
            self.calls.borrow_mut().push("interfaces".to_owned());
            writeln!(out, "<p>if:{block}</p>")
        }

        fn render_registers(&self, block: &String, out: &mut String) -> fmt::Result {
            self.calls.borrow_mut().push("registers".to_owned());
            writeln!(out, "<p>regs:{block}</p>")
        }
    }

    fn book(chapters: Value) -> String {
        json!([{"root": "/book"}, {"sections": chapters}]).to_string()
    }

    fn chapter(content: &str, source_path: Option<&str>) -> Value {
        json!({"Chapter": {"content": content, "source_path": source_path, "sub_items": []}})
    }

    #[test]
    fn test_render_layout() {
        let echo = Echo::default();
        let generator = RegGenGenerator::with_backend(&echo, &RegGenConfig::default()).unwrap();

        let output = generator.render("desc", "file at /b/x.hjson").unwrap();

        assert_eq!(
            output,
            "## Hardware Interface\n\n<p>if:desc</p>\n\n## Registers\n\n<p>regs:desc</p>\n"
        );
        assert_eq!(
            *echo.calls.borrow(),
            vec!["parse file at /b/x.hjson []", "interfaces", "registers"]
        );
    }

    #[test]
    fn test_params_reach_backend() {
        let echo = Echo::default();
        let config = RegGenConfig {
            params: [("NumTx".to_owned(), mdpp_config::ParamValue::Int(3))].into(),
            ..RegGenConfig::default()
        };
        let generator = RegGenGenerator::with_backend(&echo, &config).unwrap();

        generator.render("desc", "o").unwrap();

        assert_eq!(echo.calls.borrow()[0], r#"parse o [("NumTx", "3")]"#);
    }

    #[test]
    fn test_parse_failure_produces_nothing() {
        let echo = Echo::default();
        let generator = RegGenGenerator::with_backend(&echo, &RegGenConfig::default()).unwrap();

        let err = generator.render("broken", "o").unwrap_err();

        assert!(matches!(err, GenerateError::Parse(_)));
        assert_eq!(*echo.calls.borrow(), vec!["parse o []"]);
    }

    #[test]
    fn test_matches_by_source_path() {
        let generator = RegGenGenerator::from_config(&RegGenConfig::default()).unwrap();
        let input = book(json!([
            chapter("{name: \"uart\"}", Some("hw/ip/uart/data/uart.hjson")),
            chapter("plain text", Some("doc/intro.md")),
            chapter("no path", None),
        ]));

        let mut output = Vec::new();
        let outcome = handle(&Mode::Transform, input.as_bytes(), &mut output, |_| {
            Ok(generator.clone())
        })
        .unwrap();

        assert_eq!(
            outcome,
            Outcome::Transformed(mdpp_preprocess::Stats {
                chapters: 3,
                matched: 1,
                rewritten: 1,
            })
        );
        let emitted: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(emitted["sections"][1]["Chapter"]["content"], "plain text");
        assert_eq!(emitted["sections"][2]["Chapter"]["content"], "no path");
    }

    #[test]
    fn test_generated_chapter_headings() {
        let descriptor = r###"{
          name: "uart",
          clocking: [{clock: "clk_i", reset: "rst_ni"}],
          bus_interfaces: [{protocol: "tlul", direction: "device"}],
          registers: [
            {name: "CTRL", desc: "# Control", fields: [{bits: "0", name: "TX", desc: "## tx"}]},
          ]
        }"###;
        let input = book(json!([chapter(descriptor, Some("ip/uart/data/uart.hjson"))]));

        let mut output = Vec::new();
        handle(
            &Mode::Transform,
            input.as_bytes(),
            &mut output,
            RegGenGenerator::from_context,
        )
        .unwrap();

        let emitted: Value = serde_json::from_slice(&output).unwrap();
        let content = emitted["sections"][0]["Chapter"]["content"].as_str().unwrap();
        assert!(content.starts_with("## Hardware Interface\n"));
        let headings: Vec<&str> = content.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(headings, vec!["## Hardware Interface", "## Registers"]);
        assert!(!content.contains("<h"));
        assert!(content.contains("<b><code>clk_i</code></b>"));
        assert!(content.contains(r#"<table class="regdef" id="uart-ctrl">"#));
    }

    #[test]
    fn test_code_block_in_description_adds_no_heading() {
        let descriptor = r###"{
          name: "x",
          registers: [
            {name: "A", desc: "```\na\n\n# injected\n```", fields: [{bits: "0"}]},
          ]
        }"###;
        let input = book(json!([chapter(descriptor, Some("ip/x/data/x.hjson"))]));

        let mut output = Vec::new();
        handle(
            &Mode::Transform,
            input.as_bytes(),
            &mut output,
            RegGenGenerator::from_context,
        )
        .unwrap();

        let emitted: Value = serde_json::from_slice(&output).unwrap();
        let content = emitted["sections"][0]["Chapter"]["content"].as_str().unwrap();
        let headings: Vec<&str> = content.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(headings, vec!["## Hardware Interface", "## Registers"]);
        assert!(content.contains("<pre><code>a&#10;&#10;# injected&#10;</code></pre>"));
    }

    #[test]
    fn test_malformed_descriptor_aborts_run() {
        let input = book(json!([
            chapter("plain", Some("intro.md")),
            chapter("{name: ", Some("ip/uart/data/uart.hjson")),
        ]));

        let mut output = Vec::new();
        let result = handle(
            &Mode::Transform,
            input.as_bytes(),
            &mut output,
            RegGenGenerator::from_context,
        );

        let (chapter, source) = match result {
            Err(PreprocessError::Generate { chapter, source, .. }) => (chapter, source),
            other => panic!("expected a generate error, got {other:?}"),
        };
        assert_eq!(chapter, "ip/uart/data/uart.hjson");
        assert!(
            source
                .to_string()
                .starts_with("file at /book/ip/uart/data/uart.hjson: invalid Hjson")
        );
        assert!(output.is_empty());
    }

    #[test]
    fn test_path_pattern_from_config() {
        let input = json!([
            {"root": "/book", "config": {"preprocessor": {"reggen": {"path-pattern": "\\.regs$"}}}},
            {"sections": [
                chapter("{name: \"a\"}", Some("blocks/a.regs")),
                chapter("{name: \"b\"}", Some("ip/b/data/b.hjson")),
            ]}
        ])
        .to_string();

        let mut output = Vec::new();
        handle(
            &Mode::Transform,
            input.as_bytes(),
            &mut output,
            RegGenGenerator::from_context,
        )
        .unwrap();

        let emitted: Value = serde_json::from_slice(&output).unwrap();
        let first = emitted["sections"][0]["Chapter"]["content"].as_str().unwrap();
        assert!(first.starts_with(INTERFACE_HEADING));
        assert_eq!(emitted["sections"][1]["Chapter"]["content"], "{name: \"b\"}");
    }

    #[test]
    fn test_invalid_path_pattern() {
        let config = RegGenConfig {
            path_pattern: "(".to_owned(),
            ..RegGenConfig::default()
        };

        assert!(matches!(
            RegGenGenerator::from_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
