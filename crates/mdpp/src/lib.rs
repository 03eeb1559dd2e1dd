//! Command-line front end shared by the mdpp preprocessors.
//!
//! Each binary is a thin `main` around [`run`]:
//!
//! ```text
//! mdbook-reggen supports html   # exit status answers the capability query
//! mdbook-reggen < input.json    # [context, book] in, book out
//! ```
//!
//! Diagnostics and logs go to standard error. Standard output only ever
//! carries the transformed book.

mod output;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use mdpp_book::Context;
use mdpp_config::ConfigError;
use mdpp_preprocess::{ChapterGenerator, Mode, Outcome, PreprocessError, handle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use output::Output;

#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Enable info-level logging on standard error.
    #[arg(short, long)]
    verbose: bool,

    /// `supports <renderer>` to answer a capability query; none to transform
    /// the book read from standard input.
    tokens: Vec<String>,
}

impl Cli {
    /// Parse the process arguments under the given program name.
    fn parse_as(name: &'static str, about: &'static str) -> Self {
        let matches = Self::command().name(name).about(about).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// Run one preprocessor invocation against the process streams.
///
/// `build` creates the generator from the host context once the input has
/// been read. Returns failure for unsupported renderers and for any error.
pub fn run<G, F>(name: &'static str, about: &'static str, build: F) -> ExitCode
where
    G: ChapterGenerator,
    F: FnOnce(&Context) -> Result<G, ConfigError>,
{
    let cli = Cli::parse_as(name, about);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mode = Mode::from_tokens(cli.tokens);
    tracing::debug!(preprocessor = name, ?mode, "Starting");
    let result = handle(&mode, io::stdin().lock(), io::stdout().lock(), build);

    if succeeded(&result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Report the outcome of an invocation and tell whether it succeeded.
fn succeeded(result: &Result<Outcome, PreprocessError>) -> bool {
    match result {
        Ok(Outcome::Supported | Outcome::Transformed(_)) => true,
        Ok(Outcome::Unsupported) => false,
        Err(err) => {
            Output::new().error(&format!("Error: {err}"));
            false
        }
    }
}
