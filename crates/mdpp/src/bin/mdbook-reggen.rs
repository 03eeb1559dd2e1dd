//! mdBook preprocessor documenting hardware register descriptors.

use std::process::ExitCode;

use mdpp_reggen::RegGenGenerator;

fn main() -> ExitCode {
    mdpp::run(
        "mdbook-reggen",
        "Expands register descriptor chapters into interface and register documentation",
        RegGenGenerator::from_context,
    )
}
