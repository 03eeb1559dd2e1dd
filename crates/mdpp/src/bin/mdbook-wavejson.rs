//! mdBook preprocessor turning `wavejson` blocks into WaveDrom scripts.

use std::process::ExitCode;

use mdpp_wavejson::WaveJsonGenerator;

fn main() -> ExitCode {
    mdpp::run(
        "mdbook-wavejson",
        "Expands wavejson code blocks into WaveDrom script elements",
        WaveJsonGenerator::from_context,
    )
}
