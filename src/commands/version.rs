//! Command: print version information.

/// Version string embedded at build time, or the package version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("FLM_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the flm version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("flm {}", version());
}
