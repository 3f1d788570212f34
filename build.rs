//! Build script: embeds version information into the crate.

use std::process::Command;

fn main() {
    // FLM_VERSION from the environment wins (release builds); otherwise ask git.
    if let Ok(version) = std::env::var("FLM_VERSION") {
        println!("cargo:rustc-env=FLM_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=FLM_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=FLM_VERSION");
}
