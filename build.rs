//! Build script: embeds the crate version via `MINT_SETUP_VERSION`.

use std::process::Command;

fn main() {
    // Prefer MINT_SETUP_VERSION if set (e.g. by a release build), otherwise
    // fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("MINT_SETUP_VERSION") {
        println!("cargo:rustc-env=MINT_SETUP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=MINT_SETUP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=conf/");
    println!("cargo:rerun-if-env-changed=MINT_SETUP_VERSION");
}
