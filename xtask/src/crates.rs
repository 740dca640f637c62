use std::process::Command;

use anyhow::{Context, Result};

/// Workspace packages in layer order; each may only depend on those above it.
const LAYERS: &[&str] =
    &["meetbook-common", "meetbook-domain", "meetbook-core", "meetbook-infra", "meetbook-app"];

/// Check each package on its own, without features unified from the rest
/// of the workspace.
pub fn check_layers() -> Result<()> {
    println!("Checking {} workspace layers in isolation...", LAYERS.len());

    for (index, package) in LAYERS.iter().enumerate() {
        println!("\n[{}/{}] cargo check -p {package} --all-targets", index + 1, LAYERS.len());

        let status = Command::new("cargo")
            .args(["check", "-p", *package, "--all-targets"])
            .status()
            .with_context(|| format!("Failed to run cargo check for '{package}'"))?;

        if !status.success() {
            anyhow::bail!("Layer '{package}' failed to compile on its own");
        }

        println!("✅ {package} compiles");
    }

    println!("\n✅ All {} layers compile in isolation", LAYERS.len());

    Ok(())
}
