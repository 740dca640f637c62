//! Development automation tasks for the `Meetbook` workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! intentionally used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::Context;

mod crates;

/// Tests that run entirely on the in-memory backend
const MEMORY_SUITES: &[&str] = &["meeting_commands", "access_commands"];

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => run_fmt(),
        Some("clippy") => run_clippy(),
        Some("test") => cargo(&["test", "--workspace"], "Tests failed"),
        Some("test-memory") => run_test_memory(),
        Some("layers") => crates::check_layers(),
        Some("audit") => run_audit(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Meetbook Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci           Run all CI checks (fmt, clippy, layers, test)");
    println!("    fmt          Check Rust code formatting");
    println!("    clippy       Run Clippy lints");
    println!("    test         Run all tests");
    println!("    test-memory  Run the app suites that need no database file");
    println!("    layers       Check every workspace crate compiles on its own");
    println!("    audit        Audit dependencies for security vulnerabilities");
    println!("    help         Show this help message");
}

/// Run `cargo <args>` and fail with `failure` on a non-zero exit.
fn cargo(args: &[&str], failure: &str) -> anyhow::Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("Failed to spawn cargo {}", args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("{failure}");
    }

    Ok(())
}

/// Run all CI checks in sequence
fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...\n");

    println!("==> Step 1/4: Checking Rust format...");
    run_fmt()?;

    println!("\n==> Step 2/4: Running Clippy...");
    run_clippy()?;

    println!("\n==> Step 3/4: Checking layers...");
    crates::check_layers()?;

    println!("\n==> Step 4/4: Running tests...");
    cargo(&["test", "--workspace"], "Tests failed")?;

    println!("\n✓ All CI checks passed!");
    Ok(())
}

fn run_fmt() -> anyhow::Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "Format check failed. Run 'cargo fmt --all' to fix.")
}

fn run_clippy() -> anyhow::Result<()> {
    cargo(
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        "Clippy run failed. See output above.",
    )
}

fn run_test_memory() -> anyhow::Result<()> {
    let mut args = vec!["test", "-p", "meetbook-app"];
    for suite in MEMORY_SUITES {
        args.extend(["--test", *suite]);
    }
    cargo(&args, "Memory backend tests failed")
}

/// Audit dependencies for security vulnerabilities
fn run_audit() -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args(["audit", "--version"])
        .output()
        .is_ok_and(|output| output.status.success());

    if !installed {
        eprintln!("cargo-audit is not installed.");
        eprintln!("Install it with: cargo install cargo-audit");
        anyhow::bail!("cargo-audit not found");
    }

    cargo(&["audit"], "cargo-audit found vulnerabilities")
}
