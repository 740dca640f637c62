//! Meetbook operator CLI
//!
//! Run with: `meetbook <command>`
//!
//! Operator tasks that sit outside the client command surface: schema
//! migration, admin promotion and read-only inspection. Output goes to stdout
//! for the operator; diagnostics go through `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use meetbook_core::MeetingRepository;
use meetbook_domain::{day_bounds, parse_day};
use meetbook_lib::AppContext;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let args: Vec<String> = env::args().skip(1).collect();

    if matches!(args.first().map(String::as_str), None | Some("help" | "--help" | "-h")) {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match meetbook_infra::config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = meetbook_infra::init_tracing(&config.logging) {
        eprintln!("Logging setup failed: {e}");
    }
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env loaded"),
    }

    let result = match AppContext::new_with_config(config).await {
        Ok(ctx) => run(&ctx, &args).await,
        Err(e) => Err(anyhow!(e).context("failed to start application context")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Command failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Meetbook operator commands");
    println!();
    println!("USAGE:");
    println!("    meetbook <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    migrate            Apply the database schema and report its version");
    println!("    promote <email>    Grant the admin role to a registered user");
    println!("    calendar           Print the day markers of every meeting day");
    println!("    day <YYYY-MM-DD>   Print the meetings scheduled on a UTC day");
    println!("    health             Check that storage is reachable");
    println!("    help               Show this help message");
}

async fn run(ctx: &AppContext, args: &[String]) -> anyhow::Result<()> {
    let command = args.first().map(String::as_str).unwrap_or_default();

    match command {
        "migrate" => run_migrate(ctx),
        "promote" => {
            let email = required_arg(args, "email")?;
            let user = ctx
                .registration
                .promote_by_email(email)
                .await
                .with_context(|| format!("could not promote {email}"))?;
            println!("{} ({}) is now {}", user.email, user.id, user.role);
            Ok(())
        }
        "calendar" => {
            let markers = ctx.calendar.markers().await.context("could not build calendar")?;
            println!("{}", serde_json::to_string_pretty(&markers)?);
            Ok(())
        }
        "day" => {
            let day = parse_day(required_arg(args, "day")?)?;
            let (start, end) = day_bounds(day);
            let meetings = ctx.storage.meetings.find_in_range(start, end).await?;
            println!("{}", serde_json::to_string_pretty(&meetings)?);
            Ok(())
        }
        "health" => {
            ctx.health_check().context("storage health check failed")?;
            println!("ok ({})", ctx.storage.backend());
            Ok(())
        }
        unknown => {
            print_help();
            Err(anyhow!("unknown command: {unknown}"))
        }
    }
}

fn run_migrate(ctx: &AppContext) -> anyhow::Result<()> {
    let Some(db) = ctx.storage.db.as_ref() else {
        println!("memory backend has no schema");
        return Ok(());
    };

    // Storage::open already applied the schema; report what is there
    let version = db.schema_version()?.context("schema_version table is empty")?;
    println!("{} at schema version {version}", db.path().display());
    Ok(())
}

fn required_arg<'a>(args: &'a [String], name: &str) -> anyhow::Result<&'a str> {
    args.get(1).map(String::as_str).ok_or_else(|| anyhow!("missing argument <{name}>"))
}
