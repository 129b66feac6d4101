//! opsdesk CLI - identity-store attribute cleanup and attachment reporting.
//!
//! # Usage
//!
//! ```bash
//! # Remove one entry from a user's custom attribute list
//! opsdesk remove-attribute -e "alice@example.com" -a "custom_attribute" -d "new-one"
//!
//! # Clear the attribute entirely
//! opsdesk remove-attribute -e "alice@example.com" -a "custom_attribute" -r True
//!
//! # Write and email the weekly attachment report
//! opsdesk attachment-report --output-dir /var/reports
//! ```
//!
//! # Commands
//!
//! - `remove-attribute` - Remove one or all tokens from a custom attribute
//! - `attachment-report` - Email a CSV of Confluence attachment metadata
//!
//! # Exit status
//!
//! `0` on success and when the token to remove is already absent, `1` on any
//! other failure, `2` on invalid arguments.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use opsdesk_admin::config::TelemetryConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::attachment_report::AttachmentReportArgs;
use commands::remove_attribute::RemoveAttributeArgs;

#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(author, version, about = "Identity-store and Confluence admin tools")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove all or parts of a custom user attribute
    #[command(arg_required_else_help = true)]
    RemoveAttribute(RemoveAttributeArgs),
    /// Write the Confluence attachment report and email it
    AttachmentReport(AttachmentReportArgs),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &TelemetryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Into::into),
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Only errors are forwarded to Sentry; everything else stays local.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to warn so the result line stays the only output unless RUST_LOG asks for more
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "opsdesk=warn,opsdesk_admin=warn".into());

    // JSON logs for cron/log shippers, text for interactive use; both on stderr
    let json = std::env::var("OPSDESK_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _sentry = init_sentry(&TelemetryConfig::from_env());
    init_tracing();

    match cli.command {
        Commands::RemoveAttribute(args) => commands::remove_attribute::run(args).await,
        Commands::AttachmentReport(args) => commands::attachment_report::run(args).await,
    }
}
