//! `attachment-report` - write and email the Confluence attachment report.
//!
//! # Environment Variables
//!
//! - `REPORT_DATABASE_URL` - Confluence `MySQL` URL (falls back to `DATABASE_URL`)
//! - `SMTP_HOST`, `SMTP_PORT` - Mail relay (port defaults to 25)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - Relay credentials (optional)
//! - `REPORT_FROM` - Sender address
//! - `REPORT_RECIPIENTS` - Comma-separated recipient addresses

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use opsdesk_admin::config::{ConfigError, ReportConfig};
use opsdesk_admin::services::{ReportError, ReportOptions, ReportSummary, run_attachment_report};
use thiserror::Error;

use super::{print_error_details, print_result};

/// Tool name used in result lines.
pub const TOOL: &str = "attachment-report";

/// Arguments for `attachment-report`.
#[derive(Args, Debug)]
pub struct AttachmentReportArgs {
    /// Directory to write the CSV file to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Write the file without emailing it
    #[arg(long)]
    pub no_email: bool,
}

#[derive(Debug, Error)]
enum AttachmentReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Run the command and map its outcome to an exit code.
pub async fn run(args: AttachmentReportArgs) -> ExitCode {
    match execute(args).await {
        Ok(summary) => {
            print_result("SUCCESS", TOOL, &summary_message(&summary));
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "attachment-report failed");
            print_result("ERROR", TOOL, &err.to_string());
            if matches!(err, AttachmentReportError::Report(ReportError::Database(_))) {
                print_error_details(&err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: AttachmentReportArgs) -> Result<ReportSummary, AttachmentReportError> {
    let config = ReportConfig::from_env()?;
    let options = ReportOptions {
        output_dir: args.output_dir,
        date: chrono::Local::now().date_naive(),
        send_email: !args.no_email,
    };

    Ok(run_attachment_report(&config, &options).await?)
}

fn summary_message(summary: &ReportSummary) -> String {
    let mut message = format!(
        "Wrote {} rows to {}",
        summary.rows,
        summary.path.display()
    );
    if summary.emailed {
        message.push_str(" and emailed it");
    }
    message.push('.');
    message
}
