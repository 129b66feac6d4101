//! Weekly Confluence attachment report.
//!
//! Queries attachment metadata, writes it to a dated CSV file and emails the
//! file to the configured recipients.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, instrument};

use super::email::{EmailError, FileAttachment, ReportMailer};
use crate::config::ReportConfig;
use crate::db::{self, AttachmentRow};

/// CSV column headers, in output order.
pub const CSV_HEADERS: [&str; 7] = [
    "attachmentUID",
    "attachmentTitle",
    "uploadedBy",
    "pageTitle",
    "attachmentSize",
    "attachedDate",
    "attachmentStatus",
];

/// `MySQL` error number for a rejected user name or password.
const ER_ACCESS_DENIED_ERROR: u16 = 1045;
/// `MySQL` error number for an unknown database.
const ER_BAD_DB_ERROR: u16 = 1049;

/// Errors that can occur while producing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The database rejected the configured credentials.
    #[error("Something is wrong with your user name or password")]
    AccessDenied,

    /// The configured database does not exist.
    #[error("Database does not exist")]
    UnknownDatabase,

    /// Any other database failure.
    #[error("Something went wrong: {0}")]
    Database(sqlx::Error),

    /// Writing the CSV file failed.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

impl From<sqlx::Error> for ReportError {
    fn from(value: sqlx::Error) -> Self {
        let number = value
            .as_database_error()
            .and_then(|e| e.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>())
            .map(sqlx::mysql::MySqlDatabaseError::number);

        match number {
            Some(ER_ACCESS_DENIED_ERROR) => Self::AccessDenied,
            Some(ER_BAD_DB_ERROR) => Self::UnknownDatabase,
            _ => Self::Database(value),
        }
    }
}

/// Options for a report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Directory the CSV file is written to.
    pub output_dir: PathBuf,
    /// Report date, used in the file name.
    pub date: NaiveDate,
    /// Whether to email the file after writing it.
    pub send_email: bool,
}

/// Outcome of a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Path of the written CSV file.
    pub path: PathBuf,
    /// Number of attachment rows written.
    pub rows: usize,
    /// Whether the file was emailed.
    pub emailed: bool,
}

/// File name for the report produced on `date` (`confluence-attachments-MMDDYY.csv`).
#[must_use]
pub fn report_file_name(date: NaiveDate) -> String {
    format!("confluence-attachments-{}.csv", date.format("%m%d%y"))
}

/// Write `rows` as CSV with a header line and `\n` line endings.
///
/// # Errors
///
/// Returns error if encoding or writing fails.
pub fn write_csv<W: Write>(rows: &[AttachmentRow], writer: W) -> Result<(), ReportError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CSV_HEADERS)?;

    for row in rows {
        csv.write_record([
            row.content_id.to_string(),
            row.attachment_title.clone().unwrap_or_default(),
            row.uploaded_by.clone().unwrap_or_default(),
            row.page_title.clone().unwrap_or_default(),
            row.size.map(|s| s.to_string()).unwrap_or_default(),
            row.created_at
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            row.status.clone().unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Query, write and (optionally) email the attachment report.
///
/// # Errors
///
/// Returns the first failure of the query, the file write or the delivery.
#[instrument(skip(config), fields(output_dir = %options.output_dir.display()))]
pub async fn run_attachment_report(
    config: &ReportConfig,
    options: &ReportOptions,
) -> Result<ReportSummary, ReportError> {
    info!("Connecting to report database...");
    let pool = db::create_pool(&config.database_url).await?;
    let rows = db::list_attachments(&pool).await;
    pool.close().await;
    let rows = rows?;

    info!(rows = rows.len(), "Fetched attachment rows");

    let file_name = report_file_name(options.date);
    let path = options.output_dir.join(&file_name);
    let contents = render_csv(&rows)?;
    write_report_file(&path, &contents).await?;

    info!(path = %path.display(), "Report written");

    if options.send_email {
        let mailer = ReportMailer::new(&config.email).map_err(EmailError::from)?;
        mailer
            .send_report(FileAttachment {
                file_name,
                contents,
            })
            .await?;
    }

    Ok(ReportSummary {
        path,
        rows: rows.len(),
        emailed: options.send_email,
    })
}

fn render_csv(rows: &[AttachmentRow]) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    Ok(buffer)
}

async fn write_report_file(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    tokio::fs::write(path, contents).await?;
    Ok(())
}
