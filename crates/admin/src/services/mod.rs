//! Workflows built on the identity client and the report database.
//!
//! # Services
//!
//! - `attributes` - remove tokens from a user's delimited custom attribute
//! - `attachment_report` - Confluence attachment CSV report
//! - `email` - Email delivery via SMTP

pub mod attachment_report;
pub mod attributes;
pub mod email;

pub use attachment_report::{
    ReportError, ReportOptions, ReportSummary, report_file_name, run_attachment_report, write_csv,
};
pub use attributes::{
    AttributeError, AttributeMutator, Removal, RemovalReport, remove_all, remove_token,
};
pub use email::{EmailError, FileAttachment, ReportMailer, build_message_with_attachment};
