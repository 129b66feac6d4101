//! Subcommand implementations.
//!
//! Each command prints one `[SUCCESS][<tool>]` or `[ERROR][<tool>]` line on
//! stdout and maps its outcome to the process exit code.

pub mod attachment_report;
pub mod remove_attribute;

/// Print a tagged result line.
#[allow(clippy::print_stdout)]
fn print_result(status: &str, tool: &str, message: &str) {
    println!("[{status}][{tool}] {message}");
}

/// Print full details of an unclassified failure, one line per source.
#[allow(clippy::print_stdout)]
fn print_error_details(err: &(dyn std::error::Error + 'static)) {
    println!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        println!("  caused by: {cause}");
        source = cause.source();
    }
}
