//! `remove-attribute` - remove data from a user's custom attribute.
//!
//! # Environment Variables
//!
//! - `IDENTITY_API_URL` - Identity-store API base URL
//! - `IDENTITY_CLIENT_ID` / `IDENTITY_CLIENT_SECRET` - OAuth client credentials
//! - `IDENTITY_TOKEN_URL` - Token endpoint (optional)

use std::process::ExitCode;

use clap::Args;
use opsdesk_admin::config::{ConfigError, IdentityConfig};
use opsdesk_admin::identity::{IdentityClient, IdentityError};
use opsdesk_admin::services::{AttributeError, AttributeMutator, Removal, RemovalReport};
use opsdesk_core::Email;
use thiserror::Error;

use super::{print_error_details, print_result};

/// Tool name used in result lines.
pub const TOOL: &str = "remove-attribute";

/// The `--removeall` value that clears the attribute.
const REMOVE_ALL_FLAG: &str = "True";

/// Arguments for `remove-attribute`.
#[derive(Args, Debug)]
pub struct RemoveAttributeArgs {
    /// Custom user attribute field
    #[arg(short, long)]
    pub attribute: String,

    /// Data to remove from the custom user attribute field
    #[arg(short, long)]
    pub data: Option<String>,

    /// Email address of user to update
    #[arg(short, long)]
    pub email: Email,

    /// Remove all attribute data and update the user account ("True" to enable)
    #[arg(short = 'r', long = "removeall", value_name = "REMOVEALL")]
    pub remove_all: Option<String>,
}

/// Errors from the `remove-attribute` command.
#[derive(Debug, Error)]
pub enum RemoveAttributeError {
    /// Neither a token nor `--removeall True` was given.
    #[error("Nothing to remove: pass --data <TOKEN> or --removeall True")]
    NothingToRemove,

    /// Identity settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No access token could be obtained.
    #[error(transparent)]
    Connect(#[from] IdentityError),

    /// The workflow failed.
    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl RemoveAttributeError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Attribute(err) if !err.is_fatal() => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    }

    fn is_unexpected(&self) -> bool {
        match self {
            Self::Connect(_) => true,
            Self::Attribute(err) => err.is_unexpected(),
            Self::NothingToRemove | Self::Config(_) => false,
        }
    }
}

/// Decide what to remove from the raw flags.
///
/// Only the exact string `True` selects full removal; any other value falls
/// back to removing `data`.
///
/// # Errors
///
/// Returns `NothingToRemove` when single-token removal is selected without a token.
pub fn removal_from_flags(
    data: Option<String>,
    remove_all: Option<&str>,
) -> Result<Removal, RemoveAttributeError> {
    if remove_all == Some(REMOVE_ALL_FLAG) {
        return Ok(Removal::All);
    }

    data.map(Removal::Token)
        .ok_or(RemoveAttributeError::NothingToRemove)
}

/// Run the command and map its outcome to an exit code.
pub async fn run(args: RemoveAttributeArgs) -> ExitCode {
    match execute(args).await {
        Ok(report) => {
            print_result("SUCCESS", TOOL, &report.to_string());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "remove-attribute failed");
            print_result("ERROR", TOOL, &err.to_string());
            if err.is_unexpected() {
                print_error_details(&err);
            }
            err.exit_code()
        }
    }
}

async fn execute(args: RemoveAttributeArgs) -> Result<RemovalReport, RemoveAttributeError> {
    let removal = removal_from_flags(args.data, args.remove_all.as_deref())?;

    let config = IdentityConfig::from_env()?;
    let client = IdentityClient::connect(&config).await?;

    let report = AttributeMutator::new(client)
        .remove(&args.email, &args.attribute, &removal)
        .await?;

    Ok(report)
}
