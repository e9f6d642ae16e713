//! CLI error types with miette diagnostics.
//!
//! Classified API errors become user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use housing_config::ConfigError;
use housing_core::{ClassifiedError, ErrorKind, SessionError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const UNAVAILABLE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(housing::unauthorized),
        help("Sign in again with: housing login")
    )]
    Unauthorized { message: String },

    #[error("Not signed in")]
    #[diagnostic(
        code(housing::not_signed_in),
        help(
            "Silent sign-in did not find an RIT Google session.\n\
             Run: housing login, or pass --sign-in to choose an account."
        )
    )]
    NotSignedIn,

    // ── Remote ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(housing::server_error))]
    Server { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(housing::api_unavailable),
        help("The housing API is offline or does not offer this operation.")
    )]
    Unavailable { message: String },

    #[error("{message}")]
    #[diagnostic(code(housing::rejected))]
    Rejected { code: Option<i64>, message: String },

    #[error("{message}")]
    #[diagnostic(code(housing::unknown))]
    Unknown { message: String },

    #[error("Could not set up a connection to {url}")]
    #[diagnostic(
        code(housing::connection_failed),
        help(
            "Check the api_root and ca_cert settings of your profile.\n\
             Use --insecure (-k) for local development servers."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: housing_api::Error,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(housing::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(housing::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(housing::config),
        help("Inspect the configuration with: housing config show")
    )]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(housing::session))]
    Session(#[from] SessionError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unauthorized { .. } | Self::NotSignedIn => exit_code::AUTH,
            Self::Unavailable { .. } => exit_code::UNAVAILABLE,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Rejected { code: Some(404), .. } => exit_code::NOT_FOUND,
            Self::Rejected { code: Some(403), .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config(ConfigError::UnknownProfile { .. } | ConfigError::Validation { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ClassifiedError → CliError mapping ───────────────────────────────

impl From<ClassifiedError> for CliError {
    fn from(err: ClassifiedError) -> Self {
        let code = err.code();
        let message = err.message;
        match err.kind {
            ErrorKind::Unauthorized => Self::Unauthorized { message },
            ErrorKind::ServerError => Self::Server { message },
            ErrorKind::ApiUnavailable => Self::Unavailable { message },
            ErrorKind::ClientError => Self::Rejected { code, message },
            ErrorKind::Unknown => Self::Unknown { message },
        }
    }
}
