use serde_json::json;
use thiserror::Error;

/// Client-synthesized status meaning "no backend available". Never sent by
/// the real server.
pub const CODE_UNAVAILABLE: u16 = 600;

/// Status reported for transport failures that never produced an HTTP status.
pub const CODE_NO_RESPONSE: u16 = 503;

/// Status reported when the server answered with a body the client cannot read.
pub const CODE_BAD_BODY: u16 = 502;

/// Top-level error type for the `housing-api` crate.
///
/// Covers every failure mode across the remote surfaces: the housing API,
/// the identity API, the OAuth provider, and the static sample document.
/// `housing-core` classifies these into user-facing outcomes through the
/// normalized [`payload`](Self::payload).
#[derive(Debug, Error)]
pub enum Error {
    // ── Remote API ──────────────────────────────────────────────────
    /// Structured error returned by a remote capability.
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Capability not loaded, or the sample fallback failed (code 600).
    #[error("API unavailable: {message}")]
    Unavailable { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Shorthand for the code-600 sentinel.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// The HTTP-like status code carried by this error.
    pub fn code(&self) -> u16 {
        match self {
            Self::Api { code, .. } => *code,
            Self::Unavailable { .. } | Self::InvalidUrl(_) | Self::Tls(_) => CODE_UNAVAILABLE,
            Self::Transport(e) => e.status().map_or(CODE_NO_RESPONSE, |s| s.as_u16()),
            Self::Deserialization { .. } => CODE_BAD_BODY,
        }
    }

    /// The human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. }
            | Self::Unavailable { message }
            | Self::Deserialization { message, .. } => message.clone(),
            Self::Transport(e) => e.to_string(),
            Self::InvalidUrl(e) => e.to_string(),
            Self::Tls(msg) => msg.clone(),
        }
    }

    /// Normalized `{ "error": { "code", "message" } }` payload.
    pub fn payload(&self) -> serde_json::Value {
        json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        })
    }

    /// Returns `true` for a 401 (session invalid or expired).
    pub fn is_unauthorized(&self) -> bool {
        self.code() == 401
    }

    /// Returns `true` for a 404.
    pub fn is_not_found(&self) -> bool {
        self.code() == 404
    }

    /// Returns `true` for the code-600 sentinel.
    pub fn is_unavailable(&self) -> bool {
        self.code() == CODE_UNAVAILABLE
    }
}
