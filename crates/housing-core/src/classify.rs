// ── Error classification ──
//
// Maps a raw error payload of any shape onto the user-facing outcome it
// calls for. Total over arbitrary JSON: malformed input lands in
// `ClientError` with whatever message is present.

use std::fmt;

use serde_json::Value;

/// Shown for 401 responses.
pub const UNAUTHORIZED_TEXT: &str = "You are not authorized to register for housing. \
     Please check that you are logged in with an RIT Google account";

/// Prefix for 5xx responses; the quoted source label follows.
pub const SERVER_ERROR_TEXT: &str = "A server error has occurred. Please contact the developers \
     of this website and report an error with ";

/// Prefix for the code-600 sentinel; the quoted source label and raw message follow.
pub const API_UNAVAILABLE_TEXT: &str = "The housing API is not available. Failed to call ";

/// Label used when neither the caller nor the payload names the operation.
pub const GENERIC_SOURCE: &str = "generic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// Session invalid or expired; recoverable by signing in again.
    Unauthorized,
    /// 5xx from the server.
    ServerError,
    /// Capability not loaded or offline (code 600).
    ApiUnavailable,
    /// Any other code, or no usable code at all.
    ClientError,
    /// Reserved for failures with no payload; `classify` never yields it.
    Unknown,
}

/// An error after classification, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// User-facing text.
    pub message: String,
    /// Operation label, e.g. `rooms()`.
    pub source: String,
    /// The payload as received.
    pub raw: Value,
}

impl ClassifiedError {
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    /// Numeric code from the raw payload, when it has one.
    pub fn code(&self) -> Option<i64> {
        error_body(&self.raw).get("code").and_then(Value::as_i64)
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClassifiedError {}

/// Strip at most one `result` wrapper and one `error` wrapper.
fn error_body(raw: &Value) -> &Value {
    let inner = raw.get("result").filter(|v| v.is_object()).unwrap_or(raw);
    inner.get("error").filter(|v| v.is_object()).unwrap_or(inner)
}

/// Classify `raw`, labelling it with `source` (or the payload's own
/// `source` field, or [`GENERIC_SOURCE`]).
pub fn classify(raw: &Value, source: Option<&str>) -> ClassifiedError {
    let body = error_body(raw);

    let source = source
        .or_else(|| body.get("source").and_then(Value::as_str))
        .or_else(|| raw.get("source").and_then(Value::as_str))
        .unwrap_or(GENERIC_SOURCE)
        .to_owned();

    let raw_message = body.get("message").and_then(Value::as_str).unwrap_or("");

    let (kind, message) = match body.get("code").and_then(Value::as_i64) {
        Some(401) => {
            let mut message = UNAUTHORIZED_TEXT.to_owned();
            if raw_message.contains('@') {
                message.push_str("\n\n");
                message.push_str(raw_message);
            }
            (ErrorKind::Unauthorized, message)
        }
        Some(600) => (
            ErrorKind::ApiUnavailable,
            format!("{API_UNAVAILABLE_TEXT}'{source}': {raw_message}"),
        ),
        Some(code) if code >= 500 => (
            ErrorKind::ServerError,
            format!("{SERVER_ERROR_TEXT}'{source}'"),
        ),
        _ => (ErrorKind::ClientError, raw_message.to_owned()),
    };

    ClassifiedError {
        kind,
        message,
        source,
        raw: raw.clone(),
    }
}

/// Classification of the raw errors returned by the API clients.
pub trait Classify {
    fn classify(&self, source: &str) -> ClassifiedError;
}

impl Classify for housing_api::Error {
    fn classify(&self, source: &str) -> ClassifiedError {
        classify(&self.payload(), Some(source))
    }
}
