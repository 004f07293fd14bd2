use reqwest::StatusCode;
use serde_json::Value;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error raised by the portal REST client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Unable to reach the server. Please check your connection and try again.")]
    Network(#[source] reqwest::Error),
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error("your session has expired, please sign in again")]
    Unauthorized,
    #[error("session revoked: {message}")]
    SessionRevoked { message: String },
    #[error("unexpected response payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("a request for {0} is already in flight")]
    DuplicateRequest(String),
    #[error("list pagination loops back to {0}")]
    Pagination(String),
    #[error("invalid portal URL: {0}")]
    InvalidUrl(String),
    #[error("unable to read upload: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::SessionRevoked { .. } => Some(StatusCode::FORBIDDEN),
            _ => None,
        }
    }

    /// True when the session is gone and the user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::SessionRevoked { .. })
    }
}

/// Pulls a human readable message out of an error body.
///
/// Looks at `detail`, `error`, `message` and `non_field_errors` first, then
/// the first field error (`"amount: Ensure this value is positive."`), and
/// falls back to a generic message.
pub(crate) fn extract_message(body: &[u8]) -> String {
    let Ok(payload) = serde_json::from_slice::<Value>(body) else {
        return GENERIC_ERROR_MESSAGE.to_string();
    };

    match &payload {
        Value::String(text) if !text.trim().is_empty() => return text.trim().to_string(),
        Value::Array(items) => {
            if let Some(text) = items.iter().find_map(first_text) {
                return text;
            }
        }
        Value::Object(fields) => {
            for key in ["detail", "error", "message", "non_field_errors"] {
                if let Some(text) = fields.get(key).and_then(first_text) {
                    return text;
                }
            }
            for (field, value) in fields {
                if let Some(text) = first_text(value) {
                    return format!("{field}: {text}");
                }
            }
        }
        _ => {}
    }

    GENERIC_ERROR_MESSAGE.to_string()
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Array(items) => items.iter().find_map(first_text),
        Value::Object(fields) => fields
            .get("detail")
            .or_else(|| fields.get("message"))
            .and_then(first_text),
        _ => None,
    }
}

/// 403 bodies mentioning the API key mean the whole session must end.
pub(crate) fn is_api_key_rejection(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("api key") || lowered.contains("api-key") || lowered.contains("apikey")
}
