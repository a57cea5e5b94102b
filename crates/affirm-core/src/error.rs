use reqwest::StatusCode;
use thiserror::Error;

use crate::model::ActionType;

/// Marker the server puts in its error text once the pin cap is reached.
pub const PIN_LIMIT_MARKER: &str = "pin already limited";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}")]
    Status { status: StatusCode },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Validation(String),

    #[error("You can pin at most {} affirmations", ActionType::Pin.limit())]
    PinLimitReached,

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Classify a failed random lookup. 404 and 400 both mean the filter matched nothing.
    pub fn from_lookup_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                ApiError::NotFound(message.unwrap_or_else(|| "No affirmations found".to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(
                message.unwrap_or_else(|| "Please wait before requesting another affirmation".to_string()),
            ),
            _ => ApiError::Status { status },
        }
    }

    /// Classify a server-reported `{error}` on a mutation endpoint.
    pub fn from_server_message(message: String) -> Self {
        if message.contains(PIN_LIMIT_MARKER) {
            ApiError::PinLimitReached
        } else {
            ApiError::Validation(message)
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Status { .. })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
