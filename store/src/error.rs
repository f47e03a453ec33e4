use reqwest::StatusCode;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("request to the store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the store rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("organization {0:?} does not exist or is not visible with this token")]
    UnknownOrganization(String),
    #[error("point cannot be encoded: {0}")]
    InvalidPoint(String),
    #[error("the store answered with status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Error body of the InfluxDB v2 API.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl StoreError {
    /// Classify a non-success response of the store API.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ApiError>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::CONFLICT => Self::AlreadyExists(message),
            StatusCode::UNPROCESSABLE_ENTITY if message.contains("already exists") => Self::AlreadyExists(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
