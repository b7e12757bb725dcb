use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Network, DNS or non-2xx failure talking to an endpoint.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body was not JSON or did not have the envelope shape we expect.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed envelope that signals failure.
    #[error("{0}")]
    RemoteOperation(String),

    /// Caught before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Endpoint not configured: {0} (add it under \"endpoints\" in config.json)")]
    EndpointNotFound(String),

    #[error("Unknown screen: {0}")]
    ScreenNotFound(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl AppError {
    /// Short label used in inline banners and alerts.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "transport",
            AppError::MalformedResponse(_) => "malformed response",
            AppError::RemoteOperation(_) => "remote error",
            AppError::Validation(_) => "validation",
            AppError::EndpointNotFound(_) | AppError::ScreenNotFound(_) | AppError::Config(_) => {
                "configuration"
            }
            AppError::RecordNotFound(_) => "not found",
            AppError::Unauthorized(_) => "unauthorized",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
