//! Failure kinds reported at component boundaries.

use thiserror::Error;

/// Errors surfaced by the exchange client, the notifier and the cooldown store.
///
/// Every external call site converts its failure into one of these variants,
/// so the scan loop can decide whether to abort, degrade or just report.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Connection failure or timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The API answered, but not with a usable success response.
    #[error("API error: {0}")]
    Api(String),

    /// A record could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Required external configuration is absent.
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    /// The chat message could not be delivered.
    #[error("notification failed: {0}")]
    Notification(String),
}

impl AlertError {
    /// Classify a transport error from reqwest.
    ///
    /// Timeouts and connection problems are `Network`; anything else that
    /// comes back from the HTTP layer (status, decode) is an `Api` error.
    pub fn from_transport(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            AlertError::Network(format!("{}: {}", context, err))
        } else {
            AlertError::Api(format!("{}: {}", context, err))
        }
    }

    /// Short, stable name for the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertError::Network(_) => "NetworkFailure",
            AlertError::Api(_) => "ApiError",
            AlertError::Parse(_) => "ParseError",
            AlertError::ConfigMissing(_) => "ConfigMissing",
            AlertError::Notification(_) => "NotificationFailure",
        }
    }
}
