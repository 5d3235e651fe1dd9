//! Error types for the widget and its transport.

use thiserror::Error;

/// Errors raised while binding the widget to its view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// A required element is absent from the host page.
    #[error("required element `#{0}` not found")]
    MissingElement(String),
}

/// Any fault preventing a valid bot reply from being obtained.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The body was not JSON.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was JSON but had no string `response` field.
    #[error("response body has no `response` field")]
    MissingReply,

    /// The task performing the request panicked or was cancelled.
    #[error("delivery task failed: {0}")]
    Aborted(#[from] tokio::task::JoinError),

    /// Invalid endpoint URL.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
