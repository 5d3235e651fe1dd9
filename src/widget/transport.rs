//! Request/response exchange with the chatbot endpoint.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DeliveryError;

/// Path of the chatbot endpoint, relative to the server root.
pub const CHATBOT_PATH: &str = "/api/chatbot";

/// Request body sent to the chatbot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotRequest {
    /// Trimmed user text.
    #[serde(default)]
    pub message: String,
}

/// Successful response body from the chatbot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotReply {
    /// Reply text to display.
    pub response: String,
}

/// Sends one user message and yields the reply text.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver `message` and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] for any fault that prevents a reply.
    async fn send(&self, message: &str) -> Result<String, DeliveryError>;
}

/// HTTP transport posting JSON to `<base>/api/chatbot`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, DeliveryError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a transport with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, DeliveryError> {
        let endpoint = Url::parse(base_url.as_ref())?.join(CHATBOT_PATH)?;
        Ok(Self { endpoint, http })
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<String, DeliveryError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatbotRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        parse_reply(&bytes)
    }
}

/// Extract the reply text from a response body.
fn parse_reply(body: &[u8]) -> Result<String, DeliveryError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    value
        .get("response")
        .and_then(|r| r.as_str())
        .map(ToString::to_string)
        .ok_or(DeliveryError::MissingReply)
}
