//! Assistant backend behind the chatbot endpoint.
//!
//! The endpoint hands each user message to an [`Assistant`]. The production
//! implementation is [`ChatCompletionsClient`], a single non-streaming call
//! to an OpenAI-compatible Chat Completions API.

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsClient;
pub use provider::Provider;

use thiserror::Error;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// System prompt sent ahead of every user message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Eres un asistente útil y amable.";
/// Reply length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 150;
/// Sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Connection and generation settings for the assistant.
#[derive(Clone)]
pub struct AssistantSettings {
    /// Base URL for the API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// API key, if any.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Provider, detected from `base_url` unless set explicitly.
    pub provider: Provider,
    /// System prompt.
    pub system_prompt: String,
    /// Maximum tokens in the reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl std::fmt::Debug for AssistantSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AssistantSettings {
    /// Settings for `base_url` with every other field at its default.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            provider: Provider::detect_from_url(&base_url),
            base_url,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Upstream failures, rendered as the endpoint's user-facing error text.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// No API key for a provider that needs one.
    #[error("OpenAI API key no configurada.")]
    NotConfigured,

    /// The upstream API could not be reached.
    #[error("No se pudo conectar a la API de OpenAI: {0}")]
    Connection(#[source] reqwest::Error),

    /// The upstream API rejected the call with 429.
    #[error("Límite de tasa de OpenAI excedido: {0}")]
    RateLimited(String),

    /// Any other non-success upstream status.
    #[error("Error de la API de OpenAI: {status} - {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Anything else (malformed body, missing content, ...).
    #[error("Un error inesperado ocurrió: {0}")]
    Unexpected(String),
}

/// Produces a reply for one user message.
#[async_trait::async_trait]
pub trait Assistant: Send + Sync {
    /// Generate a reply to `message`.
    async fn reply(&self, message: &str) -> Result<String, AssistantError>;
}
