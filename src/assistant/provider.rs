//! Provider-specific URL and authentication handling.

/// Supported OpenAI-compatible providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// Azure `OpenAI` Service
    AzureOpenAI {
        /// Deployment name; the model name is used when empty.
        deployment_name: String,
        /// API version (e.g., "2024-08-01-preview")
        api_version: String,
    },
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible server (local gateways, proxies).
    Generic,
}

/// Azure API version used when none is configured.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";

impl Provider {
    /// Detect provider from base URL.
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("azure.com") {
            Self::AzureOpenAI {
                deployment_name: String::new(),
                api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            }
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Hosted providers reject unauthenticated calls, so a missing key is a
    /// configuration error for them.
    #[must_use]
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Build the chat completions URL for this provider.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::AzureOpenAI {
                deployment_name,
                api_version,
            } => {
                let deployment = if deployment_name.is_empty() {
                    model
                } else {
                    deployment_name
                };
                format!(
                    "{base}/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
                )
            }
            Self::OpenRouter if base.ends_with("/api") => format!("{base}/v1/chat/completions"),
            Self::OpenRouter => format!("{base}/api/v1/chat/completions"),
            _ => format!("{base}/v1/chat/completions"),
        }
    }

    /// Attach credentials the way this provider expects them.
    #[must_use]
    pub fn authorize(
        &self,
        rb: reqwest::RequestBuilder,
        api_key: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match (self, api_key) {
            (_, None) => rb,
            (Self::AzureOpenAI { .. }, Some(key)) => rb.header("api-key", key),
            (_, Some(key)) => rb.bearer_auth(key),
        }
    }
}
