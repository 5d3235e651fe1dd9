//! OpenAI Chat Completions client.
//!
//! Sends the system prompt plus the user message to `/v1/chat/completions`
//! without streaming and returns the first choice's content.

use reqwest::StatusCode;

use super::{Assistant, AssistantError, AssistantSettings};

/// Non-streaming client for the Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: AssistantSettings,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a client with the given settings.
    #[must_use]
    pub fn new(settings: AssistantSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn request_body(&self, message: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": self.settings.system_prompt },
                { "role": "user", "content": message },
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        })
    }
}

#[async_trait::async_trait]
impl Assistant for ChatCompletionsClient {
    async fn reply(&self, message: &str) -> Result<String, AssistantError> {
        let settings = &self.settings;
        let api_key = settings.api_key.as_deref();
        if api_key.is_none() && settings.provider.requires_api_key() {
            return Err(AssistantError::NotConfigured);
        }

        let url = settings
            .provider
            .build_chat_url(&settings.base_url, &settings.model);
        let rb = settings
            .provider
            .authorize(self.http.post(&url), api_key)
            .json(&self.request_body(message));

        let resp = rb.send().await.map_err(AssistantError::Connection)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                AssistantError::RateLimited(body)
            } else {
                AssistantError::Status {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AssistantError::Unexpected(e.to_string()))?;
        first_choice_content(&v)
    }
}

/// `choices[0].message.content` of a completion body.
fn first_choice_content(v: &serde_json::Value) -> Result<String, AssistantError> {
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| AssistantError::Unexpected("completion without message content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = ChatCompletionsClient::new(AssistantSettings::new(
            "https://api.openai.com",
            Some("sk-test".into()),
        ));
        let body = client.request_body("hola");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Eres un asistente útil y amable.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hola");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_first_choice_content() {
        let v = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "¡Hola!" } }]
        });
        assert_eq!(first_choice_content(&v).unwrap(), "¡Hola!");

        let empty = serde_json::json!({ "choices": [] });
        assert!(matches!(
            first_choice_content(&empty),
            Err(AssistantError::Unexpected(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_for_hosted_provider() {
        let client = ChatCompletionsClient::new(AssistantSettings::new("https://api.openai.com", None));
        assert!(matches!(
            client.reply("hola").await,
            Err(AssistantError::NotConfigured)
        ));
    }
}
