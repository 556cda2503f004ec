//! Groq chat-completions client.
//!
//! Groq speaks the OpenAI chat-completions dialect:
//!
//! ```text
//! POST /openai/v1/chat/completions
//! { "model": "...", "messages": [{"role": "system", ...}, {"role": "user", ...}],
//!   "max_tokens": 100, "temperature": 0.7 }
//! -> { "choices": [{ "message": { "content": "..." } }] }
//! ```

use crate::error::{BlurbError, Result};
use crate::{BlurbGenerator, BlurbRequest};
use async_trait::async_trait;
use reqwest::{header, IntoUrl, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Characters of the original description included in the prompt
const PROMPT_DESCRIPTION_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = "You are a book reviewer. Write a short, engaging 2-3 sentence \
    description (under 150 characters) that makes people want to read the book. Be concise, \
    compelling, and highlight what makes it special.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for a Groq-hosted model.
pub struct GroqClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GroqClient {
    /// Create a client with the default endpoint and model.
    pub fn new(api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 100,
            temperature: 0.7,
        })
    }

    /// Load the API key from [`API_KEY_ENV`].
    ///
    /// Returns `Ok(None)` when the variable is unset or empty, so callers can
    /// fall back quietly.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_env_var(API_KEY_ENV)
    }

    pub(crate) fn from_env_var(name: &str) -> Result<Option<Self>> {
        match std::env::var(name) {
            Err(std::env::VarError::NotPresent) => {
                debug!("{} not set; generated blurbs disabled", name);
                Ok(None)
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(BlurbError::InvalidApiKeyEnv(name.to_string()))
            }
            Ok(key) if key.trim().is_empty() => Ok(None),
            Ok(key) => {
                debug!("Using blurb API key from {}", name);
                Self::new(SecretString::new(key.trim().to_string())).map(Some)
            }
        }
    }

    pub fn with_endpoint<T: IntoUrl>(mut self, endpoint: T) -> Result<Self> {
        self.endpoint = endpoint.into_url()?;
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The request body sent for `request`.
    pub fn build_request(&self, request: &BlurbRequest) -> ChatRequest {
        let mut prompt = format!("Book: \"{}\" by {}.", request.title, request.author);
        if let Some(description) = request.description.as_deref().filter(|d| !d.is_empty()) {
            let excerpt: String = description.chars().take(PROMPT_DESCRIPTION_CHARS).collect();
            prompt.push_str("\n\nOriginal description: ");
            prompt.push_str(&excerpt);
        }
        prompt.push_str("\n\nWrite a short, engaging description (under 150 characters):");

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Pull the first non-empty completion out of a response body.
fn first_completion(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(BlurbError::EmptyResponse)
}

#[async_trait]
impl BlurbGenerator for GroqClient {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn generate(&self, request: &BlurbRequest) -> Result<String> {
        let body = self.build_request(request);
        debug!("Requesting blurb for '{}' from {}", request.title, self.model);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Blurb service error {}: {}", status, body);
            return Err(BlurbError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        first_completion(parsed)
    }
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GroqClient {
        GroqClient::new(SecretString::new("test-key".to_string())).unwrap()
    }

    #[test]
    fn test_build_request_with_description() {
        let request = BlurbRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: Some("x".repeat(1000)),
        };
        let body = client().build_request(&request);

        assert_eq!(body.model, DEFAULT_MODEL);
        assert_eq!(body.max_tokens, 100);
        assert_eq!(body.messages[0].role, "system");
        let prompt = &body.messages[1].content;
        assert!(prompt.starts_with("Book: \"Dune\" by Frank Herbert."));
        assert!(prompt.contains(&"x".repeat(400)));
        assert!(!prompt.contains(&"x".repeat(401)));
    }

    #[test]
    fn test_request_serializes_in_openai_shape() {
        let request = BlurbRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: None,
        };
        let json = serde_json::to_value(client().build_request(&request)).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("(under 150 characters):"));
    }

    #[test]
    fn test_first_completion() {
        let ok: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  A wild ride.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(first_completion(ok).unwrap(), "A wild ride.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_completion(empty), Err(BlurbError::EmptyResponse)));

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": " "}}]}"#).unwrap();
        assert!(matches!(first_completion(blank), Err(BlurbError::EmptyResponse)));
    }

    #[test]
    fn test_missing_env_var_is_none() {
        let loaded = GroqClient::from_env_var("BOOKSWIPE_TEST_UNSET_KEY_VAR").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_default_endpoint() {
        let client = client();
        assert_eq!(client.endpoint.as_str(), DEFAULT_ENDPOINT);

        let moved = client.with_endpoint("http://localhost:8080/v1/chat").unwrap();
        assert_eq!(moved.endpoint.host_str(), Some("localhost"));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("test-key"));
    }
}
