//! Chat-completions client for OpenAI-compatible endpoints (Groq by default)
//! and helpers for digging JSON out of model output.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::LlmConfig;
use crate::http::{retrying_client, truncate_body};
use crate::{Result, TravelBuddyError};

/// Sampling settings for one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl CompletionOptions {
    #[must_use]
    pub const fn new(max_tokens: u32, temperature: f64) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Text completion backend used by the planning agents
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionClient {
    http: ClientWithMiddleware,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TravelBuddyError::config("LLM API key is missing (set GROQ_API_KEY)"))?;

        let timeout = Duration::from_secs(u64::from(config.timeout_seconds));
        Ok(Self {
            http: retrying_client(timeout, config.max_retries)?,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };
        let body = serde_json::to_vec(&request)?;

        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "Chat completion answered"
        );

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|_| {
            TravelBuddyError::llm(format!(
                "Model API returned an unexpected response ({status}): {}",
                truncate_body(&text)
            ))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TravelBuddyError::llm(format!("Model API returned no choices: {}", truncate_body(&text))))
    }
}

/// Greedy span from the first `open` to the last `close`
fn bracketed(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// The JSON object embedded in chatty model output
pub fn extract_json_object(text: &str) -> Result<serde_json::Value> {
    let span = bracketed(text, '{', '}')
        .ok_or_else(|| TravelBuddyError::llm("No JSON object found in model output"))?;
    serde_json::from_str(span).map_err(|e| TravelBuddyError::llm(format!("Invalid JSON object in model output: {e}")))
}

/// The JSON array embedded in chatty model output
pub fn extract_json_array(text: &str) -> Result<Vec<serde_json::Value>> {
    let span = bracketed(text, '[', ']')
        .ok_or_else(|| TravelBuddyError::llm("No JSON array found in model output"))?;
    serde_json::from_str(span).map_err(|e| TravelBuddyError::llm(format!("Invalid JSON array in model output: {e}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies and records the prompts it was given
    #[derive(Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String>>>,
        pub prompts: Mutex<Vec<(String, CompletionOptions)>>,
    }

    impl ScriptedModel {
        pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
                prompts: Mutex::default(),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from([Err(TravelBuddyError::llm(message))])),
                prompts: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String> {
            self.prompts.lock().unwrap().push((prompt.to_string(), options));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TravelBuddyError::llm("no scripted reply left")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(url: &str) -> ChatCompletionClient {
        ChatCompletionClient::new(&LlmConfig {
            api_key: Some("gsk-test".into()),
            base_url: url.to_string(),
            max_retries: 0,
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extract_json_object_from_chatter() {
        let value = extract_json_object(
            "Sure! Here you go:\n```json\n{\"destination\": \"Tokyo\", \"budget\": null}\n```\nEnjoy.",
        )
        .unwrap();
        assert_eq!(value["destination"], "Tokyo");
        assert!(value["budget"].is_null());
    }

    #[test]
    fn test_extract_json_array_from_chatter() {
        let items = extract_json_array(r#"Plan: ["Day 1: Colosseum", "Day 2: Vatican"] hope it helps"#).unwrap();
        assert_eq!(items.len(), 2);
        assert!(extract_json_array("no brackets here").is_err());
        assert!(extract_json_array("] backwards [").is_err());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = ChatCompletionClient::new(&LlmConfig::default()).err().unwrap();
        assert!(matches!(err, TravelBuddyError::Config { .. }));
    }

    #[tokio::test]
    async fn test_complete_posts_single_user_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3-8b-8192",
                "messages": [{"role": "user", "content": "Plan Rome"}],
                "max_tokens": 350
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"[\"Day 1\"]"}}]}"#)
            .create_async()
            .await;

        let reply = client_for(&server.url())
            .complete("Plan Rome", CompletionOptions::new(350, 0.7))
            .await
            .unwrap();

        assert_eq!(reply, r#"["Day 1"]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_payload_includes_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
            .create_async()
            .await;

        let err = client_for(&server.url())
            .complete("hi", CompletionOptions::new(10, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(err, TravelBuddyError::Llm { .. }));
        assert!(err.to_string().contains("Invalid API Key"));
    }
}
