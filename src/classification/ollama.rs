//! Ollama chat classifier
//!
//! Connects to a running Ollama server (default: localhost:11434) and asks
//! for JSON output via the `format` field.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{parse_label_response, CategoryClassifier, ClassificationError};
use super::vocabulary::Vocabulary;
use crate::config::ClassificationConfig;

/// Ollama API message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: String,
}

/// Ollama chat response
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

/// Ollama-backed category classifier for fully local deployments
pub struct OllamaClassifier {
    config: ClassificationConfig,
    vocabulary: Vocabulary,
    client: Client,
    base_url: String,
}

impl OllamaClassifier {
    pub fn new(config: ClassificationConfig) -> Self {
        let vocabulary = Vocabulary::from_config(&config.vocabulary);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        // The OpenAI default base URL makes no sense for Ollama; fall back
        // to the conventional local server when it was left untouched.
        let base_url = if config.api_base_url.contains("api.openai.com") {
            "http://localhost:11434".to_string()
        } else {
            config.api_base_url.trim_end_matches('/').to_string()
        };

        Self {
            config,
            vocabulary,
            client,
            base_url,
        }
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            "Categorize the following music lyric using these categories (a lyric can belong \
             to multiple categories):\n\n{}\n\n\
             Respond in JSON format as: {{\"categories\": [\"category 1\", \"category 2\"]}}\n\n\
             Music Lyric Text: '{}'",
            self.vocabulary.instruction_block(),
            text
        )
    }
}

#[async_trait]
impl CategoryClassifier for OllamaClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<String>, ClassificationError> {
        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: self.prompt(text),
            }],
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout(self.config.timeout_secs)
                } else {
                    ClassificationError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Backend(format!(
                "Ollama returned {}: {}", status, body
            )));
        }

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let labels = parse_label_response(&chat.message.content)?;
        Ok(self.vocabulary.filter(labels, self.config.strict))
    }

    fn name(&self) -> &'static str {
        "ollama-chat"
    }
}
