//! OpenAI chat-completion classifier
//!
//! Asks for a structured JSON object (`response_format: json_object`)
//! listing the categories a lyric belongs to.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{parse_label_response, CategoryClassifier, ClassificationError};
use super::vocabulary::Vocabulary;
use crate::config::ClassificationConfig;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-backed category classifier
pub struct OpenAiClassifier {
    config: ClassificationConfig,
    vocabulary: Vocabulary,
    client: Client,
}

impl OpenAiClassifier {
    pub fn new(config: ClassificationConfig) -> Self {
        let vocabulary = Vocabulary::from_config(&config.vocabulary);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            config,
            vocabulary,
            client,
        }
    }

    fn system_instruction(&self) -> String {
        format!(
            "Below are the various categories and their explanation. Analyzing the portion of \
             music lyric given, categorize the given text using the following categories. One \
             lyric can belong to multiple categories:\n\n{}\n\n\
             Respond in JSON format as: {{\"categories\": [\"category 1\", \"category 2\"]}}",
            self.vocabulary.instruction_block()
        )
    }
}

#[async_trait]
impl CategoryClassifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<String>, ClassificationError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.system_instruction(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Music Lyric Text: '{}'", text),
                },
            ],
            max_tokens: 1000,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        };

        let url = format!("{}/chat/completions", self.config.api_base_url);
        let response = self.client
            .post(&url)
            .bearer_auth(&self.config.api_key)
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
                "API returned {}: {}", status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                ClassificationError::MalformedResponse("response had no choices".to_string())
            })?;

        let labels = parse_label_response(content)?;
        Ok(self.vocabulary.filter(labels, self.config.strict))
    }

    fn name(&self) -> &'static str {
        "openai-chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_lists_vocabulary() {
        let classifier = OpenAiClassifier::new(ClassificationConfig::default());
        let instruction = classifier.system_instruction();
        assert!(instruction.contains("Hello: Greetings"));
        assert!(instruction.contains("\"categories\""));
    }
}
