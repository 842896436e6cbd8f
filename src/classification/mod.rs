// Classification module
// Maps segment transcripts onto category labels from a controlled vocabulary
// via an external chat-completion backend.

pub mod provider;
pub mod vocabulary;

mod ollama;
mod openai;

pub use ollama::OllamaClassifier;
pub use openai::OpenAiClassifier;
pub use provider::{CategoryClassifier, ClassificationError};
pub use vocabulary::Vocabulary;

use std::sync::Arc;

use crate::config::{ClassificationBackend, ClassificationConfig};

/// Build the configured classification backend
pub fn create_classifier(config: &ClassificationConfig) -> Arc<dyn CategoryClassifier> {
    match config.backend {
        ClassificationBackend::OpenAi => Arc::new(OpenAiClassifier::new(config.clone())),
        ClassificationBackend::Ollama => Arc::new(OllamaClassifier::new(config.clone())),
    }
}
