pub mod gemini;
pub mod questionnaire;
pub mod remote;

pub use gemini::GeminiClient;
pub use questionnaire::{classify, Answers, QUESTIONS};
pub use remote::{DecisionClassifier, TextGenerator};

use crate::config::Config;
use tracing::warn;

/// Builds the classifier the configuration asks for: remote-backed when an
/// API key is present, local-only otherwise.
pub fn from_config(cfg: &Config) -> DecisionClassifier {
    match &cfg.gemini {
        Some(gemini) => match GeminiClient::new(gemini) {
            Ok(client) => DecisionClassifier::with_generator(cfg.classifier.clone(), Box::new(client)),
            Err(e) => {
                warn!("Gemini client unavailable, classifying locally: {}", e);
                DecisionClassifier::local(cfg.classifier.clone())
            }
        },
        None => DecisionClassifier::local(cfg.classifier.clone()),
    }
}
