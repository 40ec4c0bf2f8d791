use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::classifier::questionnaire::{classify, render_prompt, Answers};
use crate::config::ClassifierConfig;
use crate::errors::{MirrorError, Result};
use crate::models::{Classification, ClassificationSource, DecisionType};

const MAX_REMOTE_SCORE: f64 = 10.0;

/// A text completion backend: prompt in, raw model text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct RemoteVerdict {
    #[serde(rename = "type")]
    decision: DecisionType,
    score: f64,
    reasoning: String,
}

const FENCE: &str = "```";

/// Body of the first ```json ... ``` (or bare ```) block, ignoring any prose
/// around it. Text without a fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...).
    let rest = trimmed[open + FENCE.len()..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = match rest.find(FENCE) {
        Some(close) => &rest[..close],
        None => rest,
    };
    body.trim()
}

/// Parses model output into a classification, rejecting anything off-contract.
pub fn parse_remote_verdict(raw: &str) -> Result<Classification> {
    let body = strip_code_fences(raw);
    let verdict: RemoteVerdict = serde_json::from_str(body)?;

    if !verdict.score.is_finite() || !(0.0..=MAX_REMOTE_SCORE).contains(&verdict.score) {
        return Err(MirrorError::Parse(format!(
            "score {} outside 0-{}",
            verdict.score, MAX_REMOTE_SCORE
        )));
    }

    Ok(Classification {
        decision: verdict.decision,
        score: verdict.score,
        reasoning: Some(verdict.reasoning),
        source: ClassificationSource::Remote,
    })
}

/// Classifies purchases with an optional remote model, always falling back to
/// the local questionnaire scoring.
pub struct DecisionClassifier {
    config: ClassifierConfig,
    generator: Option<Box<dyn TextGenerator>>,
}

impl DecisionClassifier {
    pub fn local(config: ClassifierConfig) -> Self {
        Self {
            config,
            generator: None,
        }
    }

    pub fn with_generator(config: ClassifierConfig, generator: Box<dyn TextGenerator>) -> Self {
        Self {
            config,
            generator: Some(generator),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn has_remote(&self) -> bool {
        self.generator.is_some()
    }

    pub fn classify_local(&self, answers: &Answers) -> Classification {
        classify(answers, &self.config)
    }

    pub async fn classify(&self, answers: &Answers) -> Classification {
        let Some(generator) = &self.generator else {
            return self.classify_local(answers);
        };

        let prompt = render_prompt(answers);
        let outcome = match generator.generate(&prompt).await {
            Ok(text) => {
                debug!("Remote classifier replied with {} chars", text.len());
                parse_remote_verdict(&text)
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                info!(
                    "Remote classification: {} (score {:.1})",
                    result.decision, result.score
                );
                result
            }
            Err(e) => {
                warn!("Remote classification failed, using local scoring: {}", e);
                self.classify_local(answers)
            }
        }
    }
}
