use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ClassifierConfig;
use crate::models::{Classification, ClassificationSource, DecisionType};

pub const ITEM_QUESTION: u8 = 1;
pub const FEELING_QUESTION: u8 = 2;
pub const RECENCY_QUESTION: u8 = 3;
pub const NEED_QUESTION: u8 = 4;
pub const TRIGGER_QUESTION: u8 = 5;

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub id: u8,
    pub prompt: &'static str,
    /// Empty for free-text questions.
    pub options: &'static [&'static str],
}

pub const QUESTIONS: &[Question] = &[
    Question {
        id: ITEM_QUESTION,
        prompt: "What are you thinking about buying?",
        options: &[],
    },
    Question {
        id: FEELING_QUESTION,
        prompt: "How are you feeling right now?",
        options: &["Excited", "Anxious", "Impulsive", "Calm", "Neutral", "Content"],
    },
    Question {
        id: RECENCY_QUESTION,
        prompt: "When did you first want this?",
        options: &["Just now", "Today", "This week", "Over a month ago"],
    },
    Question {
        id: NEED_QUESTION,
        prompt: "On a scale of 1-10, how much do you need it?",
        options: &[],
    },
    Question {
        id: TRIGGER_QUESTION,
        prompt: "What made you want it?",
        options: &[
            "Saw an ad",
            "Social media",
            "Sale or discount",
            "Friend has it",
            "Replacing something",
            "Planned purchase",
        ],
    },
];

pub fn question(id: u8) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Answers keyed by question id. Values are either a picked option or free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers(BTreeMap<u8, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, question: u8, answer: impl Into<String>) -> Self {
        self.set(question, answer);
        self
    }

    pub fn set(&mut self, question: u8, answer: impl Into<String>) {
        self.0.insert(question, answer.into());
    }

    pub fn get(&self, question: u8) -> Option<&str> {
        self.0.get(&question).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Builds answers from positional values, first value is question 1.
    pub fn from_positional<S: AsRef<str>>(values: &[S]) -> Self {
        let mut answers = Self::new();
        for (i, v) in values.iter().enumerate() {
            answers.set((i + 1) as u8, v.as_ref());
        }
        answers
    }
}

/// Need rating as given, with the midpoint substituted for anything unusable.
/// Fractional ratings are kept so the threshold comparison stays exact.
pub fn need_rating(answers: &Answers, cfg: &ClassifierConfig) -> f64 {
    answers
        .get(NEED_QUESTION)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(cfg.need_default as f64)
}

/// Raw emotional score: sum of every matched signal weight.
pub fn emotional_score(answers: &Answers, cfg: &ClassifierConfig) -> u32 {
    let signals: u32 = cfg
        .rules
        .iter()
        .filter(|rule| {
            answers
                .get(rule.question)
                .map(|a| a.trim().eq_ignore_ascii_case(rule.option.trim()))
                .unwrap_or(false)
        })
        .map(|rule| rule.weight)
        .sum();

    let need = if need_rating(answers, cfg) < cfg.need_threshold as f64 {
        cfg.need_weight
    } else {
        0
    };

    signals + need
}

pub fn decision_for_score(score: u32, cfg: &ClassifierConfig) -> DecisionType {
    if score >= cfg.cutoff {
        DecisionType::Emotional
    } else {
        DecisionType::Rational
    }
}

/// Classifies a purchase locally. Never fails.
pub fn classify(answers: &Answers, cfg: &ClassifierConfig) -> Classification {
    let score = emotional_score(answers, cfg);
    Classification {
        decision: decision_for_score(score, cfg),
        score: score as f64,
        reasoning: None,
        source: ClassificationSource::Local,
    }
}

/// Natural-language rendering of the answers for the remote classifier.
pub fn render_prompt(answers: &Answers) -> String {
    let mut lines = vec![
        "You are a mindful-spending coach. A user answered a short questionnaire about a purchase they are considering.".to_string(),
        String::new(),
    ];

    for q in QUESTIONS {
        let answer = answers.get(q.id).unwrap_or("(no answer)");
        lines.push(format!("Q{}: {}", q.id, q.prompt));
        lines.push(format!("A{}: {}", q.id, answer));
    }

    lines.push(String::new());
    lines.push(
        "Decide whether this purchase is driven by emotion or by deliberate reasoning. \
         Respond with only a JSON object of the form \
         {\"type\": \"emotional\" | \"rational\", \"score\": <number 0-10, higher is more emotional>, \
         \"reasoning\": \"<one or two sentences>\"}."
            .to_string(),
    );

    lines.join("\n")
}
