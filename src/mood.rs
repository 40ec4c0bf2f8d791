use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub struct MoodOption {
    pub text: &'static str,
    pub score: i32,
}

pub struct MoodQuestion {
    pub id: u8,
    pub question: &'static str,
    pub options: [MoodOption; 5],
}

const fn opt(text: &'static str, score: i32) -> MoodOption {
    MoodOption { text, score }
}

pub static MOOD_QUESTIONS: [MoodQuestion; 4] = [
    MoodQuestion {
        id: 1,
        question: "How would you describe your energy right now?",
        options: [
            opt("Exhausted", -2),
            opt("Low energy", -1),
            opt("Normal", 0),
            opt("Energized", 1),
            opt("Super pumped", 2),
        ],
    },
    MoodQuestion {
        id: 2,
        question: "How's your stress level?",
        options: [
            opt("Very stressed", -2),
            opt("Somewhat stressed", -1),
            opt("Neutral", 0),
            opt("Calm", 1),
            opt("Completely relaxed", 2),
        ],
    },
    MoodQuestion {
        id: 3,
        question: "How are you feeling emotionally?",
        options: [
            opt("Sad or down", -2),
            opt("A bit low", -1),
            opt("Okay", 0),
            opt("Happy", 1),
            opt("Very happy", 2),
        ],
    },
    MoodQuestion {
        id: 4,
        question: "How impulsive do you feel?",
        options: [
            opt("Very impulsive", -2),
            opt("Somewhat impulsive", -1),
            opt("Balanced", 0),
            opt("Thoughtful", 1),
            opt("Very deliberate", 2),
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Excellent,
    Good,
    Neutral,
    Low,
    Challenging,
}

impl Mood {
    pub fn from_average(avg: f64) -> Self {
        if avg >= 1.5 {
            Mood::Excellent
        } else if avg >= 0.5 {
            Mood::Good
        } else if avg >= -0.5 {
            Mood::Neutral
        } else if avg >= -1.5 {
            Mood::Low
        } else {
            Mood::Challenging
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Mood::Excellent => "You're in a great headspace! This is an ideal time for making important decisions. Your energy and positivity will help you think clearly.",
            Mood::Good => "You're feeling pretty good! You're in a balanced state, which is perfect for thoughtful decision-making.",
            Mood::Neutral => "You're feeling okay. Before making big purchases, take a moment to check in with yourself about whether this is something you truly need.",
            Mood::Low => "You're feeling a bit down or stressed. It might be best to wait on non-essential purchases. Consider talking to a friend or taking some self-care time.",
            Mood::Challenging => "You're going through a tough time right now. We recommend avoiding major purchase decisions today. Reach out to your community for support instead.",
        }
    }

    /// Whether non-essential purchases should wait.
    pub fn should_delay_purchases(&self) -> bool {
        matches!(self, Mood::Low | Mood::Challenging)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Excellent => write!(f, "Excellent"),
            Mood::Good => write!(f, "Good"),
            Mood::Neutral => write!(f, "Neutral"),
            Mood::Low => write!(f, "Low"),
            Mood::Challenging => write!(f, "Challenging"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodResult {
    pub mood: Mood,
    pub average: f64,
    pub advice: String,
}

/// Scores one check-in. No answers reads as neutral.
pub fn analyze_mood(scores: &[i32]) -> MoodResult {
    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<i32>() as f64 / scores.len() as f64
    };
    let mood = Mood::from_average(average);
    MoodResult {
        mood,
        average,
        advice: mood.advice().to_string(),
    }
}

/// Maps option indices (0..5) to scores; out-of-range picks are dropped.
pub fn scores_for_choices(choices: &[usize]) -> Vec<i32> {
    MOOD_QUESTIONS
        .iter()
        .zip(choices)
        .filter_map(|(q, &c)| q.options.get(c).map(|o| o.score))
        .collect()
}

/// Picks a random option for every question.
pub fn random_check_in<R: Rng>(rng: &mut R) -> Vec<usize> {
    MOOD_QUESTIONS
        .iter()
        .map(|q| rng.random_range(0..q.options.len()))
        .collect()
}
