use serde::{Deserialize, Serialize};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Score at or above which a purchase is classified as emotional.
pub const DEFAULT_CUTOFF: u32 = 6;
/// Stricter variant used by the second questionnaire flow.
pub const STRICT_CUTOFF: u32 = 7;
pub const DEFAULT_NEED_THRESHOLD: u32 = 6;
/// Substituted for a missing or unparsable need rating.
pub const DEFAULT_NEED_RATING: u32 = 5;
pub const LOW_NEED_WEIGHT: u32 = 2;
pub const DEFAULT_SNOWFLAKE_RETRIES: u32 = 2;
/// Upper bound on warehouse retries; backoff doubles per retry.
pub const MAX_SNOWFLAKE_RETRIES: u32 = 8;

/// A single weighted emotional signal: picking `option` on `question` adds `weight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRule {
    pub question: u8,
    pub option: String,
    pub weight: u32,
}

impl SignalRule {
    fn new(question: u8, option: &str, weight: u32) -> Self {
        Self {
            question,
            option: option.to_string(),
            weight,
        }
    }
}

/// Tunable weights and thresholds for the purchase questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub cutoff: u32,
    pub need_threshold: u32,
    pub need_default: u32,
    pub need_weight: u32,
    pub rules: Vec<SignalRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            need_threshold: DEFAULT_NEED_THRESHOLD,
            need_default: DEFAULT_NEED_RATING,
            need_weight: LOW_NEED_WEIGHT,
            rules: vec![
                // Q2: current feeling
                SignalRule::new(2, "Excited", 3),
                SignalRule::new(2, "Impulsive", 3),
                SignalRule::new(2, "Anxious", 2),
                // Q3: when the urge started
                SignalRule::new(3, "Just now", 3),
                SignalRule::new(3, "Today", 2),
                // Q5: trigger
                SignalRule::new(5, "Saw an ad", 3),
                SignalRule::new(5, "Social media", 3),
                SignalRule::new(5, "Sale or discount", 2),
                SignalRule::new(5, "Friend has it", 2),
            ],
        }
    }
}

impl ClassifierConfig {
    pub fn strict() -> Self {
        Self {
            cutoff: STRICT_CUTOFF,
            ..Self::default()
        }
    }

    pub fn with_cutoff(mut self, cutoff: u32) -> Self {
        self.cutoff = cutoff;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowflakeConfig {
    pub account_url: String,
    pub access_token: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub statement_timeout_secs: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Remote classification (disabled without an API key)
    pub gemini: Option<GeminiConfig>,

    // Remote snapshot warehouse (disabled unless URL and token are both set)
    pub snowflake: Option<SnowflakeConfig>,

    // Local storage
    pub data_dir: String,

    // Questionnaire scoring
    pub classifier: ClassifierConfig,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let timeout_secs: u64 = env("REQUEST_TIMEOUT_SECS", "30").parse().unwrap_or(30);

        let gemini_key = env("GEMINI_API_KEY", "");
        let gemini = if gemini_key.trim().is_empty() {
            None
        } else {
            Some(GeminiConfig {
                api_key: gemini_key,
                model: env("GEMINI_MODEL", "gemini-1.5-flash"),
                base_url: env(
                    "GEMINI_BASE_URL",
                    "https://generativelanguage.googleapis.com",
                ),
                timeout_secs,
            })
        };

        let account_url = env("SNOWFLAKE_ACCOUNT_URL", "");
        let access_token = env("SNOWFLAKE_ACCESS_TOKEN", "");
        let snowflake = if account_url.trim().is_empty() || access_token.trim().is_empty() {
            None
        } else {
            Some(SnowflakeConfig {
                account_url: account_url.trim_end_matches('/').to_string(),
                access_token,
                database: env("SNOWFLAKE_DATABASE", "MARKET_MIRROR"),
                schema: env("SNOWFLAKE_SCHEMA", "PUBLIC"),
                warehouse: env("SNOWFLAKE_WAREHOUSE", "COMPUTE_WH"),
                statement_timeout_secs: 60,
                max_retries: parse_retries(&env("SNOWFLAKE_MAX_RETRIES", "2")),
                timeout_secs,
            })
        };

        let classifier = ClassifierConfig {
            cutoff: env("CLASSIFIER_CUTOFF", "6").parse().unwrap_or(DEFAULT_CUTOFF),
            need_threshold: env("CLASSIFIER_NEED_THRESHOLD", "6")
                .parse()
                .unwrap_or(DEFAULT_NEED_THRESHOLD),
            ..ClassifierConfig::default()
        };

        Config {
            gemini,
            snowflake,
            data_dir: env("DATA_DIR", "data"),
            classifier,
            log_level: env("LOG_LEVEL", "info"),
        }
    }
}

fn parse_retries(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .unwrap_or(DEFAULT_SNOWFLAKE_RETRIES)
        .min(MAX_SNOWFLAKE_RETRIES)
}
