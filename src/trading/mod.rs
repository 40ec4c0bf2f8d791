pub mod behavior_analyzer;
pub mod insights;
pub mod replay;

pub use behavior_analyzer::{analyze_trader_behavior, AnalysisResult, BiasCounts};
pub use insights::{compute_insights, TraderInsights};
pub use replay::{sample_trading_day, DayReplay};
