pub mod behavior;
pub mod decision;
pub mod snapshot;
pub mod trade;

pub use behavior::{DominantBias, MarketCondition};
pub use decision::{Classification, ClassificationSource, DecisionType};
pub use snapshot::{BehavioralSnapshot, EvolutionDataPoint, InsertOutcome, StoredSnapshot};
pub use trade::{Trade, TradeAction, TradeType};
