use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SnowflakeConfig;
use crate::errors::{MirrorError, Result};
use crate::models::{DominantBias, EvolutionDataPoint, StoredSnapshot};
use crate::storage::SnapshotWarehouse;

const STATEMENTS_PATH: &str = "/api/v2/statements";
const EVOLUTION_LIMIT: u32 = 30;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
/// The SQL API answers 202 while a statement is still executing.
const STATUS_STILL_RUNNING: u16 = 202;

const INSERT_SNAPSHOT_SQL: &str = "INSERT INTO BEHAVIORAL_SNAPSHOTS (\
SESSION_ID, TRADER_HASH, SNAPSHOT_TIMESTAMP, \
EMOTIONAL_SELF_SCORE, RATIONAL_SELF_SCORE, DISCIPLINE_DELTA, \
DOMINANT_BIAS, TRADE_COUNT_EMOTIONAL, TRADE_COUNT_RATIONAL, \
MARKET_CONDITION, SESSION_DURATION_MINUTES, NOTES, APP_VERSION) \
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const SELECT_EVOLUTION_SQL: &str = "SELECT \
SESSION_NUMBER, SNAPSHOT_TIMESTAMP, EMOTIONAL_SELF_SCORE, \
RATIONAL_SELF_SCORE, DISCIPLINE_DELTA, DISCIPLINE_IMPROVEMENT, DOMINANT_BIAS, \
TRADE_COUNT_EMOTIONAL, TRADE_COUNT_RATIONAL \
FROM TRADER_EVOLUTION WHERE TRADER_HASH = ? \
ORDER BY SNAPSHOT_TIMESTAMP DESC LIMIT ?";

/// A positional bind value. The SQL API takes every value as a string tagged
/// with its Snowflake type; `None` binds SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Text(Option<String>),
    Real(Option<f64>),
    Fixed(Option<i64>),
}

impl Bind {
    fn to_json(&self) -> Value {
        match self {
            Bind::Text(v) => json!({ "type": "TEXT", "value": v }),
            Bind::Real(v) => json!({ "type": "REAL", "value": v.map(|x| x.to_string()) }),
            Bind::Fixed(v) => json!({ "type": "FIXED", "value": v.map(|x| x.to_string()) }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: &'static str,
    pub binds: Vec<Bind>,
}

impl Statement {
    /// Bindings keyed "1".."n" as the SQL API expects.
    pub fn bindings(&self) -> Value {
        let map: Map<String, Value> = self
            .binds
            .iter()
            .enumerate()
            .map(|(i, b)| ((i + 1).to_string(), b.to_json()))
            .collect();
        Value::Object(map)
    }

    pub fn insert_snapshot(stored: &StoredSnapshot) -> Self {
        let s = &stored.snapshot;
        Self {
            sql: INSERT_SNAPSHOT_SQL,
            binds: vec![
                Bind::Text(Some(s.session_id.clone())),
                Bind::Text(Some(stored.trader_hash.clone())),
                Bind::Text(Some(s.timestamp.clone())),
                Bind::Real(Some(s.emotional_self_score)),
                Bind::Real(Some(s.rational_self_score)),
                Bind::Real(Some(s.discipline_delta)),
                Bind::Text(Some(s.dominant_bias.to_string())),
                Bind::Fixed(Some(s.trade_count_emotional as i64)),
                Bind::Fixed(Some(s.trade_count_rational as i64)),
                Bind::Text(s.market_condition.clone()),
                Bind::Fixed(s.session_duration_minutes.map(i64::from)),
                Bind::Text(s.notes.clone()),
                Bind::Text(Some(stored.app_version.clone())),
            ],
        }
    }

    pub fn select_evolution(trader_hash: &str) -> Self {
        Self {
            sql: SELECT_EVOLUTION_SQL,
            binds: vec![
                Bind::Text(Some(trader_hash.to_string())),
                Bind::Fixed(Some(EVOLUTION_LIMIT as i64)),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
}

/// Snowflake SQL REST API client for behavioral snapshots.
pub struct SnowflakeClient {
    client: Client,
    cfg: SnowflakeConfig,
}

impl SnowflakeClient {
    pub fn new(cfg: &SnowflakeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            cfg: cfg.clone(),
        })
    }

    fn request_body(&self, stmt: &Statement) -> Value {
        json!({
            "statement": stmt.sql,
            "timeout": self.cfg.statement_timeout_secs,
            "database": self.cfg.database,
            "schema": self.cfg.schema,
            "warehouse": self.cfg.warehouse,
            "bindings": stmt.bindings(),
        })
    }

    async fn send(&self, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(format!("{}{}", self.cfg.account_url, STATEMENTS_PATH))
            .bearer_auth(&self.cfg.access_token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !is_complete(status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(MirrorError::Api { status, body });
        }

        Ok(resp.json().await?)
    }

    /// Runs a statement, retrying transient failures with exponential backoff.
    pub async fn execute(&self, stmt: &Statement) -> Result<Value> {
        let body = self.request_body(stmt);
        retry_transient(self.cfg.max_retries, RETRY_BASE_DELAY, || self.send(&body)).await
    }
}

#[async_trait]
impl SnapshotWarehouse for SnowflakeClient {
    async fn insert_snapshot(&self, stored: &StoredSnapshot) -> Result<()> {
        self.execute(&Statement::insert_snapshot(stored)).await?;
        debug!("Snapshot {} written to Snowflake", stored.snapshot.session_id);
        Ok(())
    }

    async fn fetch_evolution(&self, trader_hash: &str) -> Result<Vec<EvolutionDataPoint>> {
        let raw = self.execute(&Statement::select_evolution(trader_hash)).await?;
        parse_evolution_rows(raw)
    }
}

/// A statement has a result only on a 2xx other than "still running"; an
/// unfinished statement carries no rows yet.
fn is_complete(status: u16) -> bool {
    (200..300).contains(&status) && status != STATUS_STILL_RUNNING
}

/// Runs `op` until it succeeds, fails permanently, or `max_retries` retries
/// are used up. The wait doubles from `base_delay` after each transient failure.
pub async fn retry_transient<T, F, Fut>(max_retries: u32, base_delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = base_delay.saturating_mul(2u32.saturating_pow(attempt));
                warn!(
                    "Snowflake statement failed (attempt {}), retrying in {:?}: {}",
                    attempt + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_count(v: &Value) -> Option<usize> {
    as_f64(v).filter(|n| *n >= 0.0).map(|n| n as usize)
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_row(row: &[Value]) -> Option<EvolutionDataPoint> {
    Some(EvolutionDataPoint {
        session_number: as_f64(row.first()?)? as u32,
        timestamp: as_text(row.get(1)?)?,
        emotional_score: as_f64(row.get(2)?)?,
        rational_score: as_f64(row.get(3)?)?,
        discipline_delta: as_f64(row.get(4)?)?,
        discipline_improvement: row.get(5).and_then(as_f64),
        dominant_bias: row
            .get(6)
            .and_then(as_text)
            .map(|s| DominantBias::from_label(&s))
            .unwrap_or(DominantBias::Mixed),
        trade_count_emotional: row.get(7).and_then(as_count),
        trade_count_rational: row.get(8).and_then(as_count),
    })
}

/// Positional rows from the TRADER_EVOLUTION view, returned oldest session first.
/// Malformed rows are skipped.
pub fn parse_evolution_rows(raw: Value) -> Result<Vec<EvolutionDataPoint>> {
    let result: StatementResult = serde_json::from_value(raw)?;
    let rows = result.data.unwrap_or_default();

    let mut points: Vec<EvolutionDataPoint> = rows
        .iter()
        .filter_map(|row| {
            let parsed = parse_row(row);
            if parsed.is_none() {
                debug!("Skipping malformed evolution row: {:?}", row);
            }
            parsed
        })
        .collect();

    points.sort_by_key(|p| p.session_number);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BehavioralSnapshot;

    fn stored(notes: Option<&str>) -> StoredSnapshot {
        StoredSnapshot {
            snapshot: BehavioralSnapshot {
                session_id: "s-1".into(),
                timestamp: "2024-01-15T12:00:00Z".into(),
                emotional_self_score: 60.0,
                rational_self_score: 74.0,
                discipline_delta: 14.0,
                dominant_bias: DominantBias::Mixed,
                trade_count_emotional: 2,
                trade_count_rational: 2,
                market_condition: None,
                session_duration_minutes: Some(20),
                notes: notes.map(String::from),
            },
            trader_hash: "17862".into(),
            app_version: "0.1.0".into(),
        }
    }

    #[test]
    fn insert_uses_placeholders_not_values() {
        let stmt = Statement::insert_snapshot(&stored(Some("it's fine'); DROP TABLE x; --")));
        assert!(!stmt.sql.contains("DROP"));
        assert_eq!(stmt.sql.matches('?').count(), stmt.binds.len());
        assert_eq!(stmt.binds.len(), 13);

        let bindings = stmt.bindings();
        assert_eq!(bindings["1"]["type"], "TEXT");
        assert_eq!(bindings["1"]["value"], "s-1");
        assert_eq!(bindings["4"]["type"], "REAL");
        assert_eq!(bindings["4"]["value"], "60");
        assert_eq!(bindings["8"]["type"], "FIXED");
        assert_eq!(bindings["8"]["value"], "2");
        assert!(bindings["10"]["value"].is_null());
        assert_eq!(bindings["12"]["value"], "it's fine'); DROP TABLE x; --");
    }

    #[test]
    fn select_binds_hash_and_limit() {
        let stmt = Statement::select_evolution("abc");
        let bindings = stmt.bindings();
        assert_eq!(bindings["1"]["value"], "abc");
        assert_eq!(bindings["2"]["value"], "30");
        assert_eq!(stmt.sql.matches('?').count(), 2);
    }

    #[test]
    fn request_body_carries_context() {
        let client = SnowflakeClient::new(&SnowflakeConfig {
            account_url: "https://acct.snowflakecomputing.com".into(),
            access_token: "t".into(),
            database: "MARKET_MIRROR".into(),
            schema: "PUBLIC".into(),
            warehouse: "COMPUTE_WH".into(),
            statement_timeout_secs: 60,
            max_retries: 0,
            timeout_secs: 5,
        })
        .unwrap();
        let body = client.request_body(&Statement::select_evolution("abc"));
        assert_eq!(body["timeout"], 60);
        assert_eq!(body["database"], "MARKET_MIRROR");
        assert_eq!(body["schema"], "PUBLIC");
        assert_eq!(body["warehouse"], "COMPUTE_WH");
        assert!(body["statement"].as_str().unwrap().contains("TRADER_EVOLUTION"));
    }

    #[test]
    fn still_running_is_not_a_result() {
        assert!(is_complete(200));
        assert!(!is_complete(STATUS_STILL_RUNNING));
        assert!(!is_complete(422));
        assert!(!is_complete(503));
    }

    fn api(status: u16) -> MirrorError {
        MirrorError::Api {
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let mut calls = 0;
        let out = retry_transient(3, Duration::ZERO, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(api(503))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<()> = retry_transient(2, Duration::ZERO, || {
            calls += 1;
            async { Err(api(429)) }
        })
        .await;
        assert!(matches!(result, Err(MirrorError::Api { status: 429, .. })));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<()> = retry_transient(5, Duration::ZERO, || {
            calls += 1;
            async { Err(api(401)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn large_retry_budget_does_not_overflow_backoff() {
        let mut calls = 0;
        let result: Result<()> = retry_transient(40, Duration::ZERO, || {
            calls += 1;
            async { Err(api(500)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 41);
    }

    #[test]
    fn parses_string_rows_oldest_first() {
        let raw = json!({
            "data": [
                ["2", "2024-01-16T12:00:00Z", "55.5", "70", "14.5", "4.5", "revenge"],
                ["1", "2024-01-15T12:00:00Z", "60", "70", "10", null, "mixed"]
            ]
        });
        let points = parse_evolution_rows(raw).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].session_number, 1);
        assert_eq!(points[0].discipline_improvement, None);
        assert_eq!(points[1].session_number, 2);
        assert_eq!(points[1].emotional_score, 55.5);
        assert_eq!(points[1].discipline_improvement, Some(4.5));
        assert_eq!(points[1].dominant_bias, DominantBias::Revenge);
        assert_eq!(points[1].trade_count_emotional, None);
    }

    #[test]
    fn reads_trade_counts_when_present() {
        let raw = json!({
            "data": [["1", "2024-01-15T12:00:00Z", "60", "74", "14", null, "mixed", "2", 3]]
        });
        let points = parse_evolution_rows(raw).unwrap();
        assert_eq!(points[0].trade_count_emotional, Some(2));
        assert_eq!(points[0].trade_count_rational, Some(3));
    }

    #[test]
    fn skips_malformed_rows_and_tolerates_missing_data() {
        let raw = json!({ "data": [[1, "t", 1.0, 2.0, 1.0, null, "mixed"], ["x"]] });
        assert_eq!(parse_evolution_rows(raw).unwrap().len(), 1);
        assert!(parse_evolution_rows(json!({})).unwrap().is_empty());
    }
}
