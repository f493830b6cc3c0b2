//! Core types for fraud engine

use crate::{Error, Rule};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Outcome of the 3-D Secure cardholder authentication step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreeDsResult {
    /// Cardholder authenticated
    #[default]
    Success,
    /// Authentication attempted and failed
    Failed,
    /// Issuer or card not enrolled; no signal either way
    Unavailable,
}

impl ThreeDsResult {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreeDsResult::Success => "success",
            ThreeDsResult::Failed => "failed",
            ThreeDsResult::Unavailable => "unavailable",
        }
    }
}

impl FromStr for ThreeDsResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(ThreeDsResult::Success),
            "failed" => Ok(ThreeDsResult::Failed),
            "unavailable" => Ok(ThreeDsResult::Unavailable),
            _ => Err(Error::UnknownThreeDsResult(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ThreeDsResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ThreeDsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transaction as seen by the scoring engine.
///
/// Ranges (`amount >= 0`, `hour <= 23`) are enforced by the request
/// boundary before a record is built; the engine only compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque identifier, echoed in logs only
    pub transaction_id: String,

    /// Transaction amount
    pub amount: f64,

    /// ISO2/ISO3-like country code, compared case-insensitively
    pub country: String,

    /// Dotted textual address, compared by prefix
    pub ip: String,

    /// Local transaction hour (0-23)
    pub hour: u8,

    /// Informational only
    pub currency: String,

    /// Informational only
    #[serde(default)]
    pub user_id: Option<String>,

    /// Reserved for device rules
    #[serde(default)]
    pub device_id: Option<String>,

    /// Reserved for BIN rules
    #[serde(default)]
    pub card_bin: Option<String>,

    /// Caller-supplied attempt count over the trailing 10 minutes
    #[serde(default)]
    pub attempts_last_10m: u32,

    /// 3-D Secure outcome
    #[serde(default)]
    pub three_ds_result: ThreeDsResult,
}

/// Fraud score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FraudScore(u8);

impl FraudScore {
    /// Create fraud score from a raw rule total, clamped to 100
    pub fn new(raw: u32) -> Self {
        Self(raw.min(100) as u8)
    }

    /// Get raw score
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Check if high risk (>= 70)
    pub fn is_high_risk(&self) -> bool {
        self.0 >= 70
    }

    /// Check if medium risk (30-69)
    pub fn is_medium_risk(&self) -> bool {
        (30..70).contains(&self.0)
    }

    /// Check if low risk (< 30)
    pub fn is_low_risk(&self) -> bool {
        self.0 < 30
    }
}

impl fmt::Display for FraudScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl RiskLevel {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl From<FraudScore> for RiskLevel {
    fn from(score: FraudScore) -> Self {
        if score.is_high_risk() {
            RiskLevel::High
        } else if score.is_medium_risk() {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triggered rules and their points, kept in evaluation order.
///
/// Serializes as a JSON object `{rule_name: points}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasons(Vec<(Rule, u8)>);

impl Reasons {
    /// Empty set of reasons
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, rule: Rule) {
        self.0.push((rule, rule.points()));
    }

    /// Points recorded for a rule, if it triggered
    pub fn get(&self, rule: Rule) -> Option<u8> {
        self.0.iter().find(|(r, _)| *r == rule).map(|(_, p)| *p)
    }

    /// Whether a rule triggered
    pub fn contains(&self, rule: Rule) -> bool {
        self.get(rule).is_some()
    }

    /// Sum of points before clamping
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, p)| u32::from(*p)).sum()
    }

    /// Triggered rule names in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(r, _)| r.name()).collect()
    }

    /// Iterate over (rule, points)
    pub fn iter(&self) -> impl Iterator<Item = (Rule, u8)> + '_ {
        self.0.iter().copied()
    }

    /// Number of triggered rules
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no rule triggered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Reasons {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (rule, points) in &self.0 {
            map.serialize_entry(rule.name(), points)?;
        }
        map.end()
    }
}

/// Scoring result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Clamped score
    pub fraud_score: FraudScore,

    /// Bucket derived from the score
    pub risk: RiskLevel,

    /// Triggered rules
    pub reasons: Reasons,

    /// Evaluation instant
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamps_to_100() {
        assert_eq!(FraudScore::new(130).value(), 100);
        assert_eq!(FraudScore::new(100).value(), 100);
        assert_eq!(FraudScore::new(0).value(), 0);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(RiskLevel::from(FraudScore::new(0)), RiskLevel::Low);
        assert_eq!(RiskLevel::from(FraudScore::new(29)), RiskLevel::Low);
        assert_eq!(RiskLevel::from(FraudScore::new(30)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(FraudScore::new(69)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(FraudScore::new(70)), RiskLevel::High);
        assert_eq!(RiskLevel::from(FraudScore::new(100)), RiskLevel::High);
    }

    #[test]
    fn test_three_ds_parse_is_case_insensitive() {
        assert_eq!("FAILED".parse::<ThreeDsResult>().unwrap(), ThreeDsResult::Failed);
        assert_eq!("Unavailable".parse::<ThreeDsResult>().unwrap(), ThreeDsResult::Unavailable);
        assert!("declined".parse::<ThreeDsResult>().is_err());

        let parsed: ThreeDsResult = serde_json::from_str("\"Success\"").unwrap();
        assert_eq!(parsed, ThreeDsResult::Success);
    }

    #[test]
    fn test_risk_level_wire_format() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
    }

    #[test]
    fn test_reasons_serialize_in_order() {
        let mut reasons = Reasons::new();
        reasons.push(Rule::OddHour);
        reasons.push(Rule::ThreeDsFailed);

        let json = serde_json::to_string(&reasons).unwrap();
        assert_eq!(json, r#"{"odd_hour":20,"3ds_failed":25}"#);
        assert_eq!(reasons.total(), 45);
    }

    #[test]
    fn test_record_defaults() {
        let tx: TransactionRecord = serde_json::from_str(
            r#"{"transaction_id":"tx_1","amount":10.0,"country":"es","ip":"1.1.1.1","hour":9,"currency":"EUR"}"#,
        )
        .unwrap();

        assert_eq!(tx.attempts_last_10m, 0);
        assert_eq!(tx.three_ds_result, ThreeDsResult::Success);
        assert!(tx.user_id.is_none());
    }
}
