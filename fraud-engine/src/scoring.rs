//! Fraud scoring engine

use crate::{FraudScore, Reasons, RiskLevel, Rule, RuleConfig, ScoreResult, TransactionRecord};

/// Scoring engine bound to one immutable rule configuration.
///
/// Holds no mutable state; share it behind an `Arc` across workers.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: RuleConfig,
}

impl ScoringEngine {
    /// Create new scoring engine
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Score a transaction
    pub fn evaluate(&self, tx: &TransactionRecord) -> ScoreResult {
        evaluate(tx, &self.config)
    }
}

/// Score a transaction against a configuration.
///
/// Every rule is checked independently; the points of the ones that fire are
/// summed and clamped to 100 before bucketing.
pub fn evaluate(tx: &TransactionRecord, cfg: &RuleConfig) -> ScoreResult {
    let mut reasons = Reasons::new();

    for rule in Rule::ALL {
        if rule.triggers(tx, cfg) {
            reasons.push(rule);
        }
    }

    let fraud_score = FraudScore::new(reasons.total());

    ScoreResult {
        fraud_score,
        risk: RiskLevel::from(fraud_score),
        reasons,
        timestamp: chrono::Utc::now(),
    }
}
