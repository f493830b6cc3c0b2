//! Fraud rules
//!
//! The rule set is closed: six independent predicates, each worth a fixed
//! number of points, evaluated in the order of [`Rule::ALL`].

use crate::{RuleConfig, ThreeDsResult, TransactionRecord};
use std::fmt;

/// A single scoring rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Amount above the configured threshold
    HighAmount,
    /// Country outside the safe list
    UntrustedCountry,
    /// Hour inside the odd-hour window
    OddHour,
    /// IP starting with a risky prefix
    RiskyIpPrefix,
    /// Too many attempts in the last 10 minutes
    HighVelocity,
    /// 3-D Secure authentication failed
    ThreeDsFailed,
}

impl Rule {
    /// All rules in evaluation order
    pub const ALL: [Rule; 6] = [
        Rule::HighAmount,
        Rule::UntrustedCountry,
        Rule::OddHour,
        Rule::RiskyIpPrefix,
        Rule::HighVelocity,
        Rule::ThreeDsFailed,
    ];

    /// Name used as the key in `reasons`
    pub fn name(&self) -> &'static str {
        match self {
            Rule::HighAmount => "high_amount",
            Rule::UntrustedCountry => "untrusted_country",
            Rule::OddHour => "odd_hour",
            Rule::RiskyIpPrefix => "risky_ip_prefix",
            Rule::HighVelocity => "high_velocity",
            Rule::ThreeDsFailed => "3ds_failed",
        }
    }

    /// Fixed weight
    pub fn points(&self) -> u8 {
        match self {
            Rule::HighAmount => 30,
            Rule::UntrustedCountry => 20,
            Rule::OddHour => 20,
            Rule::RiskyIpPrefix => 10,
            Rule::HighVelocity => 25,
            Rule::ThreeDsFailed => 25,
        }
    }

    /// Whether the rule fires for this transaction
    pub fn triggers(&self, tx: &TransactionRecord, cfg: &RuleConfig) -> bool {
        match self {
            Rule::HighAmount => tx.amount > cfg.high_amount_threshold,
            Rule::UntrustedCountry => !cfg.is_safe_country(&tx.country),
            Rule::OddHour => cfg.is_odd_hour(tx.hour),
            Rule::RiskyIpPrefix => cfg.matching_ip_prefix(&tx.ip).is_some(),
            Rule::HighVelocity => tx.attempts_last_10m > cfg.velocity_limit_10m,
            // "unavailable" carries no signal and never counts as a failure
            Rule::ThreeDsFailed => tx.three_ds_result == ThreeDsResult::Failed,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx() -> TransactionRecord {
        TransactionRecord {
            transaction_id: "tx_rules".into(),
            amount: 50.0,
            country: "US".into(),
            ip: "8.8.8.8".into(),
            hour: 12,
            currency: "USD".into(),
            user_id: None,
            device_id: None,
            card_bin: None,
            attempts_last_10m: 0,
            three_ds_result: ThreeDsResult::Success,
        }
    }

    #[test]
    fn test_weights_sum_to_130() {
        let total: u32 = Rule::ALL.iter().map(|r| u32::from(r.points())).sum();
        assert_eq!(total, 130);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = Rule::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Rule::ALL.len());
    }

    #[test]
    fn test_high_amount_is_strict() {
        let cfg = RuleConfig::default();
        let mut t = tx();

        t.amount = 500.0;
        assert!(!Rule::HighAmount.triggers(&t, &cfg));
        t.amount = 500.01;
        assert!(Rule::HighAmount.triggers(&t, &cfg));
    }

    #[test]
    fn test_country_case_insensitive() {
        let cfg = RuleConfig::default();
        let mut t = tx();

        t.country = "es".into();
        assert!(!Rule::UntrustedCountry.triggers(&t, &cfg));
        t.country = "ru".into();
        assert!(Rule::UntrustedCountry.triggers(&t, &cfg));
    }

    #[test]
    fn test_velocity_is_strict() {
        let cfg = RuleConfig::default();
        let mut t = tx();

        t.attempts_last_10m = 4;
        assert!(!Rule::HighVelocity.triggers(&t, &cfg));
        t.attempts_last_10m = 5;
        assert!(Rule::HighVelocity.triggers(&t, &cfg));
    }

    #[test]
    fn test_ip_prefix_is_textual() {
        let cfg = RuleConfig::default();
        let mut t = tx();

        t.ip = "45.1.2.3".into();
        assert!(Rule::RiskyIpPrefix.triggers(&t, &cfg));
        // 145. is not 45.
        t.ip = "145.1.2.3".into();
        assert!(!Rule::RiskyIpPrefix.triggers(&t, &cfg));
    }

    #[test]
    fn test_only_failed_3ds_triggers() {
        let cfg = RuleConfig::default();
        let mut t = tx();

        t.three_ds_result = ThreeDsResult::Unavailable;
        assert!(!Rule::ThreeDsFailed.triggers(&t, &cfg));
        t.three_ds_result = ThreeDsResult::Failed;
        assert!(Rule::ThreeDsFailed.triggers(&t, &cfg));
    }
}
