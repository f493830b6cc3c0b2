//! Rule configuration
//!
//! Built once at startup from defaults plus environment-style overrides and
//! shared read-only by every evaluation.

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::env;

/// Comma-separated list of trusted country codes
pub const SAFE_COUNTRIES: &str = "SAFE_COUNTRIES";
/// Comma-separated list of risky IP prefixes
pub const RISKY_IP_PREFIXES: &str = "RISKY_IP_PREFIXES";
/// Amount above which `high_amount` fires
pub const HIGH_AMOUNT_THRESHOLD: &str = "HIGH_AMOUNT_THRESHOLD";
/// First hour of the odd-hour window
pub const ODD_HOUR_START: &str = "ODD_HOUR_START";
/// Last hour of the odd-hour window
pub const ODD_HOUR_END: &str = "ODD_HOUR_END";
/// Attempts over 10 minutes above which `high_velocity` fires
pub const VELOCITY_LIMIT_10M: &str = "VELOCITY_LIMIT_10M";

/// Every recognized override key
pub const KEYS: [&str; 6] = [
    SAFE_COUNTRIES,
    RISKY_IP_PREFIXES,
    HIGH_AMOUNT_THRESHOLD,
    ODD_HOUR_START,
    ODD_HOUR_END,
    VELOCITY_LIMIT_10M,
];

/// Rule configuration
///
/// Country codes in `safe_countries` are stored upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    /// Countries that do not trigger `untrusted_country`
    pub safe_countries: BTreeSet<String>,

    /// IP prefixes that trigger `risky_ip_prefix`, tested in order
    pub risky_ip_prefixes: Vec<String>,

    /// Amounts strictly above this trigger `high_amount`
    pub high_amount_threshold: f64,

    /// Start of the odd-hour window (inclusive)
    pub odd_hour_start: u8,

    /// End of the odd-hour window (inclusive)
    pub odd_hour_end: u8,

    /// Attempt counts strictly above this trigger `high_velocity`
    pub velocity_limit_10m: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            safe_countries: ["US", "UK", "ES", "DE", "FR", "AR"]
                .into_iter()
                .map(String::from)
                .collect(),
            risky_ip_prefixes: vec!["181.".into(), "190.".into(), "45.".into()],
            high_amount_threshold: 500.0,
            odd_hour_start: 23,
            odd_hour_end: 6,
            velocity_limit_10m: 4,
        }
    }
}

impl RuleConfig {
    /// Build from key/value overrides on top of the defaults.
    ///
    /// Unknown keys are ignored. A recognized key with a value that does not
    /// parse fails the whole construction.
    pub fn from_overrides<I, K, V>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in overrides {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                SAFE_COUNTRIES => {
                    config.safe_countries = split_list(value)
                        .map(|code| code.to_uppercase())
                        .collect();
                }
                RISKY_IP_PREFIXES => {
                    config.risky_ip_prefixes = split_list(value).map(String::from).collect();
                }
                HIGH_AMOUNT_THRESHOLD => {
                    config.high_amount_threshold = parse_threshold(key, value)?;
                }
                ODD_HOUR_START => config.odd_hour_start = parse_hour(key, value)?,
                ODD_HOUR_END => config.odd_hour_end = parse_hour(key, value)?,
                VELOCITY_LIMIT_10M => {
                    config.velocity_limit_10m = value
                        .trim()
                        .parse::<u32>()
                        .map_err(|e| Error::invalid_config(key, value, format!("{e}")))?;
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Build from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key))
    }

    /// Build from `lookup`, queried once per recognized key.
    ///
    /// `NotPresent` keeps the default; a value that is not unicode is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, env::VarError>,
    {
        let mut overrides = Vec::new();
        for key in KEYS {
            match lookup(key) {
                Ok(value) => overrides.push((key, value)),
                Err(env::VarError::NotPresent) => {}
                Err(env::VarError::NotUnicode(raw)) => {
                    return Err(Error::invalid_config(
                        key,
                        &raw.to_string_lossy(),
                        "value is not valid unicode",
                    ));
                }
            }
        }
        Self::from_overrides(overrides)
    }

    /// Whether `hour` falls in the odd-hour window.
    ///
    /// When start > end the window wraps midnight: `[start, 23] ∪ [0, end]`.
    /// Both ends are inclusive.
    pub fn is_odd_hour(&self, hour: u8) -> bool {
        if self.odd_hour_start > self.odd_hour_end {
            hour >= self.odd_hour_start || hour <= self.odd_hour_end
        } else {
            (self.odd_hour_start..=self.odd_hour_end).contains(&hour)
        }
    }

    /// Whether `country` (any case) is trusted
    pub fn is_safe_country(&self, country: &str) -> bool {
        self.safe_countries.contains(&country.trim().to_uppercase())
    }

    /// First risky prefix `ip` starts with
    pub fn matching_ip_prefix(&self, ip: &str) -> Option<&str> {
        self.risky_ip_prefixes
            .iter()
            .find(|prefix| ip.starts_with(prefix.as_str()))
            .map(String::as_str)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_threshold(key: &str, value: &str) -> Result<f64> {
    let threshold = value
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::invalid_config(key, value, format!("{e}")))?;

    if !threshold.is_finite() || threshold < 0.0 {
        return Err(Error::invalid_config(
            key,
            value,
            "must be a finite, non-negative number",
        ));
    }
    Ok(threshold)
}

fn parse_hour(key: &str, value: &str) -> Result<u8> {
    let hour = value
        .trim()
        .parse::<i64>()
        .map_err(|e| Error::invalid_config(key, value, format!("{e}")))?;

    u8::try_from(hour)
        .ok()
        .filter(|h| *h <= 23)
        .ok_or_else(|| Error::invalid_config(key, value, "hour must be in 0..=23"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuleConfig::default();

        assert_eq!(config.safe_countries.len(), 6);
        assert!(config.is_safe_country("us"));
        assert!(!config.is_safe_country("RU"));
        assert_eq!(config.risky_ip_prefixes, vec!["181.", "190.", "45."]);
        assert_eq!(config.high_amount_threshold, 500.0);
        assert_eq!((config.odd_hour_start, config.odd_hour_end), (23, 6));
        assert_eq!(config.velocity_limit_10m, 4);
    }

    #[test]
    fn test_no_overrides_is_default() {
        let config = RuleConfig::from_overrides(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn test_overrides_applied() {
        let config = RuleConfig::from_overrides([
            (SAFE_COUNTRIES, " br , mx,,cl "),
            (RISKY_IP_PREFIXES, "10.,200.1"),
            (HIGH_AMOUNT_THRESHOLD, "1250.5"),
            (ODD_HOUR_START, "1"),
            (ODD_HOUR_END, "5"),
            (VELOCITY_LIMIT_10M, "10"),
            ("UNRELATED", "whatever"),
        ])
        .unwrap();

        let countries: Vec<&str> = config.safe_countries.iter().map(String::as_str).collect();
        assert_eq!(countries, vec!["BR", "CL", "MX"]);
        assert_eq!(config.risky_ip_prefixes, vec!["10.", "200.1"]);
        assert_eq!(config.high_amount_threshold, 1250.5);
        assert_eq!((config.odd_hour_start, config.odd_hour_end), (1, 5));
        assert_eq!(config.velocity_limit_10m, 10);
    }

    #[test]
    fn test_lookup_reads_known_keys() {
        let config = RuleConfig::from_lookup(|key| match key {
            VELOCITY_LIMIT_10M => Ok("7".to_string()),
            _ => Err(env::VarError::NotPresent),
        })
        .unwrap();

        assert_eq!(config.velocity_limit_10m, 7);
        assert_eq!(config.safe_countries, RuleConfig::default().safe_countries);
    }

    #[test]
    fn test_lookup_non_unicode_is_error() {
        let err = RuleConfig::from_lookup(|key| match key {
            SAFE_COUNTRIES => Err(env::VarError::NotUnicode(std::ffi::OsString::from("US"))),
            _ => Err(env::VarError::NotPresent),
        })
        .unwrap_err();

        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == SAFE_COUNTRIES));
    }

    #[test]
    fn test_lookup_malformed_value_is_error() {
        let result = RuleConfig::from_lookup(|key| match key {
            ODD_HOUR_START => Ok("late".to_string()),
            _ => Err(env::VarError::NotPresent),
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_number_is_error() {
        let err = RuleConfig::from_overrides([(HIGH_AMOUNT_THRESHOLD, "lots")]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == HIGH_AMOUNT_THRESHOLD));

        assert!(RuleConfig::from_overrides([(VELOCITY_LIMIT_10M, "four")]).is_err());
        assert!(RuleConfig::from_overrides([(VELOCITY_LIMIT_10M, "-1")]).is_err());
        assert!(RuleConfig::from_overrides([(HIGH_AMOUNT_THRESHOLD, "-5")]).is_err());
        assert!(RuleConfig::from_overrides([(HIGH_AMOUNT_THRESHOLD, "NaN")]).is_err());
    }

    #[test]
    fn test_hour_out_of_range_is_error() {
        assert!(RuleConfig::from_overrides([(ODD_HOUR_START, "24")]).is_err());
        assert!(RuleConfig::from_overrides([(ODD_HOUR_END, "-1")]).is_err());
        assert!(RuleConfig::from_overrides([(ODD_HOUR_END, "six")]).is_err());
        assert!(RuleConfig::from_overrides([(ODD_HOUR_END, "23")]).is_ok());
    }

    #[test]
    fn test_odd_hour_wraparound() {
        let config = RuleConfig::default();

        for hour in [23, 0, 1, 5, 6] {
            assert!(config.is_odd_hour(hour), "hour {hour} should be odd");
        }
        for hour in [7, 12, 22] {
            assert!(!config.is_odd_hour(hour), "hour {hour} should not be odd");
        }
    }

    #[test]
    fn test_odd_hour_plain_window() {
        let config = RuleConfig {
            odd_hour_start: 2,
            odd_hour_end: 4,
            ..Default::default()
        };

        assert!(!config.is_odd_hour(1));
        assert!(config.is_odd_hour(2));
        assert!(config.is_odd_hour(4));
        assert!(!config.is_odd_hour(5));

        let single = RuleConfig {
            odd_hour_start: 3,
            odd_hour_end: 3,
            ..Default::default()
        };
        assert!(single.is_odd_hour(3));
        assert!(!single.is_odd_hour(4));
    }

    #[test]
    fn test_first_matching_prefix() {
        let config = RuleConfig::from_overrides([(RISKY_IP_PREFIXES, "181.,181.45.")]).unwrap();
        assert_eq!(config.matching_ip_prefix("181.45.77.2"), Some("181."));
        assert_eq!(config.matching_ip_prefix("8.8.8.8"), None);
    }
}
