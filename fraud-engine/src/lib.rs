//! Fraud scoring engine for FraudScore
//!
//! Stateless, rule-based risk scoring for single card transactions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod rules;
pub mod scoring;
pub mod types;

pub use config::RuleConfig;
pub use error::{Error, Result};
pub use rules::Rule;
pub use scoring::{evaluate, ScoringEngine};
pub use types::*;
