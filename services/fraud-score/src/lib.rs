pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;

// Re-exports for convenience
pub use fraud_engine::{RuleConfig, ScoringEngine};
