use fraud_engine::ScoreResult;
use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    // Scoring metrics
    pub static ref SCORES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("fraud_scores_total", "Transactions scored, by risk bucket"),
        &["risk"]
    ).expect("metric can be created");

    pub static ref SCORE_DISTRIBUTION: Histogram = Histogram::with_opts(
        HistogramOpts::new("fraud_score_distribution", "Distribution of fraud scores")
            .buckets(vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0])
    ).expect("metric can be created");

    pub static ref RULE_TRIGGERS: IntCounterVec = IntCounterVec::new(
        Opts::new("fraud_rule_triggers_total", "Rule triggers, by rule name"),
        &["rule"]
    ).expect("metric can be created");

    pub static ref VALIDATION_FAILURES: IntCounter = IntCounter::new(
        "fraud_validation_failures_total",
        "Scoring requests rejected by validation"
    ).expect("metric can be created");

    // Access control metrics
    pub static ref AUTH_FAILURES: IntCounter = IntCounter::new(
        "auth_failures_total",
        "Requests rejected for a missing or wrong API key"
    ).expect("metric can be created");

    pub static ref RATE_LIMITED: IntCounter = IntCounter::new(
        "rate_limited_total",
        "Requests rejected by the per-caller rate limit"
    ).expect("metric can be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_metrics(&registry).expect("metrics can be registered");
        registry
    };
}

/// Register all metrics with the given registry
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(SCORES_TOTAL.clone()))?;
    registry.register(Box::new(SCORE_DISTRIBUTION.clone()))?;
    registry.register(Box::new(RULE_TRIGGERS.clone()))?;
    registry.register(Box::new(VALIDATION_FAILURES.clone()))?;
    registry.register(Box::new(AUTH_FAILURES.clone()))?;
    registry.register(Box::new(RATE_LIMITED.clone()))?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;

    Ok(())
}

/// Record one scoring outcome
pub fn observe_score(result: &ScoreResult) {
    SCORES_TOTAL.with_label_values(&[result.risk.as_str()]).inc();
    SCORE_DISTRIBUTION.observe(f64::from(result.fraud_score.value()));
    for (rule, _) in result.reasons.iter() {
        RULE_TRIGGERS.with_label_values(&[rule.name()]).inc();
    }
}

/// Generate metrics output in Prometheus text format
pub fn metrics_handler() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
