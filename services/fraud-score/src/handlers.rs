use crate::errors::{ApiError, ApiResult};
use crate::metrics;
use crate::models::*;
use actix_web::{web, HttpResponse};
use fraud_engine::ScoringEngine;
use tracing::{error, info};

pub const SERVICE_NAME: &str = "FraudScore API";

// ===== Health Check =====
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ===== Service Descriptor =====
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "POST /fraud-score".to_string(),
            "GET /health".to_string(),
            "GET /metrics".to_string(),
        ],
    })
}

// ===== Score Transaction =====
pub async fn score_transaction(
    req: web::Json<TransactionRequest>,
    engine: web::Data<ScoringEngine>,
) -> ApiResult<HttpResponse> {
    let tx = req.into_inner().into_record().map_err(|e| {
        metrics::VALIDATION_FAILURES.inc();
        e
    })?;

    let result = engine.evaluate(&tx);
    metrics::observe_score(&result);

    info!(
        transaction_id = %tx.transaction_id,
        amount = tx.amount,
        country = %tx.country,
        ip = %tx.ip,
        hour = tx.hour,
        score = result.fraud_score.value(),
        bucket = %result.risk,
        reasons = ?result.reasons.names(),
        "Transaction scored"
    );

    Ok(HttpResponse::Ok().json(result))
}

// ===== Prometheus Metrics =====
pub async fn prometheus_metrics() -> ApiResult<HttpResponse> {
    let body = metrics::metrics_handler().map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        ApiError::InternalError(e.to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

// ===== Configure Routes =====
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        metrics::VALIDATION_FAILURES.inc();
        ApiError::ValidationError(err.to_string()).into()
    }))
    .route("/", web::get().to(index))
    .route("/health", web::get().to(health_check))
    .route("/metrics", web::get().to(prometheus_metrics))
    .route("/fraud-score", web::post().to(score_transaction));
}
