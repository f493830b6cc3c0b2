use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use fraud_score_service::{
    config::Config,
    handlers,
    middleware::{ApiKeyAuth, RateLimiter},
    RuleConfig, ScoringEngine,
};
use std::num::NonZeroU32;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("fraud_score=info,fraud_score_service=info,actix_web=info")
            }),
        )
        .json()
        .init();

    info!("Starting FraudScore API...");

    // Both configurations must be complete before anything is served
    let config = Config::from_env().context("Failed to load service configuration")?;
    let rules = RuleConfig::from_env().context("Failed to load rule configuration")?;

    info!(
        safe_countries = ?rules.safe_countries,
        risky_ip_prefixes = ?rules.risky_ip_prefixes,
        high_amount_threshold = rules.high_amount_threshold,
        odd_hour_start = rules.odd_hour_start,
        odd_hour_end = rules.odd_hour_end,
        velocity_limit_10m = rules.velocity_limit_10m,
        "Rule configuration loaded"
    );

    if config.auth.api_key.is_none() {
        warn!("API_KEY is not set; /fraud-score accepts unauthenticated requests");
    }

    let requests_per_min = NonZeroU32::new(config.rate_limit.requests_per_min)
        .context("REQUESTS_PER_MIN must be greater than 0")?;

    let engine = web::Data::new(ScoringEngine::new(rules));
    let rate_limiter = RateLimiter::new(requests_per_min);
    let auth = ApiKeyAuth::new(config.auth.api_key.clone());

    let server_config = config.server.clone();

    info!(
        "Starting HTTP server on {}:{} ({} requests/min per caller)",
        server_config.host, server_config.port, requests_per_min
    );

    HttpServer::new(move || {
        App::new()
            .app_data(engine.clone())
            .wrap(rate_limiter.clone())
            .wrap(auth.clone())
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(handlers::configure_routes)
    })
    .workers(server_config.workers)
    .bind((server_config.host, server_config.port))?
    .run()
    .await?;

    Ok(())
}
