use fraud_engine::{ThreeDsResult, TransactionRecord};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::ApiError;

// ===== Scoring Request =====
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct TransactionRequest {
    #[validate(length(min = 1, max = 128))]
    pub transaction_id: String,

    #[validate(range(min = 0.0))]
    pub amount: f64,

    // ISO2 / ISO3 style code
    #[validate(length(min = 2, max = 3))]
    pub country: String,

    #[validate(length(min = 1, max = 64))]
    pub ip: String,

    // Signed so that negative hours reach validation instead of failing to parse
    #[validate(range(min = 0, max = 23))]
    pub hour: i64,

    #[validate(length(min = 1, max = 8))]
    pub currency: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub card_bin: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub attempts_last_10m: i64,

    #[serde(default = "default_three_ds_result")]
    #[validate(custom = "validate_three_ds_result")]
    pub three_ds_result: String,
}

fn default_three_ds_result() -> String {
    ThreeDsResult::Success.as_str().to_string()
}

fn validate_three_ds_result(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<ThreeDsResult>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("three_ds_result"))
}

impl TransactionRequest {
    /// Validate and convert into the engine's record
    pub fn into_record(self) -> Result<TransactionRecord, ApiError> {
        self.validate()?;

        let hour = u8::try_from(self.hour)
            .map_err(|_| ApiError::ValidationError(format!("hour out of range: {}", self.hour)))?;
        // Counts past u32::MAX are still "too many"
        let attempts_last_10m = u32::try_from(self.attempts_last_10m).unwrap_or(u32::MAX);
        let three_ds_result = self
            .three_ds_result
            .parse::<ThreeDsResult>()
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        Ok(TransactionRecord {
            transaction_id: self.transaction_id,
            amount: self.amount,
            country: self.country.trim().to_string(),
            ip: self.ip.trim().to_string(),
            hour,
            currency: self.currency,
            user_id: self.user_id,
            device_id: self.device_id,
            card_bin: self.card_bin,
            attempts_last_10m,
            three_ds_result,
        })
    }
}

// ===== Health Check =====
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ===== Service Descriptor =====
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

// ===== Error Response =====
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
