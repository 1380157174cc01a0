use serde::{Deserialize, Serialize};
use crate::models::domain::{DecodedBarcode, ProductRecord, SafetyVerdict, UserProfile, Verdict};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub profile: UserProfile,
}

/// Suggested terms for building a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub allergies: Vec<String>,
    #[serde(rename = "healthConditions")]
    pub health_conditions: Vec<String>,
}

/// Verdict plus a human-readable summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    #[serde(flatten)]
    pub verdict: SafetyVerdict,
    pub message: String,
}

impl From<SafetyVerdict> for SafetyReport {
    fn from(verdict: SafetyVerdict) -> Self {
        let message = verdict.verdict.message().to_string();
        Self { verdict, message }
    }
}

impl SafetyReport {
    pub fn verdict(&self) -> Verdict {
        self.verdict.verdict
    }
}

/// Result of scanning an image or looking up a barcode for the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub barcode: Option<DecodedBarcode>,
    pub product: ProductRecord,
    pub safety: SafetyReport,
}
