use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to register a new profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub username: String,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 4, max = 20))]
    pub mobile: String,
    #[validate(range(min = 1, max = 120))]
    #[serde(default = "default_age")]
    pub age: u8,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub allergies: Vec<String>,
    #[validate(length(max = 100))]
    #[serde(default, alias = "health_conditions", rename = "healthConditions")]
    pub health_conditions: Vec<String>,
}

fn default_age() -> u8 {
    30
}

/// Log in with the mobile number used at registration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 20))]
    pub mobile: String,
}

/// Profile edit. Only the fields sent are changed; a list that is sent
/// replaces the stored one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 120))]
    pub age: Option<u8>,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    #[validate(length(max = 100))]
    #[serde(default, alias = "health_conditions", rename = "healthConditions")]
    pub health_conditions: Option<Vec<String>>,
}

/// Check free-form ingredient text against the caller's profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SafetyCheckRequest {
    #[validate(length(max = 20000))]
    pub ingredients: Option<String>,
}
