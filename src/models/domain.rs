use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stored user health profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub mobile: String,
    pub age: u8,
    pub allergies: Vec<String>,
    #[serde(rename = "healthConditions")]
    pub health_conditions: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub username: String,
    pub name: String,
    pub mobile: String,
    pub age: u8,
    pub allergies: Vec<String>,
    pub health_conditions: Vec<String>,
}

/// Profile edit. Term lists replace the stored lists wholesale.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub allergies: Option<Vec<String>>,
    pub health_conditions: Option<Vec<String>>,
}

/// Product data fetched for a single scan; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub barcode: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
}

impl ProductRecord {
    /// True when the record holds no product data beyond its barcode
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.brand, &self.category, &self.description, &self.ingredients]
            .iter()
            .all(|field| field.is_none())
    }
}

/// A barcode read from an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedBarcode {
    pub value: String,
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Unsafe,
    /// No ingredient data to check against
    Unknown,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Safe => "This product appears to be safe for you",
            Verdict::Unsafe => "This product may not be safe for you",
            Verdict::Unknown => "Cannot verify safety: ingredient list unavailable",
        }
    }
}

/// Result of checking one product against one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub verdict: Verdict,
    #[serde(rename = "matchedAllergies")]
    pub matched_allergies: BTreeSet<String>,
    #[serde(rename = "matchedConditions")]
    pub matched_conditions: BTreeSet<String>,
}

impl SafetyVerdict {
    pub fn unknown() -> Self {
        Self {
            verdict: Verdict::Unknown,
            matched_allergies: BTreeSet::new(),
            matched_conditions: BTreeSet::new(),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.verdict == Verdict::Safe
    }

    /// Union of matched allergy and condition terms
    pub fn matched_terms(&self) -> BTreeSet<String> {
        self.matched_allergies
            .union(&self.matched_conditions)
            .cloned()
            .collect()
    }
}
