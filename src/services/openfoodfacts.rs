use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CacheSettings, ProductApiSettings};
use crate::models::ProductRecord;

/// Errors that can occur when talking to the product database
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid barcode: {0}")]
    InvalidBarcode(String),
}

/// Outcome of looking up a barcode
#[derive(Debug)]
pub enum LookupOutcome {
    Found(ProductRecord),
    NotFound,
    ServiceError(LookupError),
}

/// Raw `/api/v0/product/{barcode}.json` response
#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    categories: Option<String>,
    #[serde(default)]
    generic_name: Option<String>,
    #[serde(default)]
    ingredients_text: Option<String>,
}

impl OffProduct {
    fn into_record(self, barcode: &str) -> ProductRecord {
        ProductRecord {
            barcode: barcode.to_string(),
            name: non_blank(self.product_name),
            brand: non_blank(self.brands),
            category: non_blank(self.categories),
            description: non_blank(self.generic_name),
            ingredients: non_blank(self.ingredients_text),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Open Food Facts API client
///
/// Found products are kept in a short-lived in-memory cache keyed by
/// barcode. Not-found results and errors are never cached.
pub struct ProductClient {
    base_url: String,
    client: Client,
    cache: Option<Cache<String, ProductRecord>>,
}

impl ProductClient {
    /// Create a new client
    pub fn new(api: &ProductApiSettings, cache: &CacheSettings) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(api.user_agent.clone())
            .build()?;

        let cache = (cache.ttl_secs > 0).then(|| {
            Cache::builder()
                .max_capacity(cache.max_entries)
                .time_to_live(Duration::from_secs(cache.ttl_secs))
                .build()
        });

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            client,
            cache,
        })
    }

    /// Look up a product by barcode
    pub async fn lookup(&self, barcode: &str) -> LookupOutcome {
        let barcode = barcode.trim();

        if let Some(cache) = &self.cache {
            if let Some(record) = cache.get(barcode).await {
                tracing::trace!("Product cache hit: {}", barcode);
                return LookupOutcome::Found(record);
            }
        }

        match self.fetch_product(barcode).await {
            Ok(Some(record)) => {
                if let Some(cache) = &self.cache {
                    cache.insert(barcode.to_string(), record.clone()).await;
                }
                LookupOutcome::Found(record)
            }
            Ok(None) => {
                tracing::info!("Product not found: {}", barcode);
                LookupOutcome::NotFound
            }
            Err(e) => {
                tracing::warn!("Product lookup failed for {}: {}", barcode, e);
                LookupOutcome::ServiceError(e)
            }
        }
    }

    /// Fetch a product straight from the API, bypassing the cache
    pub async fn fetch_product(&self, barcode: &str) -> Result<Option<ProductRecord>, LookupError> {
        validate_barcode(barcode)?;

        let url = format!(
            "{}/api/v0/product/{}.json",
            self.base_url,
            urlencoding::encode(barcode)
        );

        tracing::debug!("Fetching product from: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(LookupError::ApiError(response.status()));
        }

        let body = response.text().await?;
        let envelope: ProductEnvelope = serde_json::from_str(&body)
            .map_err(|e| LookupError::InvalidResponse(format!("Failed to parse product: {}", e)))?;

        if envelope.status == Some(0) {
            return Ok(None);
        }

        // An empty product object carries nothing to show or check
        Ok(envelope
            .product
            .map(|p| p.into_record(barcode))
            .filter(|record| !record.is_empty()))
    }
}

/// Barcodes are short runs of digits, optionally with letters for the
/// non-EAN symbologies. Anything else is rejected before a request is made.
pub fn validate_barcode(barcode: &str) -> Result<(), LookupError> {
    if barcode.is_empty() {
        return Err(LookupError::InvalidBarcode("Barcode cannot be empty".to_string()));
    }

    if barcode.len() > 64 || !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(LookupError::InvalidBarcode(format!(
            "Unsupported barcode value: {:?}",
            barcode
        )));
    }

    Ok(())
}
