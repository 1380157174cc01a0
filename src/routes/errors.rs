use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::models::{ErrorResponse, ProductRecord};
use crate::services::{DecodeError, LookupError, LookupOutcome, ProfileStoreError, TokenError};

/// Every failure a handler can report, mapped onto a JSON error body
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("The upload is not a supported image")]
    InvalidImage,

    #[error("The upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Could not read a barcode from the image")]
    BarcodeUnreadable,

    #[error("Product {0} was not found in the product database")]
    ProductNotFound(String),

    #[error("The product database is unavailable, try again later")]
    ServiceUnavailable,

    #[error("A user with this {0} already exists")]
    DuplicateUser(&'static str),

    #[error("User not found. Please register first.")]
    UserNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::InvalidQuery(_) => "invalid_query",
            ApiError::InvalidImage => "invalid_image",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::BarcodeUnreadable => "barcode_unreadable",
            ApiError::ProductNotFound(_) => "product_not_found",
            ApiError::ServiceUnavailable => "service_unavailable",
            ApiError::DuplicateUser(_) => "duplicate_user",
            ApiError::UserNotFound => "user_not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidJson(_) | ApiError::InvalidQuery(_) | ApiError::InvalidImage => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BarcodeUnreadable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ProductNotFound(_) | ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DuplicateUser(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal details stay in the logs
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}

impl From<ProfileStoreError> for ApiError {
    fn from(err: ProfileStoreError) -> Self {
        match err {
            ProfileStoreError::NotFound(_) => ApiError::UserNotFound,
            ProfileStoreError::Duplicate(field) => ApiError::DuplicateUser(field),
            ProfileStoreError::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidImage(e) => {
                tracing::info!("Rejected upload: {}", e);
                ApiError::InvalidImage
            }
            DecodeError::DecoderError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// Turn a lookup outcome into a product or a user-facing error
pub fn product_or_error(barcode: &str, outcome: LookupOutcome) -> Result<ProductRecord, ApiError> {
    match outcome {
        LookupOutcome::Found(product) => Ok(product),
        LookupOutcome::NotFound => Err(ApiError::ProductNotFound(barcode.to_string())),
        LookupOutcome::ServiceError(LookupError::InvalidBarcode(msg)) => Err(ApiError::Validation(msg)),
        LookupOutcome::ServiceError(_) => Err(ApiError::ServiceUnavailable),
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidJson(err.to_string()).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidQuery(err.to_string()).into()
}
