use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::models::{SafetyCheckRequest, SafetyReport, ScanResponse};
use crate::routes::errors::product_or_error;
use crate::routes::{ApiError, AppState, CurrentUser};

/// Configure scan, product and safety routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/scan", web::post().to(scan_image))
        .route("/products/{barcode}", web::get().to(get_product))
        .route("/products/{barcode}/safety", web::get().to(product_safety))
        .route("/safety/check", web::post().to(check_ingredients));
}

/// Scan an uploaded image and check the product against the caller's profile
///
/// POST /api/v1/scan
///
/// The request body is the raw image (JPEG, PNG, ...), at most
/// `scan.max_image_bytes` long.
async fn scan_image(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let body = payload
        .to_bytes_limited(state.max_image_bytes)
        .await
        .map_err(|_| ApiError::PayloadTooLarge(state.max_image_bytes))?
        .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;

    if body.is_empty() {
        return Err(ApiError::Validation("Request body must contain an image".to_string()));
    }

    let profile = state.profile_for(&user).await?;

    tracing::info!(user_id = user.user_id, bytes = body.len(), "Processing barcode image");

    let decoder = state.decoder.clone();
    let decoded = web::block(move || decoder.decode(&body))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let barcode = decoded.ok_or(ApiError::BarcodeUnreadable)?;

    let outcome = state.products.lookup(&barcode.value).await;
    let product = product_or_error(&barcode.value, outcome)?;
    let safety = state.matcher.check(&product, &profile);

    Ok(HttpResponse::Ok().json(ScanResponse {
        barcode: Some(barcode),
        product,
        safety: safety.into(),
    }))
}

/// Product details for a barcode
///
/// GET /api/v1/products/{barcode}
async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let barcode = path.into_inner();
    let outcome = state.products.lookup(&barcode).await;
    let product = product_or_error(&barcode, outcome)?;

    Ok(HttpResponse::Ok().json(product))
}

/// Look up a typed-in barcode and check it against the caller's profile
///
/// GET /api/v1/products/{barcode}/safety
async fn product_safety(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let barcode = path.into_inner();
    let profile = state.profile_for(&user).await?;

    let outcome = state.products.lookup(&barcode).await;
    let product = product_or_error(&barcode, outcome)?;
    let safety = state.matcher.check(&product, &profile);

    Ok(HttpResponse::Ok().json(ScanResponse {
        barcode: None,
        product,
        safety: safety.into(),
    }))
}

/// Check free-form ingredient text against the caller's profile
///
/// POST /api/v1/safety/check
///
/// Request body:
/// ```json
/// { "ingredients": "Milk, Sugar, Cocoa" }
/// ```
async fn check_ingredients(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<SafetyCheckRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let profile = state.profile_for(&user).await?;
    let verdict = state.matcher.evaluate(
        req.ingredients.as_deref(),
        profile.allergies.as_slice(),
        profile.health_conditions.as_slice(),
    );

    Ok(HttpResponse::Ok().json(SafetyReport::from(verdict)))
}
