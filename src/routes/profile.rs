use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::{SUGGESTED_ALLERGIES, SUGGESTED_HEALTH_CONDITIONS};
use crate::models::{
    HealthResponse, LoginRequest, LoginResponse, NewProfile, ProfileUpdate, RegisterRequest,
    SuggestionsResponse, UpdateProfileRequest,
};
use crate::routes::{ApiError, AppState, CurrentUser};

/// Configure health, suggestion and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/suggestions", web::get().to(suggestions))
        .route("/users/register", web::post().to(register))
        .route("/users/login", web::post().to(login))
        .route("/users/me", web::get().to(get_profile))
        .route("/users/me", web::put().to(update_profile))
        .route("/users/me", web::delete().to(delete_profile));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Suggested allergy and condition terms
///
/// GET /api/v1/suggestions
async fn suggestions() -> HttpResponse {
    HttpResponse::Ok().json(SuggestionsResponse {
        allergies: SUGGESTED_ALLERGIES.iter().map(|s| s.to_string()).collect(),
        health_conditions: SUGGESTED_HEALTH_CONDITIONS.iter().map(|s| s.to_string()).collect(),
    })
}

/// Register a new profile
///
/// POST /api/v1/users/register
///
/// Request body:
/// ```json
/// {
///   "username": "string",
///   "name": "string",
///   "mobile": "string",
///   "age": 30,
///   "allergies": ["Peanuts"],
///   "healthConditions": ["Diabetes"]
/// }
/// ```
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for register request: field_errors={:?}", errors);
        return Err(errors.into());
    }

    let req = req.into_inner();
    let profile = state
        .store
        .create(NewProfile {
            username: req.username,
            name: req.name,
            mobile: req.mobile,
            age: req.age,
            allergies: req.allergies,
            health_conditions: req.health_conditions,
        })
        .await?;

    Ok(HttpResponse::Created().json(profile))
}

/// Log in with a registered mobile number
///
/// POST /api/v1/users/login
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let profile = state
        .store
        .find_by_mobile(&req.mobile)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let (token, expires_at) = state
        .tokens
        .issue(profile.id, &profile.mobile)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = profile.id, "User logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        expires_at,
        profile,
    }))
}

/// Current user's profile
///
/// GET /api/v1/users/me
async fn get_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.profile_for(&user).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Edit the current user's profile
///
/// Fields left out keep their stored values. A list that is sent replaces
/// the stored list.
///
/// PUT /api/v1/users/me
async fn update_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let req = req.into_inner();
    let profile = state
        .store
        .update(
            user.user_id,
            ProfileUpdate {
                name: req.name,
                age: req.age,
                allergies: req.allergies,
                health_conditions: req.health_conditions,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Delete the current user's account
///
/// DELETE /api/v1/users/me
async fn delete_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, ApiError> {
    state.store.delete(user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
