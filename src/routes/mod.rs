// Route exports
pub mod errors;
pub mod profile;
pub mod scan;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

use crate::core::SafetyMatcher;
use crate::models::UserProfile;
use crate::services::{BarcodeDecoder, ProductClient, ProfileStore, Session, TokenService};

pub use errors::{handle_json_payload_error, handle_query_payload_error, ApiError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProfileStore>,
    pub products: Arc<ProductClient>,
    pub decoder: Arc<dyn BarcodeDecoder>,
    pub tokens: Arc<TokenService>,
    pub matcher: SafetyMatcher,
    /// Largest accepted scan upload
    pub max_image_bytes: usize,
}

impl AppState {
    /// Load the stored profile for the request's user
    pub async fn profile_for(&self, user: &CurrentUser) -> Result<UserProfile, ApiError> {
        Ok(self.store.get(user.user_id).await?)
    }
}

/// The authenticated user, taken from the `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

impl std::ops::Deref for CurrentUser {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<CurrentUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not configured".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    Ok(CurrentUser(state.tokens.verify(token)?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .service(
            web::scope("/api/v1")
                .configure(profile::configure)
                .configure(scan::configure),
        );
}
