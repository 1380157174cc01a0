// Integration tests for SafeScan

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use safescan::config::{AuthSettings, CacheSettings, ProductApiSettings};
use safescan::core::{MatchMode, SafetyMatcher};
use safescan::models::DecodedBarcode;
use safescan::routes::{self, AppState};
use safescan::services::{
    BarcodeDecoder, DecodeError, ProductClient, ProfileStore, RxingDecoder, TokenService,
};
use serde_json::{json, Value};
use std::sync::Arc;

const NUTELLA: &str = "3017620422003";

/// Decoder that returns a fixed barcode regardless of the image
struct StubDecoder(Option<&'static str>);

impl BarcodeDecoder for StubDecoder {
    fn decode(&self, _image: &[u8]) -> Result<Option<DecodedBarcode>, DecodeError> {
        Ok(self.0.map(|value| DecodedBarcode {
            value: value.to_string(),
            format: "EAN_13".to_string(),
        }))
    }
}

async fn create_state(product_api: &str, decoded: Option<&'static str>) -> AppState {
    create_state_with(product_api, Arc::new(StubDecoder(decoded)), 1024 * 1024).await
}

async fn create_state_with(
    product_api: &str,
    decoder: Arc<dyn BarcodeDecoder>,
    max_image_bytes: usize,
) -> AppState {
    let store = ProfileStore::in_memory().await.expect("in-memory store");
    let products = ProductClient::new(
        &ProductApiSettings {
            base_url: product_api.to_string(),
            timeout_secs: 5,
            user_agent: "safescan-tests".to_string(),
        },
        &CacheSettings { ttl_secs: 0, max_entries: 10 },
    )
    .expect("product client");

    AppState {
        store: Arc::new(store),
        products: Arc::new(products),
        decoder,
        tokens: Arc::new(TokenService::new(&AuthSettings {
            jwt_secret: "integration-secret".to_string(),
            token_ttl_hours: 1,
        })),
        matcher: SafetyMatcher::new(MatchMode::Substring),
        max_image_bytes,
    }
}

fn register_body(mobile: &str, username: &str) -> Value {
    json!({
        "username": username,
        "name": "Alice",
        "mobile": mobile,
        "age": 34,
        "allergies": ["Milk", "Peanuts"],
        "healthConditions": ["Diabetes"]
    })
}

async fn mock_product(server: &mut mockito::ServerGuard, barcode: &str, body: Value) -> mockito::Mock {
    server
        .mock("GET", format!("/api/v0/product/{}.json", barcode).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $mobile:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({ "mobile": $mobile }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        format!("Bearer {}", body["token"].as_str().unwrap())
    }};
}

#[actix_web::test]
async fn test_register_login_and_scan_unsafe_product() {
    let mut server = mockito::Server::new_async().await;
    let _product = mock_product(
        &mut server,
        NUTELLA,
        json!({
            "status": 1,
            "product": {
                "product_name": "Nutella",
                "brands": "Ferrero",
                "categories": "Spreads",
                "ingredients_text": "Sugar, palm oil, hazelnuts, skimmed MILK powder, cocoa"
            }
        }),
    )
    .await;

    let app = init_app!(create_state(&server.url(), Some(NUTELLA)).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550001", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let token = login!(app, "5550001");

    let req = test::TestRequest::post()
        .uri("/api/v1/scan")
        .insert_header((header::AUTHORIZATION, token))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0u8; 16])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["barcode"]["value"], NUTELLA);
    assert_eq!(body["product"]["name"], "Nutella");
    assert_eq!(body["safety"]["verdict"], "unsafe");
    assert_eq!(body["safety"]["matchedAllergies"], json!(["Milk"]));
    assert_eq!(body["safety"]["matchedConditions"], json!([]));
}

#[actix_web::test]
async fn test_missing_ingredients_is_unknown() {
    let mut server = mockito::Server::new_async().await;
    let _product = mock_product(
        &mut server,
        "4000000000000",
        json!({ "status": 1, "product": { "product_name": "Mystery bar", "ingredients_text": "" } }),
    )
    .await;

    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550002", "bob"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550002");

    let req = test::TestRequest::get()
        .uri("/api/v1/products/4000000000000/safety")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["safety"]["verdict"], "unknown");
    assert_eq!(body["safety"]["message"], "Cannot verify safety: ingredient list unavailable");
}

#[actix_web::test]
async fn test_unreadable_barcode() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550003", "carol"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550003");

    let req = test::TestRequest::post()
        .uri("/api/v1/scan")
        .insert_header((header::AUTHORIZATION, token))
        .set_payload(vec![1u8; 16])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "barcode_unreadable");
}

#[actix_web::test]
async fn test_product_not_found_and_service_unavailable_are_distinct() {
    let mut server = mockito::Server::new_async().await;
    let _not_found = mock_product(&mut server, "1111", json!({ "status": 0, "status_verbose": "product not found" })).await;
    let _unavailable = server
        .mock("GET", "/api/v0/product/2222.json")
        .with_status(503)
        .create_async()
        .await;

    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::get().uri("/api/v1/products/1111").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "product_not_found");

    let req = test::TestRequest::get().uri("/api/v1/products/2222").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "service_unavailable");
}

#[actix_web::test]
async fn test_duplicate_registration_rejected() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550004", "dave"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550004", "dave2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "duplicate_user");
}

#[actix_web::test]
async fn test_login_unknown_mobile() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "mobile": "000000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profile_update_replaces_and_delete_removes() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550005", "erin"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550005");

    let req = test::TestRequest::put()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "allergies": ["Soy"], "healthConditions": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["allergies"], json!(["Soy"]));
    assert_eq!(body["healthConditions"], json!([]));

    let req = test::TestRequest::post()
        .uri("/api/v1/safety/check")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "ingredients": "Water, soy lecithin" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["verdict"], "unsafe");
    assert_eq!(body["matchedAllergies"], json!(["Soy"]));

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_requires_session_token() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_invalid_json_is_bad_request() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_health_and_suggestions() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/api/v1/suggestions").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body["allergies"].as_array().unwrap().contains(&json!("Peanuts")));
    assert!(body["healthConditions"].as_array().unwrap().contains(&json!("Diabetes")));
}

#[actix_web::test]
async fn test_name_only_update_keeps_term_lists() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550006", "frank"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550006");

    let req = test::TestRequest::put()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, token.clone()))
        .set_json(json!({ "name": "Alice B" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Alice B");
    assert_eq!(body["allergies"], json!(["Milk", "Peanuts"]));
    assert_eq!(body["healthConditions"], json!(["Diabetes"]));

    let req = test::TestRequest::post()
        .uri("/api/v1/safety/check")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "ingredients": "roasted Peanuts, salt" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["verdict"], "unsafe");
    assert_eq!(body["matchedAllergies"], json!(["Peanuts"]));
}

#[actix_web::test]
async fn test_reformatted_mobile_is_duplicate_and_logs_in() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550007", "grace"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("555-0007", "grace2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "duplicate_user");

    let token = login!(app, "555 0007");
    assert!(token.starts_with("Bearer "));
}

#[actix_web::test]
async fn test_oversized_upload_is_json_error() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state_with(&server.url(), Arc::new(StubDecoder(Some(NUTELLA))), 64).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550008", "heidi"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550008");

    let req = test::TestRequest::post()
        .uri("/api/v1/scan")
        .insert_header((header::AUTHORIZATION, token))
        .set_payload(vec![0u8; 128])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "payload_too_large");
    assert_eq!(body["status_code"], 413);
}

#[actix_web::test]
async fn test_non_image_upload_is_invalid_image() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state_with(&server.url(), Arc::new(RxingDecoder), 1024 * 1024).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(register_body("5550009", "ivan"))
        .to_request();
    test::call_service(&app, req).await;
    let token = login!(app, "5550009");

    let req = test::TestRequest::post()
        .uri("/api/v1/scan")
        .insert_header((header::AUTHORIZATION, token))
        .set_payload("definitely not an image")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_image");
}

#[actix_web::test]
async fn test_malformed_barcode_is_validation_error() {
    let server = mockito::Server::new_async().await;
    let app = init_app!(create_state(&server.url(), None).await);

    let req = test::TestRequest::get().uri("/api/v1/products/bad!code").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
}
