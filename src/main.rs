use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use safescan::config::{LoggingSettings, Settings};
use safescan::core::SafetyMatcher;
use safescan::routes::{self, AppState};
use safescan::services::{ProductClient, ProfileStore, RxingDecoder, TokenService};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            return Err(startup_error("Failed to load configuration", e));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting SafeScan service...");

    if settings.auth.jwt_secret == "change-me" {
        warn!("Using the default JWT secret; set SAFESCAN_JWT_SECRET in production");
    }

    let store = Arc::new(
        ProfileStore::connect(&settings.database)
            .await
            .map_err(|e| startup_error("Failed to open profile store", e))?,
    );

    info!("Profile store initialized");

    let products = Arc::new(
        ProductClient::new(&settings.product_api, &settings.cache)
            .map_err(|e| startup_error("Failed to create product client", e))?,
    );

    info!(
        "Product client initialized ({}; cache TTL: {}s)",
        settings.product_api.base_url, settings.cache.ttl_secs
    );

    let matcher = SafetyMatcher::new(settings.matching.mode);

    info!("Matcher initialized with mode: {:?}", matcher.mode());

    // Build application state
    let app_state = AppState {
        store,
        products,
        decoder: Arc::new(RxingDecoder),
        tokens: Arc::new(TokenService::new(&settings.auth)),
        matcher,
        max_image_bytes: settings.scan.max_image_bytes,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
