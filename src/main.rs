//! estate-api server entry point.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use estate_api::app_state::AppState;
use estate_api::auth::TokenIssuer;
use estate_api::config::AppConfig;
use estate_api::media::MediaStore;
use estate_api::notify::TelegramNotifier;
use estate_api::persistence::{
    FailedUploadRepo, FeedbackRepo, ListingRepo, SellOrderRepo, SessionRepo, UserRepo,
};
use estate_api::service::{AuthService, FeedbackService, ListingService, SellOrderService};
use estate_api::{api, persistence};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting estate-api");

    // Connect infrastructure: database pool, object storage, notifier
    let pool = persistence::connect(&config).await?;
    let media = Arc::new(MediaStore::connect(&config).await);
    let notifier = Arc::new(TelegramNotifier::new(&config));
    let tokens = Arc::new(TokenIssuer::new(
        &config.access_token_secret,
        &config.refresh_token_secret,
    ));

    // Build repositories
    let listings = ListingRepo::new(pool.clone());
    let orders = SellOrderRepo::new(pool.clone());
    let feedbacks = FeedbackRepo::new(pool.clone());
    let users = UserRepo::new(pool.clone());
    let sessions = SessionRepo::new(pool.clone());
    let failed_uploads = FailedUploadRepo::new(pool);

    // Build service layer
    let app_state = AppState {
        listings: Arc::new(ListingService::new(listings.clone(), Arc::clone(&media))),
        orders: Arc::new(SellOrderService::new(
            orders,
            listings.clone(),
            Arc::clone(&media),
            failed_uploads.clone(),
            Arc::clone(&notifier),
        )),
        feedbacks: Arc::new(FeedbackService::new(feedbacks, listings, notifier)),
        auth: Arc::new(AuthService::new(
            users,
            sessions,
            Arc::clone(&tokens),
            media,
        )),
        failed_uploads,
        tokens,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(api::cors_layer(&config.cors_origins))
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
