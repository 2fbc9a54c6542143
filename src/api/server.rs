//! HTTP API server

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_role, Authenticator, RoleGuard};
use crate::config::Config;
use crate::error::Result;
use crate::payment::{SharedGateway, StripeGateway};
use crate::store::{self, SharedStore};

use super::{bookings, payments, routes, rooms, stats, users};

/// Application state shared across handlers
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub store: SharedStore,
    pub payments: SharedGateway,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(auth: Authenticator, store: SharedStore, payments: SharedGateway) -> SharedState {
        Arc::new(Self {
            auth: Arc::new(auth),
            store,
            payments,
        })
    }
}

/// Run the HTTP API server until Ctrl-C
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let store = store::open(&config.database)?;
    store.ping().await?;
    tracing::info!("Document store is reachable");

    if config.payment.secret_key.is_empty() {
        tracing::warn!("No payment secret key configured; payment intents will fail");
    }
    let payments: SharedGateway = Arc::new(StripeGateway::new(
        reqwest::Client::new(),
        &config.payment,
    ));

    let state = AppState::new(Authenticator::from_config(&config), store.clone(), payments);
    let app = create_router(state, &config.server.allowed_origins);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        "GrandStay listening on {} ({})",
        addr,
        config.server.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, closing document store");
    store.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Create the router with all routes
pub fn create_router(state: SharedState, allowed_origins: &[String]) -> Router {
    let auth = from_fn_with_state(state.auth.clone(), require_auth);
    let admin = from_fn_with_state(RoleGuard::admin(state.store.clone()), require_role);
    let host = from_fn_with_state(RoleGuard::host(state.store.clone()), require_role);

    let public = Router::new()
        .route("/", get(routes::root))
        .route("/jwt", post(routes::issue_session))
        .route("/logout", get(routes::logout))
        .route("/users/{email}", put(users::save_user))
        .route("/user/{email}", get(users::get_user))
        .route("/rooms", get(rooms::list_rooms))
        .route("/room/{id}", get(rooms::get_room))
        .route("/rooms/status/{id}", patch(rooms::set_room_status));

    let authenticated = Router::new()
        .route("/users/update/{email}", put(users::update_user))
        .route("/rooms", post(rooms::create_room))
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::guest_bookings),
        )
        .route("/bookings/host", get(bookings::host_bookings))
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route_layer(auth.clone());

    // Role guards sit inside the auth guard so the claims are attached first
    let admin_only = Router::new()
        .route("/users", get(users::list_users))
        .route("/admin-stat", get(stats::admin_stat))
        .route_layer(admin)
        .route_layer(auth.clone());

    let host_only = Router::new()
        .route("/rooms/{email}", get(rooms::host_rooms))
        .route_layer(host)
        .route_layer(auth);

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin_only)
        .merge(host_only)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
