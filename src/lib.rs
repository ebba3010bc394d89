//! Backend of the Encontro Pastoral registration site.
//!
//! The site itself is static pages plus two dynamic surfaces: the public
//! sign-up form and the password-protected admin panel. Both talk to this
//! service, which owns the roster and the configured participant limit.
//!
//!
//!
//! # General Infrastructure
//! - Frontend is a static bundle served by the reverse proxy
//! - This backend sits behind the same proxy under `/api`
//! - Redis holds the roster documents, the limit and the admin sessions
//! - Roster is small (the limit defaults to 50), so admin views re-read the
//!   whole collection instead of caching it
//!
//!
//!
//! # Flows
//!
//! ## Sign-up
//! - Form posts name, birth date and optional phone
//! - Backend validates, checks the limit, stamps age/date/status and writes
//!   one document
//! - Minors (under 18) get told to bring the signed guardian authorization;
//!   the reply carries a flag so the frontend shows that dialog
//! - The limit check is read-then-write: two sign-ups racing at the boundary
//!   can both land. Acceptable for a parish event; revisit with a WATCH/MULTI
//!   block if it ever matters
//!
//! ## Admin panel
//! - Login against the configured credentials opens a redis-backed session
//!   (UUID token, 8h TTL), sent back as a bearer token
//! - The table view filters, sorts and pages in the backend; the store is
//!   never queried by criteria
//! - CSV export and the printable list reuse the exact rows the table shows
//!
//!
//!
//! # Notes
//!
//! ## Why no search engine
//! Searching tens of records does not justify an external engine; a linear
//! scan over the roster per request is already faster than the network hop
//! to one would be. All filter semantics live in [`roster`] where they can
//! be unit-tested.
//!
//! ## Stored schema
//! Documents keep the Portuguese field names (`nome`, `dataNascimento`,
//! `dataInscricao`, ...) used since the first version of the site, so old
//! documents and spreadsheets stay compatible.

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post, put},
    Router,
};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod admission;
pub mod auth;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod payloads;
pub mod phone;
pub mod roster;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    capacity_handler, create_handler, dates_handler, delete_handler, export_handler,
    login_handler, logout_handler, phones_handler, register_handler, roster_handler,
    set_capacity_handler, update_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/inscricoes", post(register_handler))
        .route("/admin/sessao", post(login_handler).delete(logout_handler))
        .route(
            "/admin/participantes",
            get(roster_handler).post(create_handler),
        )
        .route("/admin/participantes/export", get(export_handler))
        .route("/admin/participantes/datas", get(dates_handler))
        .route("/admin/participantes/telefones", get(phones_handler))
        .route(
            "/admin/participantes/{id}",
            put(update_handler).delete(delete_handler),
        )
        .route(
            "/admin/limite",
            get(capacity_handler).put(set_capacity_handler),
        )
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
