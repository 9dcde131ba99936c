//! HTTP API for Mirror, Mirror

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::SessionManager;
use crate::selfie::SelfieStore;
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub selfies: SelfieStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, selfies: SelfieStore, max_upload_bytes: usize) -> Self {
        Self {
            sessions,
            selfies,
            max_upload_bytes,
        }
    }
}

/// CORS for a single browser origin, with credentials.
///
/// Other origins get no `access-control-allow-origin` header at all.
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
}
