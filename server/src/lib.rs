//! Portfolio admin backend
//!
//! Projects own zones and floors, zones own quests. Siblings of one parent
//! keep a dense, unique order that the API lets clients rearrange.

pub mod api;
pub mod config;
pub mod domain;
pub mod repository;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain::SiblingKind;
use repository::{DbState, ProjectRepository, SiblingRepository};

/// Repositories shared by every request
pub struct AppState {
    pub db: DbState,
    pub projects: ProjectRepository,
    pub zones: SiblingRepository,
    pub floors: SiblingRepository,
    pub quests: SiblingRepository,
}

impl AppState {
    pub fn new(db: DbState) -> Self {
        Self {
            projects: ProjectRepository::new(db.connection()),
            zones: SiblingRepository::new(db.connection(), SiblingKind::Zone),
            floors: SiblingRepository::new(db.connection(), SiblingKind::Floor),
            quests: SiblingRepository::new(db.connection(), SiblingKind::Quest),
            db,
        }
    }

    pub fn siblings(&self, kind: SiblingKind) -> &SiblingRepository {
        match kind {
            SiblingKind::Zone => &self.zones,
            SiblingKind::Floor => &self.floors,
            SiblingKind::Quest => &self.quests,
        }
    }
}

/// Build the application router with tracing and optional CORS.
pub fn router(state: Arc<AppState>, cors_origins: Option<&str>) -> Router {
    let mut router = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_origins.and_then(build_cors_layer) {
        router = router.layer(cors);
    }
    router
}

fn build_cors_layer(allowed_origins: &str) -> Option<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.trim() == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }
    Some(cors.allow_origin(origins))
}
