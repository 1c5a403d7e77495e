//! HTTP API
//!
//! JSON routes over the repositories. Domain errors map onto status codes in
//! [`ApiError`].

mod dto;
mod error;
mod project_routes;
mod sibling_routes;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub use dto::{CreateProjectRequest, CreateSiblingRequest, UpdateProjectRequest, UpdateSiblingRequest};
pub use error::ApiError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .merge(project_routes::routes())
        .merge(sibling_routes::routes())
}

async fn health() -> &'static str {
    "OK"
}
