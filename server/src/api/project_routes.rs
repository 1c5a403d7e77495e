//! Project API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::dto::{CreateProjectRequest, UpdateProjectRequest};
use super::error::ApiError;
use crate::domain::Project;
use crate::repository::Repository;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/projects/by-slug/{slug}", get(get_project_by_slug))
}

async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.projects.list().await?))
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let mut project = Project::new(0, body.title);
    project.slug = body.slug;
    project.description = body.description;

    let created = state.projects.create(&project).await?;
    tracing::info!(project_id = created.id, "project created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.projects.require(id, "project").await?))
}

async fn get_project_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = state
        .projects
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project with slug {} not found", slug)))?;
    Ok(Json(project))
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let mut project = state.projects.require(id, "project").await?;

    if let Some(title) = body.title {
        project.title = title;
    }
    if body.slug.is_some() {
        project.slug = body.slug;
    }
    if body.description.is_some() {
        project.description = body.description;
    }

    Ok(Json(state.projects.update(&project).await?))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.projects.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
