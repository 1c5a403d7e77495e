//! Zone, floor and quest API routes
//!
//! The three kinds share handlers; the route table picks the kind through a
//! marker type parameter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use sibling_order::ReorderRequest;
use std::sync::Arc;

use super::dto::{CreateSiblingRequest, UpdateSiblingRequest};
use super::error::ApiError;
use crate::domain::{OrderedEntity, SiblingKind};
use crate::repository::{Repository, SiblingHierarchyOperations, SiblingPositioningOperations};
use crate::AppState;

pub trait KindMarker: Send + Sync + 'static {
    const KIND: SiblingKind;
}

pub struct ZoneKind;
pub struct FloorKind;
pub struct QuestKind;

impl KindMarker for ZoneKind {
    const KIND: SiblingKind = SiblingKind::Zone;
}

impl KindMarker for FloorKind {
    const KIND: SiblingKind = SiblingKind::Floor;
}

impl KindMarker for QuestKind {
    const KIND: SiblingKind = SiblingKind::Quest;
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Children of a parent
        .route(
            "/api/projects/{id}/zones",
            get(list_children::<ZoneKind>).post(create_child::<ZoneKind>),
        )
        .route("/api/projects/{id}/zones/order", put(reorder_children::<ZoneKind>))
        .route(
            "/api/projects/{id}/floors",
            get(list_children::<FloorKind>).post(create_child::<FloorKind>),
        )
        .route("/api/projects/{id}/floors/order", put(reorder_children::<FloorKind>))
        .route(
            "/api/zones/{id}/quests",
            get(list_children::<QuestKind>).post(create_child::<QuestKind>),
        )
        .route("/api/zones/{id}/quests/order", put(reorder_children::<QuestKind>))
        // Single entities
        .route(
            "/api/zones/{id}",
            get(get_sibling::<ZoneKind>)
                .patch(update_sibling::<ZoneKind>)
                .delete(delete_sibling::<ZoneKind>),
        )
        .route(
            "/api/floors/{id}",
            get(get_sibling::<FloorKind>)
                .patch(update_sibling::<FloorKind>)
                .delete(delete_sibling::<FloorKind>),
        )
        .route(
            "/api/quests/{id}",
            get(get_sibling::<QuestKind>)
                .patch(update_sibling::<QuestKind>)
                .delete(delete_sibling::<QuestKind>),
        )
}

async fn list_children<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(parent_id): Path<u32>,
) -> Result<Json<Vec<OrderedEntity>>, ApiError> {
    let children = state.siblings(K::KIND).children_of(parent_id).await?;
    Ok(Json(children))
}

async fn create_child<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(parent_id): Path<u32>,
    Json(body): Json<CreateSiblingRequest>,
) -> Result<(StatusCode, Json<OrderedEntity>), ApiError> {
    let mut entity = OrderedEntity::new(K::KIND, parent_id, body.title);
    entity.description = body.description;
    if let Some(order) = body.order {
        if order < 1 {
            return Err(ApiError::BadRequest(format!("order {} is not a positive integer", order)));
        }
        entity.order = order;
    }

    let created = state.siblings(K::KIND).create(&entity).await?;
    tracing::info!(
        kind = K::KIND.as_str(),
        id = created.id,
        parent_id,
        order = created.order,
        "sibling created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn reorder_children<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(parent_id): Path<u32>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<OrderedEntity>>, ApiError> {
    if request.parent_id != parent_id {
        return Err(ApiError::BadRequest(format!(
            "request is for {} {}, path names {}",
            K::KIND.parent_name(),
            request.parent_id,
            parent_id
        )));
    }
    let siblings = state.siblings(K::KIND).apply_reorder(&request).await?;
    Ok(Json(siblings))
}

async fn get_sibling<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<OrderedEntity>, ApiError> {
    let entity = state.siblings(K::KIND).require(id, K::KIND.as_str()).await?;
    Ok(Json(entity))
}

async fn update_sibling<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
    Json(body): Json<UpdateSiblingRequest>,
) -> Result<Json<OrderedEntity>, ApiError> {
    let mut entity = state.siblings(K::KIND).require(id, K::KIND.as_str()).await?;

    if let Some(title) = body.title {
        entity.title = title;
    }
    if body.description.is_some() {
        entity.description = body.description;
    }
    if let Some(order) = body.order {
        if order < 1 {
            return Err(ApiError::BadRequest(format!("order {} is not a positive integer", order)));
        }
        entity.order = order;
    }

    Ok(Json(state.siblings(K::KIND).update(&entity).await?))
}

async fn delete_sibling<K: KindMarker>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.siblings(K::KIND).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
