//! Sibling Repository - Core CRUD Operations
//!
//! One repository per sibling kind, all sharing the same table shape.
//! Specialized operations are in separate modules:
//! - sibling_hierarchy: children of a parent
//! - sibling_positioning: order assignment, reorder, compaction
//! - sibling_store: the reorder protocol's store port

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use sibling_order::{ORDER_LIMIT, TEMP_ORDER_BASE};
use tokio::sync::Mutex;

use super::super::db::{map_db_error, now_millis};
use super::super::traits::Repository;
use super::sibling_positioning::compact_in;
use crate::domain::{DomainError, DomainResult, OrderedEntity, SiblingKind};

/// SQLite implementation of the repository for one sibling kind
pub struct SiblingRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
    pub(super) kind: SiblingKind,
}

impl SiblingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, kind: SiblingKind) -> Self {
        Self { conn, kind }
    }

    pub fn kind(&self) -> SiblingKind {
        self.kind
    }
}

#[async_trait]
impl Repository<OrderedEntity> for SiblingRepository {
    async fn create(&self, entity: &OrderedEntity) -> DomainResult<OrderedEntity> {
        if entity.kind != self.kind {
            return Err(DomainError::InvalidInput(format!(
                "cannot store a {} as a {}",
                entity.kind.as_str(),
                self.kind.as_str()
            )));
        }
        let entity = entity.clone().validated()?;
        if entity.order >= TEMP_ORDER_BASE {
            return Err(DomainError::InvalidInput(format!(
                "order must stay below {}",
                TEMP_ORDER_BASE
            )));
        }

        let conn = self.conn.lock().await;
        ensure_parent(&conn, self.kind, entity.parent_id)?;

        // Calculate order in same connection
        let order = if entity.order == 0 {
            next_order_in(&conn, self.kind, entity.parent_id)?
        } else {
            entity.order
        };
        let now = now_millis();

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, title, description, sort_order, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                self.kind.table(),
                self.kind.parent_column()
            ),
            params![entity.parent_id, entity.title, entity.description, order, now],
        )
        .map_err(|e| order_error(e, self.kind, entity.parent_id, order))?;

        let id = conn.last_insert_rowid() as u32;
        tracing::debug!(kind = self.kind.as_str(), id, order, "sibling inserted");

        Ok(OrderedEntity {
            id,
            order,
            created_at: Some(now),
            updated_at: Some(now),
            ..entity
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<OrderedEntity>> {
        let conn = self.conn.lock().await;
        find_in(&conn, self.kind, id)
    }

    async fn list(&self) -> DomainResult<Vec<OrderedEntity>> {
        let conn = self.conn.lock().await;
        let kind = self.kind;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM {} ORDER BY {}, sort_order",
                select_columns(kind),
                kind.table(),
                kind.parent_column()
            ))
            .map_err(map_db_error)?;
        let entities = stmt
            .query_map([], |row| row_to_entity(kind, row))
            .map_err(map_db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_error)?;
        Ok(entities)
    }

    async fn update(&self, entity: &OrderedEntity) -> DomainResult<OrderedEntity> {
        let entity = entity.clone().validated()?;
        check_order(entity.order)?;

        let conn = self.conn.lock().await;
        let existing = find_in(&conn, self.kind, entity.id)?.ok_or_else(|| {
            DomainError::NotFound(format!("{} {} not found", self.kind.as_str(), entity.id))
        })?;
        let now = now_millis();

        conn.execute(
            &format!(
                "UPDATE {} SET title = ?1, description = ?2, sort_order = ?3, updated_at = ?4 WHERE id = ?5",
                self.kind.table()
            ),
            params![entity.title, entity.description, entity.order, now, entity.id],
        )
        .map_err(|e| order_error(e, self.kind, existing.parent_id, entity.order))?;

        // Parent and creation time are not movable through update
        Ok(OrderedEntity {
            parent_id: existing.parent_id,
            created_at: existing.created_at,
            updated_at: Some(now),
            ..entity
        })
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(map_db_error)?;

        let existing = find_in(&tx, self.kind, id)?.ok_or_else(|| {
            DomainError::NotFound(format!("{} {} not found", self.kind.as_str(), id))
        })?;
        tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.kind.table()),
            params![id],
        )
        .map_err(map_db_error)?;

        // Close the gap left behind
        let writes = compact_in(&tx, self.kind, existing.parent_id)?;
        tx.commit().map_err(map_db_error)?;

        tracing::info!(kind = self.kind.as_str(), id, writes, "sibling deleted");
        Ok(())
    }
}

pub(super) fn select_columns(kind: SiblingKind) -> String {
    format!(
        "id, {}, title, description, sort_order, created_at, updated_at",
        kind.parent_column()
    )
}

/// Convert a database row to OrderedEntity
pub(super) fn row_to_entity(kind: SiblingKind, row: &Row<'_>) -> rusqlite::Result<OrderedEntity> {
    Ok(OrderedEntity {
        id: row.get(0)?,
        kind,
        parent_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        order: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(super) fn find_in(conn: &Connection, kind: SiblingKind, id: u32) -> DomainResult<Option<OrderedEntity>> {
    conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", select_columns(kind), kind.table()),
        params![id],
        |row| row_to_entity(kind, row),
    )
    .optional()
    .map_err(map_db_error)
}

/// Children of `parent_id`, sorted by order
pub(super) fn query_siblings(conn: &Connection, kind: SiblingKind, parent_id: u32) -> DomainResult<Vec<OrderedEntity>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY sort_order",
            select_columns(kind),
            kind.table(),
            kind.parent_column()
        ))
        .map_err(map_db_error)?;
    let siblings = stmt
        .query_map(params![parent_id], |row| row_to_entity(kind, row))
        .map_err(map_db_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_db_error)?;
    Ok(siblings)
}

pub(super) fn parent_exists_in(conn: &Connection, kind: SiblingKind, parent_id: u32) -> DomainResult<bool> {
    let found: Option<u32> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE id = ?1", kind.parent_table()),
            params![parent_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_db_error)?;
    Ok(found.is_some())
}

pub(super) fn ensure_parent(conn: &Connection, kind: SiblingKind, parent_id: u32) -> DomainResult<()> {
    if parent_exists_in(conn, kind, parent_id)? {
        Ok(())
    } else {
        Err(DomainError::NotFound(format!(
            "{} {} not found",
            kind.parent_name(),
            parent_id
        )))
    }
}

/// Orders written one at a time must be positive and below `ORDER_LIMIT`.
pub(super) fn check_order(order: i32) -> DomainResult<()> {
    if order < 1 {
        return Err(DomainError::InvalidInput(format!(
            "order {} is not a positive integer",
            order
        )));
    }
    if order >= ORDER_LIMIT {
        return Err(DomainError::InvalidInput(format!(
            "order {} must stay below {}",
            order, ORDER_LIMIT
        )));
    }
    Ok(())
}

/// One past the highest legitimate order; parked values are ignored.
pub(super) fn next_order_in(conn: &Connection, kind: SiblingKind, parent_id: u32) -> DomainResult<i32> {
    let next: i64 = conn
        .query_row(
            &format!(
                "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {} WHERE {} = ?1 AND sort_order < ?2",
                kind.table(),
                kind.parent_column()
            ),
            params![parent_id, TEMP_ORDER_BASE],
            |row| row.get(0),
        )
        .map_err(map_db_error)?;
    if next >= TEMP_ORDER_BASE as i64 {
        return Err(DomainError::InvalidInput(format!(
            "{} {} has no order left below {}",
            kind.parent_name(),
            parent_id,
            TEMP_ORDER_BASE
        )));
    }
    Ok(next as i32)
}

/// Map a write failure, naming the order slot on a uniqueness conflict.
pub(super) fn order_error(e: rusqlite::Error, kind: SiblingKind, parent_id: u32, order: i32) -> DomainError {
    match map_db_error(e) {
        DomainError::Conflict(_) => DomainError::Conflict(format!(
            "order {} is already taken under {} {}",
            order,
            kind.parent_name(),
            parent_id
        )),
        other => other,
    }
}
