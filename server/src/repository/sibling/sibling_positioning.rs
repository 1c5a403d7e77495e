//! Sibling Repository - Positioning Operations
//!
//! Order assignment, explicit reorder requests and gap compaction. Every
//! multi-row rewrite runs inside one transaction and issues the staged pass
//! before the commit pass, so the unique index is never tripped midway.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use sibling_order::{Phase, ReorderPlan, ReorderRequest};

use super::super::db::{map_db_error, now_millis};
use super::sibling_repo::{
    check_order, ensure_parent, next_order_in, order_error, query_siblings, SiblingRepository,
};
use crate::domain::{DomainError, DomainResult, OrderedEntity, SiblingKind};

/// Positioning operations for ordered siblings
#[async_trait]
pub trait SiblingPositioningOperations: Send + Sync {
    /// Order a newly appended child of `parent_id` would receive
    async fn next_order(&self, parent_id: u32) -> DomainResult<i32>;

    /// Write a single order value
    async fn set_order(&self, id: u32, order: i32) -> DomainResult<()>;

    /// Apply an explicit reorder request atomically
    async fn apply_reorder(&self, request: &ReorderRequest) -> DomainResult<Vec<OrderedEntity>>;

    /// Renumber the children of `parent_id` to `1..=N`, returning the write count
    async fn reindex_siblings(&self, parent_id: u32) -> DomainResult<usize>;
}

#[async_trait]
impl SiblingPositioningOperations for SiblingRepository {
    async fn next_order(&self, parent_id: u32) -> DomainResult<i32> {
        let conn = self.conn.lock().await;
        ensure_parent(&conn, self.kind, parent_id)?;
        next_order_in(&conn, self.kind, parent_id)
    }

    async fn set_order(&self, id: u32, order: i32) -> DomainResult<()> {
        check_order(order)?;
        let conn = self.conn.lock().await;
        write_order(&conn, self.kind, id, order)
    }

    async fn apply_reorder(&self, request: &ReorderRequest) -> DomainResult<Vec<OrderedEntity>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(map_db_error)?;

        ensure_parent(&tx, self.kind, request.parent_id)?;
        let siblings = query_siblings(&tx, self.kind, request.parent_id)?;
        let plan = ReorderPlan::from_request(request, &siblings)?;
        let writes = write_plan(&tx, self.kind, &plan)?;
        tx.commit().map_err(map_db_error)?;

        tracing::info!(
            kind = self.kind.as_str(),
            parent_id = request.parent_id,
            writes,
            "reorder applied"
        );
        Ok(plan.apply(&siblings))
    }

    async fn reindex_siblings(&self, parent_id: u32) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(map_db_error)?;
        ensure_parent(&tx, self.kind, parent_id)?;
        let writes = compact_in(&tx, self.kind, parent_id)?;
        tx.commit().map_err(map_db_error)?;
        Ok(writes)
    }
}

/// Give the children of `parent_id` dense orders, keeping their relative order.
pub(super) fn compact_in(conn: &Connection, kind: SiblingKind, parent_id: u32) -> DomainResult<usize> {
    let siblings = query_siblings(conn, kind, parent_id)?;
    let plan = ReorderPlan::for_arrangement(&siblings)?;
    write_plan(conn, kind, &plan)
}

fn write_plan(conn: &Connection, kind: SiblingKind, plan: &ReorderPlan) -> DomainResult<usize> {
    let mut written = 0;
    for phase in [Phase::Stage, Phase::Commit] {
        for (id, order) in plan.writes(phase) {
            write_order(conn, kind, id, order)?;
            written += 1;
        }
    }
    Ok(written)
}

fn write_order(conn: &Connection, kind: SiblingKind, id: u32, order: i32) -> DomainResult<()> {
    let changed = conn
        .execute(
            &format!(
                "UPDATE {} SET sort_order = ?1, updated_at = ?2 WHERE id = ?3",
                kind.table()
            ),
            params![order, now_millis(), id],
        )
        .map_err(|e| {
            let parent_id = parent_of(conn, kind, id).unwrap_or_default();
            order_error(e, kind, parent_id, order)
        })?;
    if changed == 0 {
        return Err(DomainError::NotFound(format!("{} {} not found", kind.as_str(), id)));
    }
    Ok(())
}

fn parent_of(conn: &Connection, kind: SiblingKind, id: u32) -> Option<u32> {
    conn.query_row(
        &format!("SELECT {} FROM {} WHERE id = ?1", kind.parent_column(), kind.table()),
        params![id],
        |row| row.get(0),
    )
    .ok()
}
