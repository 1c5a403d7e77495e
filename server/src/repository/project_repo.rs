//! Project Repository
//!
//! SQLite-backed CRUD for projects. Deleting a project cascades to its
//! zones, floors and their quests through foreign keys.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use super::db::{map_db_error, now_millis};
use super::traits::Repository;
use crate::domain::{DomainError, DomainResult, Project};

const PROJECT_COLUMNS: &str = "id, title, slug, description, created_at, updated_at";

/// SQLite implementation of Project repository
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<Project>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {} FROM projects WHERE slug = ?1", PROJECT_COLUMNS),
            params![slug],
            row_to_project,
        )
        .optional()
        .map_err(map_db_error)
    }
}

#[async_trait]
impl Repository<Project> for ProjectRepository {
    async fn create(&self, entity: &Project) -> DomainResult<Project> {
        let project = entity.clone().validated()?;
        let conn = self.conn.lock().await;
        let now = now_millis();

        conn.execute(
            "INSERT INTO projects (title, slug, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![project.title, project.slug, project.description, now],
        )
        .map_err(map_db_error)?;

        Ok(Project {
            id: conn.last_insert_rowid() as u32,
            created_at: Some(now),
            updated_at: Some(now),
            ..project
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Project>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
            params![id],
            row_to_project,
        )
        .optional()
        .map_err(map_db_error)
    }

    async fn list(&self) -> DomainResult<Vec<Project>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM projects ORDER BY id", PROJECT_COLUMNS))
            .map_err(map_db_error)?;
        let projects = stmt
            .query_map([], row_to_project)
            .map_err(map_db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_db_error)?;
        Ok(projects)
    }

    async fn update(&self, entity: &Project) -> DomainResult<Project> {
        let project = entity.clone().validated()?;
        let conn = self.conn.lock().await;
        let now = now_millis();

        let changed = conn
            .execute(
                "UPDATE projects SET title = ?1, slug = ?2, description = ?3, updated_at = ?4 WHERE id = ?5",
                params![project.title, project.slug, project.description, now, project.id],
            )
            .map_err(map_db_error)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Project {} not found", project.id)));
        }

        Ok(Project {
            updated_at: Some(now),
            ..project
        })
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .map_err(map_db_error)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Project {} not found", id)));
        }
        tracing::info!(project_id = id, "project deleted");
        Ok(())
    }
}

/// Convert a database row to Project
fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
