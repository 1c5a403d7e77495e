//! Project Commands

use super::{ApiClient, ClientError};
use crate::models::{NewProject, Project, ProjectPatch};

impl ApiClient {
    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.send(self.http.get(self.url("/api/projects"))).await
    }

    pub async fn get_project(&self, id: u32) -> Result<Project, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/projects/{}", id)))).await
    }

    pub async fn get_project_by_slug(&self, slug: &str) -> Result<Project, ClientError> {
        self.send(self.http.get(self.url(&format!("/api/projects/by-slug/{}", slug))))
            .await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        self.send(self.http.post(self.url("/api/projects")).json(project)).await
    }

    pub async fn update_project(&self, id: u32, patch: &ProjectPatch) -> Result<Project, ClientError> {
        self.send(self.http.patch(self.url(&format!("/api/projects/{}", id))).json(patch))
            .await
    }

    /// Deletes the project with all of its zones, floors and quests.
    pub async fn delete_project(&self, id: u32) -> Result<(), ClientError> {
        self.send_empty(self.http.delete(self.url(&format!("/api/projects/{}", id))))
            .await
    }
}
