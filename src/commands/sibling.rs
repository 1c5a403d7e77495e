//! Zone, Floor and Quest Commands

use async_trait::async_trait;
use sibling_order::{ReorderRequest, SiblingStore, StoreError};

use super::{ApiClient, ClientError};
use crate::models::{NewSibling, OrderedEntity, SiblingKind, SiblingPatch};

fn children_path(kind: SiblingKind, parent_id: u32) -> String {
    format!("/api/{}/{}/{}", kind.parent_plural(), parent_id, kind.plural())
}

fn entity_path(kind: SiblingKind, id: u32) -> String {
    format!("/api/{}/{}", kind.plural(), id)
}

impl ApiClient {
    /// Children of `parent_id`, sorted by order
    pub async fn list_children(&self, kind: SiblingKind, parent_id: u32) -> Result<Vec<OrderedEntity>, ClientError> {
        self.send(self.http.get(self.url(&children_path(kind, parent_id)))).await
    }

    pub async fn create_sibling(
        &self,
        kind: SiblingKind,
        parent_id: u32,
        sibling: &NewSibling,
    ) -> Result<OrderedEntity, ClientError> {
        self.send(self.http.post(self.url(&children_path(kind, parent_id))).json(sibling))
            .await
    }

    pub async fn get_sibling(&self, kind: SiblingKind, id: u32) -> Result<OrderedEntity, ClientError> {
        self.send(self.http.get(self.url(&entity_path(kind, id)))).await
    }

    pub async fn update_sibling(
        &self,
        kind: SiblingKind,
        id: u32,
        patch: &SiblingPatch,
    ) -> Result<OrderedEntity, ClientError> {
        self.send(self.http.patch(self.url(&entity_path(kind, id))).json(patch))
            .await
    }

    pub async fn delete_sibling(&self, kind: SiblingKind, id: u32) -> Result<(), ClientError> {
        self.send_empty(self.http.delete(self.url(&entity_path(kind, id)))).await
    }

    /// Apply a whole reorder in one server-side transaction.
    pub async fn reorder_children(
        &self,
        kind: SiblingKind,
        request: &ReorderRequest,
    ) -> Result<Vec<OrderedEntity>, ClientError> {
        let path = format!("{}/order", children_path(kind, request.parent_id));
        self.send(self.http.put(self.url(&path)).json(request)).await
    }
}

/// One sibling collection of the server, seen as a reorder store.
///
/// Each order write is a separate `PATCH`, so a two-phase write-back through
/// this store goes over the wire one request at a time.
#[derive(Debug, Clone)]
pub struct SiblingCommands {
    client: ApiClient,
    kind: SiblingKind,
}

impl SiblingCommands {
    pub fn new(client: ApiClient, kind: SiblingKind) -> Self {
        Self { client, kind }
    }

    pub fn kind(&self) -> SiblingKind {
        self.kind
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl SiblingStore for SiblingCommands {
    type Item = OrderedEntity;

    async fn list_siblings(&self, parent_id: u32) -> Result<Vec<OrderedEntity>, StoreError> {
        Ok(self.client.list_children(self.kind, parent_id).await?)
    }

    async fn update_order(&self, id: u32, order: i32) -> Result<(), StoreError> {
        let patch = SiblingPatch {
            order: Some(order),
            ..Default::default()
        };
        self.client.update_sibling(self.kind, id, &patch).await?;
        Ok(())
    }
}
