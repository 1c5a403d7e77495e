//! Client Models
//!
//! Data structures matching backend entities.

use serde::{Deserialize, Serialize};
use sibling_order::Sequenced;

/// Project data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingKind {
    Zone,
    Floor,
    Quest,
}

impl SiblingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiblingKind::Zone => "zone",
            SiblingKind::Floor => "floor",
            SiblingKind::Quest => "quest",
        }
    }

    /// Collection path segment
    pub fn plural(&self) -> &'static str {
        match self {
            SiblingKind::Zone => "zones",
            SiblingKind::Floor => "floors",
            SiblingKind::Quest => "quests",
        }
    }

    /// Path segment of the parent collection
    pub fn parent_plural(&self) -> &'static str {
        match self {
            SiblingKind::Zone | SiblingKind::Floor => "projects",
            SiblingKind::Quest => "zones",
        }
    }
}

/// Zone, floor or quest (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedEntity {
    pub id: u32,
    pub kind: SiblingKind,
    pub parent_id: u32,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Sequenced for OrderedEntity {
    fn id(&self) -> u32 {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields left `None` are not sent and stay unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSibling {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit position; the server appends when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

/// Fields left `None` are not sent and stay unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_server_entity() {
        let json = r#"{"id":4,"kind":"quest","parentId":2,"title":"Boss","description":null,"order":3,"createdAt":1,"updatedAt":1}"#;
        let quest: OrderedEntity = serde_json::from_str(json).unwrap();
        assert_eq!(quest.kind, SiblingKind::Quest);
        assert_eq!(quest.parent_id, 2);
        assert_eq!(Sequenced::order(&quest), 3);
    }

    #[test]
    fn test_patch_sends_only_set_fields() {
        let patch = SiblingPatch {
            order: Some(10002),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"order":10002}"#);
    }
}
