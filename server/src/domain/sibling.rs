//! Ordered Sibling Entities
//!
//! Zones and floors belong to a project, quests belong to a zone. Each keeps
//! an `order` that is unique among the children of its parent.

use serde::{Deserialize, Serialize};
use sibling_order::Sequenced;

use super::entity::{require_title, DomainError, DomainResult, Entity};

/// Which sibling collection an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingKind {
    Zone,
    Floor,
    Quest,
}

impl SiblingKind {
    pub const ALL: [SiblingKind; 3] = [SiblingKind::Zone, SiblingKind::Floor, SiblingKind::Quest];

    pub fn as_str(&self) -> &'static str {
        match self {
            SiblingKind::Zone => "zone",
            SiblingKind::Floor => "floor",
            SiblingKind::Quest => "quest",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            SiblingKind::Zone => "zones",
            SiblingKind::Floor => "floors",
            SiblingKind::Quest => "quests",
        }
    }

    pub fn parent_table(&self) -> &'static str {
        match self {
            SiblingKind::Zone | SiblingKind::Floor => "projects",
            SiblingKind::Quest => "zones",
        }
    }

    pub fn parent_column(&self) -> &'static str {
        match self {
            SiblingKind::Zone | SiblingKind::Floor => "project_id",
            SiblingKind::Quest => "zone_id",
        }
    }

    /// Singular name of the parent, for messages
    pub fn parent_name(&self) -> &'static str {
        match self {
            SiblingKind::Zone | SiblingKind::Floor => "project",
            SiblingKind::Quest => "zone",
        }
    }
}

/// A zone, floor or quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedEntity {
    pub id: u32,
    pub kind: SiblingKind,
    pub parent_id: u32,
    pub title: String,
    pub description: Option<String>,
    /// Position among siblings, 1-based. 0 means "append" on create.
    pub order: i32,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl OrderedEntity {
    /// New entity appended after its current siblings
    pub fn new(kind: SiblingKind, parent_id: u32, title: String) -> Self {
        Self {
            id: 0,
            kind,
            parent_id,
            title,
            description: None,
            order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn validated(mut self) -> DomainResult<Self> {
        self.title = require_title(&self.title)?;
        if self.order < 0 {
            return Err(DomainError::InvalidInput(format!(
                "order {} is not a positive integer",
                self.order
            )));
        }
        Ok(self)
    }
}

impl Entity for OrderedEntity {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
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
