//! Project Entity
//!
//! Top-level portfolio entry. Owns zones and floors.

use serde::{Deserialize, Serialize};

use super::entity::{require_title, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub title: String,
    /// URL-friendly name, unique when present
    pub slug: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Project {
    pub fn new(id: u32, title: String) -> Self {
        Self {
            id,
            title,
            slug: None,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Normalize and check user-supplied fields.
    pub fn validated(mut self) -> DomainResult<Self> {
        self.title = require_title(&self.title)?;
        if let Some(slug) = &self.slug {
            let valid = !slug.is_empty()
                && slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(DomainError::InvalidInput(format!(
                    "slug '{}' may only contain a-z, 0-9 and '-'",
                    slug
                )));
            }
        }
        Ok(self)
    }
}

impl Entity for Project {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
