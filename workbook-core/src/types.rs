//! Domain types for the workspace tree.
//!
//! Records are plain values. A [`Group`] refers to its pages by id and a
//! [`Page`] names its parent group, so both can live in flat id-keyed tables
//! and be replaced row by row.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::templates::{TemplateData, TemplateKind};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random (v4) identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

id_newtype!(
    /// Identifier of a workspace; also the persistence key.
    WorkspaceId
);
id_newtype!(
    /// Identifier of a group, unique within its workspace.
    GroupId
);
id_newtype!(
    /// Identifier of a page, unique within its workspace.
    PageId
);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trimmed copy of `name`, or `None` when nothing is left.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Like [`normalize_name`] but reports the blank field as an error.
pub fn require_name(field: &'static str, name: &str) -> Result<String, ValidationError> {
    normalize_name(name).ok_or(ValidationError::BlankField { field })
}

/// Next `updated_at` after `previous`: the current time, or one nanosecond
/// past `previous` if the clock has not moved on.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Root attributes of a workspace. The group sequence lives beside it in the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub id: WorkspaceId,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl WorkspaceInfo {
    pub fn new(name: &str, owner_id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: WorkspaceId::generate(),
            name: require_name("workspace name", name)?,
            owner_id: require_name("owner id", owner_id)?,
            created_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named, ordered container of pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub icon: Option<String>,
    /// Display order of the group's pages; index equals page position.
    pub page_ids: im::Vector<PageId>,
    pub expanded: bool,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// A new, empty, expanded group. `name` must already be normalized.
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::generate(),
            name,
            icon: None,
            page_ids: im::Vector::new(),
            expanded: true,
            favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.page_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page_ids.is_empty()
    }

    pub fn index_of(&self, page_id: &PageId) -> Option<usize> {
        self.page_ids.index_of(page_id)
    }

    /// Bump `updated_at` after a change to the group's fields or page order.
    pub fn touch(&mut self) {
        self.updated_at = advance(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A single content unit. Its kind is the kind of its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub group_id: GroupId,
    pub name: String,
    pub icon: Option<String>,
    /// Zero-based rank within the parent group.
    pub position: usize,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Arc<TemplateData>,
}

impl Page {
    /// A new page with the empty payload for `kind`.
    pub fn new(group_id: GroupId, name: String, kind: TemplateKind, position: usize) -> Self {
        let now = Utc::now();
        Self {
            id: PageId::generate(),
            group_id,
            name,
            icon: None,
            position,
            favorite: false,
            created_at: now,
            updated_at: now,
            data: Arc::new(TemplateData::default_for(kind)),
        }
    }

    pub fn kind(&self) -> TemplateKind {
        self.data.kind()
    }

    pub fn touch(&mut self) {
        self.updated_at = advance(self.updated_at);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display_and_equality() {
        assert_eq!(GroupId::from("g-1").to_string(), "g-1");
        assert_eq!(PageId::from("p"), PageId::from(String::from("p")));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(PageId::generate(), PageId::generate());
        assert!(!WorkspaceId::generate().as_str().is_empty());
    }

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Inbox "), Some("Inbox".to_string()));
        assert_eq!(normalize_name(" \t\n"), None);
        assert_eq!(
            require_name("group name", ""),
            Err(ValidationError::BlankField { field: "group name" })
        );
    }

    #[test]
    fn advance_is_strictly_monotonic() {
        let future = Utc::now() + Duration::hours(1);
        let next = advance(future);
        assert!(next > future);
        let next_again = advance(next);
        assert!(next_again > next);
    }

    #[test]
    fn new_page_has_default_payload() {
        let page = Page::new(GroupId::from("g"), "Today".into(), TemplateKind::Tasks, 0);
        assert_eq!(page.kind(), TemplateKind::Tasks);
        assert_eq!(page.position, 0);
        assert!(!page.favorite);
        assert_eq!(page.created_at, page.updated_at);
        assert_eq!(*page.data, TemplateData::default_for(TemplateKind::Tasks));
    }

    #[test]
    fn workspace_info_rejects_blank_owner() {
        assert!(WorkspaceInfo::new("W", "u1").is_ok());
        assert_eq!(
            WorkspaceInfo::new("W", "  "),
            Err(ValidationError::BlankField { field: "owner id" })
        );
    }

    #[test]
    fn group_touch_advances_updated_at() {
        let mut group = Group::new("Tasks".into());
        let before = group.updated_at;
        group.touch();
        assert!(group.updated_at > before);
    }
}
