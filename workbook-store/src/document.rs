//! The persisted workspace document.
//!
//! ```text
//! {id, name, ownerId, createdAt,
//!  groups: [{id, name, icon?, expanded, favorite, createdAt, updatedAt,
//!            pages: [{id, name, icon?, kind, position, favorite, createdAt, updatedAt, data}]}]}
//! ```
//!
//! `data` is raw JSON here. Converting a document into a [`Snapshot`] runs
//! every payload through the template registry, so nothing unvalidated
//! reaches the store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use workbook_core::types::require_name;
use workbook_core::{
    validate, Group, GroupId, Page, PageId, TemplateKind, ValidationError, WorkspaceId,
    WorkspaceInfo,
};

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    pub id: WorkspaceId,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDocument {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub expanded: bool,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pages: Vec<PageDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub id: PageId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub kind: TemplateKind,
    pub position: usize,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Value,
}

impl WorkspaceDocument {
    /// Flatten a snapshot into its persisted layout.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, serde_json::Error> {
        let info = snapshot.info();
        let groups = snapshot
            .groups()
            .map(|group| {
                let pages = snapshot
                    .pages(&group.id)
                    .map(|page| {
                        Ok(PageDocument {
                            id: page.id.clone(),
                            name: page.name.clone(),
                            icon: page.icon.clone(),
                            kind: page.kind(),
                            position: page.position,
                            favorite: page.favorite,
                            created_at: page.created_at,
                            updated_at: page.updated_at,
                            data: page.data.to_value()?,
                        })
                    })
                    .collect::<Result<Vec<_>, serde_json::Error>>()?;
                Ok(GroupDocument {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    icon: group.icon.clone(),
                    expanded: group.expanded,
                    favorite: group.favorite,
                    created_at: group.created_at,
                    updated_at: group.updated_at,
                    pages,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(Self {
            id: info.id.clone(),
            name: info.name.clone(),
            owner_id: info.owner_id.clone(),
            created_at: info.created_at,
            groups,
        })
    }

    /// Rebuild a snapshot, validating every payload against its kind.
    ///
    /// Page order follows array order; stored `position` values that
    /// disagree are re-derived with a warning. Duplicate group or page ids
    /// and blank names are rejected.
    pub fn into_snapshot(self) -> Result<Snapshot, ValidationError> {
        let info = WorkspaceInfo {
            id: self.id,
            name: require_name("workspace name", &self.name)?,
            owner_id: require_name("owner id", &self.owner_id)?,
            created_at: self.created_at,
        };
        let mut snapshot = Snapshot::new(info);
        let mut group_ids = HashSet::new();
        let mut page_ids = HashSet::new();

        for doc in self.groups {
            if !group_ids.insert(doc.id.clone()) {
                return Err(ValidationError::DuplicateId {
                    what: "group",
                    id: doc.id.0,
                });
            }
            let mut group = Group {
                name: require_name("group name", &doc.name)?,
                id: doc.id,
                icon: doc.icon,
                page_ids: im::Vector::new(),
                expanded: doc.expanded,
                favorite: doc.favorite,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
            };
            let mut pages = Vec::with_capacity(doc.pages.len());
            for (index, page) in doc.pages.into_iter().enumerate() {
                if !page_ids.insert(page.id.clone()) {
                    return Err(ValidationError::DuplicateId {
                        what: "page",
                        id: page.id.0,
                    });
                }
                if page.position != index {
                    tracing::warn!(
                        page = %page.id,
                        stored = page.position,
                        derived = index,
                        "re-deriving page position from document order"
                    );
                }
                let name = require_name("page name", &page.name)?;
                let data = validate(page.kind, page.data)?;
                group.page_ids.push_back(page.id.clone());
                pages.push(Page {
                    id: page.id,
                    group_id: group.id.clone(),
                    name,
                    icon: page.icon,
                    position: index,
                    favorite: page.favorite,
                    created_at: page.created_at,
                    updated_at: page.updated_at,
                    data: Arc::new(data),
                });
            }
            snapshot.push_group(group, pages);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_doc(id: &str, position: usize, kind: TemplateKind, data: Value) -> PageDocument {
        let now = Utc::now();
        PageDocument {
            id: PageId::from(id),
            name: id.to_uppercase(),
            icon: None,
            kind,
            position,
            favorite: false,
            created_at: now,
            updated_at: now,
            data,
        }
    }

    fn doc(pages: Vec<PageDocument>) -> WorkspaceDocument {
        let now = Utc::now();
        WorkspaceDocument {
            id: WorkspaceId::from("ws"),
            name: "W".into(),
            owner_id: "u1".into(),
            created_at: now,
            groups: vec![GroupDocument {
                id: GroupId::from("g"),
                name: "G".into(),
                icon: Some("📁".into()),
                expanded: true,
                favorite: false,
                created_at: now,
                updated_at: now,
                pages,
            }],
        }
    }

    #[test]
    fn keys_are_camel_case() {
        let page = page_doc("p", 0, TemplateKind::Tasks, json!({"tasks": []}));
        let encoded = serde_json::to_value(doc(vec![page])).expect("serialize");
        assert!(encoded.get("ownerId").is_some());
        assert!(encoded["groups"][0].get("updatedAt").is_some());
        assert_eq!(encoded["groups"][0]["pages"][0]["kind"], "tasks");
        assert!(encoded["groups"][0]["pages"][0].get("icon").is_none());
    }

    #[test]
    fn positions_are_rederived_from_order() {
        let snapshot = doc(vec![
            page_doc("a", 4, TemplateKind::Generic, json!({})),
            page_doc("b", 4, TemplateKind::Generic, json!({})),
        ])
        .into_snapshot()
        .expect("into_snapshot");
        let positions: Vec<usize> = snapshot
            .pages(&GroupId::from("g"))
            .map(|p| p.position)
            .collect();
        assert_eq!(positions, [0, 1]);
        assert!(snapshot.verify().is_ok());
    }

    #[test]
    fn invalid_payload_rejects_document() {
        let err = doc(vec![page_doc("a", 0, TemplateKind::Budget, json!({"items": "none"}))])
            .into_snapshot()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Payload { kind: TemplateKind::Budget, .. }));
    }

    #[test]
    fn duplicate_page_id_is_rejected() {
        let err = doc(vec![
            page_doc("a", 0, TemplateKind::Generic, json!({})),
            page_doc("a", 1, TemplateKind::Generic, json!({})),
        ])
        .into_snapshot()
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateId { what: "page", id: "a".into() });
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut blank_owner = doc(vec![]);
        blank_owner.owner_id = String::new();
        assert_eq!(
            blank_owner.into_snapshot().unwrap_err(),
            ValidationError::BlankField { field: "owner id" }
        );

        let mut blank_group = doc(vec![]);
        blank_group.groups[0].name = "   ".into();
        assert_eq!(
            blank_group.into_snapshot().unwrap_err(),
            ValidationError::BlankField { field: "group name" }
        );

        let mut unnamed = page_doc("a", 0, TemplateKind::Generic, json!({}));
        unnamed.name = " \t".into();
        assert_eq!(
            doc(vec![unnamed]).into_snapshot().unwrap_err(),
            ValidationError::BlankField { field: "page name" }
        );
    }

    #[test]
    fn snapshot_document_roundtrip() {
        let original = doc(vec![
            page_doc(
                "a",
                0,
                TemplateKind::Tasks,
                json!({"tasks": [{"id": "t", "title": "x", "completed": false}]}),
            ),
            page_doc("b", 1, TemplateKind::Kanban, json!({"columns": []})),
        ]);
        let snapshot = original.clone().into_snapshot().expect("into_snapshot");
        let back = WorkspaceDocument::from_snapshot(&snapshot).expect("from_snapshot");
        assert_eq!(back, original);
    }
}
