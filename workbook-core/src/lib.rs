//! Workbook core library: domain records, template payloads and presets.
//!
//! Public API surface:
//! - [`types`]: ids, [`Group`] and [`Page`] records, timestamp helpers
//! - [`templates`]: [`TemplateKind`], [`TemplateData`] and [`validate`]
//! - [`presets`]: [`GroupPreset`] bundles
//! - [`error`]: [`ValidationError`], [`CoreError`]

pub mod error;
pub mod presets;
pub mod templates;
pub mod types;

pub use error::{CoreError, ValidationError};
pub use presets::{GroupPreset, PresetBundle};
pub use templates::{validate, TemplateData, TemplateKind};
pub use types::{Group, GroupId, Page, PageId, WorkspaceId, WorkspaceInfo};
