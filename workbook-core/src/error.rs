//! Error types for workbook-core.

use thiserror::Error;

use crate::presets::GroupPreset;
use crate::templates::TemplateKind;

/// A payload or field rejected at the domain boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The payload does not satisfy the schema of its template kind.
    #[error("invalid {kind} payload: {reason}")]
    Payload { kind: TemplateKind, reason: String },

    /// A required text field is empty after trimming.
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },

    /// The same id appears twice where ids must be unique.
    #[error("duplicate {what} id '{id}'")]
    DuplicateId { what: &'static str, id: String },
}

impl ValidationError {
    pub(crate) fn payload(kind: TemplateKind, reason: impl Into<String>) -> Self {
        Self::Payload {
            kind,
            reason: reason.into(),
        }
    }
}

/// Errors raised while parsing domain values from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// String did not name one of the closed set of template kinds.
    #[error("unknown template kind '{0}'; expected one of: {}", TemplateKind::names().join(", "))]
    UnknownKind(String),

    /// String did not name a group preset.
    #[error("unknown group preset '{0}'; expected one of: {}", GroupPreset::names().join(", "))]
    UnknownPreset(String),
}
