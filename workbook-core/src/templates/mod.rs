//! Template kinds and the payload registry.
//!
//! Every page carries a [`TemplateData`] whose variant is fixed by its
//! [`TemplateKind`]. Raw JSON enters the domain only through [`validate`],
//! which is an exhaustive match over the kinds: adding a kind means adding a
//! variant here and a record in [`payloads`], nothing in the store changes.

pub mod payloads;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, ValidationError};

pub use payloads::{
    BudgetData, BugsData, CalendarData, DietData, KanbanData, ProjectsData, RoadmapData,
    SprintData, StudyData, TableData, TasksData, WorkoutData,
};

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Closed set of page templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Generic,
    Budget,
    Bugs,
    Calendar,
    Kanban,
    Table,
    Tasks,
    Sprint,
    Study,
    Roadmap,
    Projects,
    Diet,
    Workout,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 13] = [
        TemplateKind::Generic,
        TemplateKind::Budget,
        TemplateKind::Bugs,
        TemplateKind::Calendar,
        TemplateKind::Kanban,
        TemplateKind::Table,
        TemplateKind::Tasks,
        TemplateKind::Sprint,
        TemplateKind::Study,
        TemplateKind::Roadmap,
        TemplateKind::Projects,
        TemplateKind::Diet,
        TemplateKind::Workout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Generic => "generic",
            TemplateKind::Budget => "budget",
            TemplateKind::Bugs => "bugs",
            TemplateKind::Calendar => "calendar",
            TemplateKind::Kanban => "kanban",
            TemplateKind::Table => "table",
            TemplateKind::Tasks => "tasks",
            TemplateKind::Sprint => "sprint",
            TemplateKind::Study => "study",
            TemplateKind::Roadmap => "roadmap",
            TemplateKind::Projects => "projects",
            TemplateKind::Diet => "diet",
            TemplateKind::Workout => "workout",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.as_str()).collect()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownKind(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// TemplateData
// ---------------------------------------------------------------------------

/// A validated page payload. The variant always agrees with the page's kind.
///
/// Serializes to the bare payload document (no tag); the kind travels
/// separately in the page record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateData {
    Generic(Value),
    Budget(BudgetData),
    Bugs(BugsData),
    Calendar(CalendarData),
    Kanban(KanbanData),
    Table(TableData),
    Tasks(TasksData),
    Sprint(SprintData),
    Study(StudyData),
    Roadmap(RoadmapData),
    Projects(ProjectsData),
    Diet(DietData),
    Workout(WorkoutData),
}

impl TemplateData {
    /// Empty payload for a freshly created page of `kind`.
    pub fn default_for(kind: TemplateKind) -> Self {
        match kind {
            TemplateKind::Generic => TemplateData::Generic(Value::Object(Default::default())),
            TemplateKind::Budget => TemplateData::Budget(BudgetData::default()),
            TemplateKind::Bugs => TemplateData::Bugs(BugsData::default()),
            TemplateKind::Calendar => TemplateData::Calendar(CalendarData::default()),
            TemplateKind::Kanban => TemplateData::Kanban(KanbanData::default()),
            TemplateKind::Table => TemplateData::Table(TableData::default()),
            TemplateKind::Tasks => TemplateData::Tasks(TasksData::default()),
            TemplateKind::Sprint => TemplateData::Sprint(SprintData::default()),
            TemplateKind::Study => TemplateData::Study(StudyData::default()),
            TemplateKind::Roadmap => TemplateData::Roadmap(RoadmapData::default()),
            TemplateKind::Projects => TemplateData::Projects(ProjectsData::default()),
            TemplateKind::Diet => TemplateData::Diet(DietData::default()),
            TemplateKind::Workout => TemplateData::Workout(WorkoutData::default()),
        }
    }

    pub fn kind(&self) -> TemplateKind {
        match self {
            TemplateData::Generic(_) => TemplateKind::Generic,
            TemplateData::Budget(_) => TemplateKind::Budget,
            TemplateData::Bugs(_) => TemplateKind::Bugs,
            TemplateData::Calendar(_) => TemplateKind::Calendar,
            TemplateData::Kanban(_) => TemplateKind::Kanban,
            TemplateData::Table(_) => TemplateKind::Table,
            TemplateData::Tasks(_) => TemplateKind::Tasks,
            TemplateData::Sprint(_) => TemplateKind::Sprint,
            TemplateData::Study(_) => TemplateKind::Study,
            TemplateData::Roadmap(_) => TemplateKind::Roadmap,
            TemplateData::Projects(_) => TemplateKind::Projects,
            TemplateData::Diet(_) => TemplateKind::Diet,
            TemplateData::Workout(_) => TemplateKind::Workout,
        }
    }

    /// Raw JSON form of the payload, as stored in the workspace document.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Semantic rules a payload must satisfy beyond its serde shape.
pub trait Check {
    fn check(&self) -> Result<(), String>;
}

/// Validate `value` against the schema of `kind` and narrow it to the
/// matching [`TemplateData`] variant.
///
/// Structured kinds reject unknown fields, missing required fields, wrong
/// primitive types, out-of-enumeration strings and [`Check`] violations.
/// `generic` accepts any JSON value.
pub fn validate(kind: TemplateKind, value: Value) -> Result<TemplateData, ValidationError> {
    let data = match kind {
        TemplateKind::Generic => TemplateData::Generic(value),
        TemplateKind::Budget => TemplateData::Budget(parse(kind, value)?),
        TemplateKind::Bugs => TemplateData::Bugs(parse(kind, value)?),
        TemplateKind::Calendar => TemplateData::Calendar(parse(kind, value)?),
        TemplateKind::Kanban => TemplateData::Kanban(parse(kind, value)?),
        TemplateKind::Table => TemplateData::Table(parse(kind, value)?),
        TemplateKind::Tasks => TemplateData::Tasks(parse(kind, value)?),
        TemplateKind::Sprint => TemplateData::Sprint(parse(kind, value)?),
        TemplateKind::Study => TemplateData::Study(parse(kind, value)?),
        TemplateKind::Roadmap => TemplateData::Roadmap(parse(kind, value)?),
        TemplateKind::Projects => TemplateData::Projects(parse(kind, value)?),
        TemplateKind::Diet => TemplateData::Diet(parse(kind, value)?),
        TemplateKind::Workout => TemplateData::Workout(parse(kind, value)?),
    };
    Ok(data)
}

fn parse<T>(kind: TemplateKind, value: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Check,
{
    let payload: T =
        serde_json::from_value(value).map_err(|e| ValidationError::payload(kind, e.to_string()))?;
    payload
        .check()
        .map_err(|reason| ValidationError::payload(kind, reason))?;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_display_matches_serde() {
        for kind in TemplateKind::ALL {
            let encoded = serde_json::to_value(kind).expect("serialize");
            assert_eq!(encoded, Value::String(kind.to_string()));
        }
    }

    #[test]
    fn kind_from_str_is_case_insensitive() {
        assert_eq!("Kanban".parse::<TemplateKind>(), Ok(TemplateKind::Kanban));
        assert_eq!(" tasks ".parse::<TemplateKind>(), Ok(TemplateKind::Tasks));
        assert!(matches!(
            "spreadsheet".parse::<TemplateKind>(),
            Err(CoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn default_payload_has_matching_kind_and_validates() {
        for kind in TemplateKind::ALL {
            let data = TemplateData::default_for(kind);
            assert_eq!(data.kind(), kind);
            let raw = data.to_value().expect("to_value");
            let back = validate(kind, raw).expect("default payload must validate");
            assert_eq!(back, data);
        }
    }

    #[test]
    fn generic_accepts_any_value() {
        for value in [json!(null), json!(42), json!("text"), json!([1, {"a": true}])] {
            let data = validate(TemplateKind::Generic, value.clone()).expect("generic");
            assert_eq!(data, TemplateData::Generic(value));
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = validate(TemplateKind::Tasks, json!({"tasks": [], "extra": 1})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Payload {
                kind: TemplateKind::Tasks,
                ..
            }
        ));
        assert!(err.to_string().contains("extra"), "got: {err}");
    }

    #[test]
    fn payload_of_another_kind_is_rejected() {
        let err = validate(TemplateKind::Budget, json!({"tasks": []})).unwrap_err();
        assert!(err.to_string().starts_with("invalid budget payload"), "got: {err}");
    }
}
