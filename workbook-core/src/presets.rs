//! Group presets: a name, an icon and a starter bundle of pages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::templates::TemplateKind;
use crate::types::{Group, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPreset {
    Personal,
    Work,
    Finance,
    Study,
    Fitness,
}

/// Static description of what a preset creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetBundle {
    pub name: &'static str,
    pub icon: &'static str,
    pub pages: &'static [(&'static str, TemplateKind)],
}

impl GroupPreset {
    pub const ALL: [GroupPreset; 5] = [
        GroupPreset::Personal,
        GroupPreset::Work,
        GroupPreset::Finance,
        GroupPreset::Study,
        GroupPreset::Fitness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupPreset::Personal => "personal",
            GroupPreset::Work => "work",
            GroupPreset::Finance => "finance",
            GroupPreset::Study => "study",
            GroupPreset::Fitness => "fitness",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.as_str()).collect()
    }

    pub fn bundle(self) -> PresetBundle {
        use TemplateKind as K;
        match self {
            GroupPreset::Personal => PresetBundle {
                name: "Personal",
                icon: "🏠",
                pages: &[("Today", K::Tasks), ("Calendar", K::Calendar), ("Notes", K::Generic)],
            },
            GroupPreset::Work => PresetBundle {
                name: "Work",
                icon: "💼",
                pages: &[
                    ("Board", K::Kanban),
                    ("Sprint", K::Sprint),
                    ("Roadmap", K::Roadmap),
                    ("Bugs", K::Bugs),
                ],
            },
            GroupPreset::Finance => PresetBundle {
                name: "Finance",
                icon: "💰",
                pages: &[("Budget", K::Budget), ("Accounts", K::Table)],
            },
            GroupPreset::Study => PresetBundle {
                name: "Study",
                icon: "📚",
                pages: &[
                    ("Subjects", K::Study),
                    ("Assignments", K::Tasks),
                    ("Projects", K::Projects),
                ],
            },
            GroupPreset::Fitness => PresetBundle {
                name: "Fitness",
                icon: "🏋",
                pages: &[("Workouts", K::Workout), ("Meals", K::Diet)],
            },
        }
    }

    /// Build the group and its pages, positioned 0..n-1.
    pub fn instantiate(self) -> (Group, Vec<Page>) {
        let bundle = self.bundle();
        let mut group = Group::new(bundle.name.to_owned());
        group.icon = Some(bundle.icon.to_owned());
        let pages: Vec<Page> = bundle
            .pages
            .iter()
            .enumerate()
            .map(|(position, (name, kind))| {
                Page::new(group.id.clone(), (*name).to_owned(), *kind, position)
            })
            .collect();
        group.page_ids = pages.iter().map(|p| p.id.clone()).collect();
        (group, pages)
    }
}

impl fmt::Display for GroupPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownPreset(s.to_owned()))
    }
}
