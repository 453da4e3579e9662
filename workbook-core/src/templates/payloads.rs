//! Typed payload records, one per structured template kind.
//!
//! JSON keys are camelCase, unknown fields are rejected and enumerated
//! strings are kebab-case. Dates are `YYYY-MM-DD`, clock times `HH:MM`.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Check;

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// Ids must be non-empty and unique within one list.
fn unique_ids<'a>(what: &str, ids: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(format!("{what} id must not be blank"));
        }
        if !seen.insert(id) {
            return Err(format!("duplicate {what} id '{id}'"));
        }
    }
    Ok(())
}

fn non_negative(what: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{what} must be a finite non-negative number, got {value}"));
    }
    Ok(())
}

fn percent(what: &str, value: u8) -> Result<(), String> {
    if value > 100 {
        return Err(format!("{what} must be within 0..=100, got {value}"));
    }
    Ok(())
}

fn date_range(what: &str, start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if end < start {
        return Err(format!("{what} ends ({end}) before it starts ({start})"));
    }
    Ok(())
}

fn clock(what: &str, value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| format!("{what} must be HH:MM, got '{value}'"))
}

// ---------------------------------------------------------------------------
// budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetData {
    pub items: Vec<BudgetItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    Expense,
    Income,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BudgetItem {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: NaiveDate,
}

impl BudgetData {
    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.items
            .iter()
            .map(|i| match i.entry_type {
                EntryType::Income => i.amount,
                EntryType::Expense => -i.amount,
            })
            .sum()
    }
}

impl Check for BudgetData {
    fn check(&self) -> Result<(), String> {
        unique_ids("item", self.items.iter().map(|i| i.id.as_str()))?;
        for item in &self.items {
            non_negative("amount", item.amount)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// bugs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BugsData {
    pub bugs: Vec<Bug>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bug {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: BugPriority,
    pub status: BugStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub created_at: NaiveDate,
}

impl Check for BugsData {
    fn check(&self) -> Result<(), String> {
        unique_ids("bug", self.bugs.iter().map(|b| b.id.as_str()))
    }
}

// ---------------------------------------------------------------------------
// calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarData {
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Check for CalendarData {
    fn check(&self) -> Result<(), String> {
        unique_ids("event", self.events.iter().map(|e| e.id.as_str()))?;
        for event in &self.events {
            let start = event.start_time.as_deref().map(|t| clock("startTime", t)).transpose()?;
            let end = event.end_time.as_deref().map(|t| clock("endTime", t)).transpose()?;
            if let (Some(start), Some(end)) = (start, end) {
                if end < start {
                    return Err(format!("event '{}' ends before it starts", event.id));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// kanban
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KanbanData {
    pub columns: Vec<KanbanColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KanbanColumn {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<KanbanCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KanbanCard {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Check for KanbanData {
    fn check(&self) -> Result<(), String> {
        unique_ids("column", self.columns.iter().map(|c| c.id.as_str()))?;
        // A card lives in exactly one column, so card ids are board-wide.
        unique_ids(
            "card",
            self.columns
                .iter()
                .flat_map(|c| c.cards.iter().map(|card| card.id.as_str())),
        )
    }
}

// ---------------------------------------------------------------------------
// table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableData {
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableColumn {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub cells: BTreeMap<String, Value>,
}

impl Check for TableData {
    fn check(&self) -> Result<(), String> {
        unique_ids("column", self.columns.iter().map(|c| c.id.as_str()))?;
        unique_ids("row", self.rows.iter().map(|r| r.id.as_str()))?;
        for row in &self.rows {
            for column_id in row.cells.keys() {
                if !self.columns.iter().any(|c| &c.id == column_id) {
                    return Err(format!(
                        "row '{}' has a cell for undeclared column '{column_id}'",
                        row.id
                    ));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksData {
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl Check for TasksData {
    fn check(&self) -> Result<(), String> {
        unique_ids("task", self.tasks.iter().map(|t| t.id.as_str()))
    }
}

// ---------------------------------------------------------------------------
// sprint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SprintData {
    pub sprints: Vec<Sprint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SprintTaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub tasks: Vec<SprintTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SprintTask {
    pub id: String,
    pub title: String,
    pub status: SprintTaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl Check for SprintData {
    fn check(&self) -> Result<(), String> {
        unique_ids("sprint", self.sprints.iter().map(|s| s.id.as_str()))?;
        for sprint in &self.sprints {
            date_range(&format!("sprint '{}'", sprint.id), sprint.start_date, sprint.end_date)?;
            unique_ids("sprint task", sprint.tasks.iter().map(|t| t.id.as_str()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// study
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyData {
    pub subjects: Vec<StudySubject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudySubject {
    pub id: String,
    pub name: String,
    pub target_hours: f64,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StudySession {
    pub id: String,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudySubject {
    pub fn hours_logged(&self) -> f64 {
        self.sessions
            .iter()
            .map(|s| f64::from(s.duration_minutes) / 60.0)
            .sum()
    }
}

impl Check for StudyData {
    fn check(&self) -> Result<(), String> {
        unique_ids("subject", self.subjects.iter().map(|s| s.id.as_str()))?;
        for subject in &self.subjects {
            non_negative("targetHours", subject.target_hours)?;
            unique_ids("session", subject.sessions.iter().map(|s| s.id.as_str()))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// roadmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoadmapData {
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MilestoneStatus,
    pub progress: u8,
}

impl Check for RoadmapData {
    fn check(&self) -> Result<(), String> {
        unique_ids("milestone", self.milestones.iter().map(|m| m.id.as_str()))?;
        for m in &self.milestones {
            date_range(&format!("milestone '{}'", m.id), m.start_date, m.end_date)?;
            percent("progress", m.progress)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectsData {
    pub projects: Vec<ProjectItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    OnHold,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub progress: u8,
}

impl Check for ProjectsData {
    fn check(&self) -> Result<(), String> {
        unique_ids("project", self.projects.iter().map(|p| p.id.as_str()))?;
        for p in &self.projects {
            percent("progress", p.progress)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// diet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DietData {
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub meal_type: MealType,
    pub calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    pub date: NaiveDate,
}

impl DietData {
    /// Total calories logged on `date`. Summed as `u64` so a day of large
    /// entries cannot overflow.
    pub fn calories_on(&self, date: NaiveDate) -> u64 {
        self.meals
            .iter()
            .filter(|m| m.date == date)
            .map(|m| u64::from(m.calories))
            .sum()
    }

    /// Most recent day with a logged meal.
    pub fn latest_day(&self) -> Option<NaiveDate> {
        self.meals.iter().map(|m| m.date).max()
    }
}

impl Check for DietData {
    fn check(&self) -> Result<(), String> {
        unique_ids("meal", self.meals.iter().map(|m| m.id.as_str()))?;
        for meal in &self.meals {
            let macros = [("protein", meal.protein), ("carbs", meal.carbs), ("fat", meal.fat)];
            for (what, grams) in macros {
                if let Some(grams) = grams {
                    non_negative(what, grams)?;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// workout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkoutData {
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Check for WorkoutData {
    fn check(&self) -> Result<(), String> {
        unique_ids("workout", self.workouts.iter().map(|w| w.id.as_str()))?;
        for workout in &self.workouts {
            unique_ids("exercise", workout.exercises.iter().map(|e| e.id.as_str()))?;
            for exercise in &workout.exercises {
                if let Some(weight) = exercise.weight {
                    non_negative("weight", weight)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    #[test]
    fn budget_balance_nets_income_against_expenses() {
        let data = BudgetData {
            items: vec![
                BudgetItem {
                    id: "1".into(),
                    description: "salary".into(),
                    amount: 1000.0,
                    entry_type: EntryType::Income,
                    category: None,
                    date: date("2024-03-01"),
                },
                BudgetItem {
                    id: "2".into(),
                    description: "rent".into(),
                    amount: 400.0,
                    entry_type: EntryType::Expense,
                    category: Some("housing".into()),
                    date: date("2024-03-02"),
                },
            ],
        };
        assert_eq!(data.balance(), 600.0);
        assert!(data.check().is_ok());
    }

    #[test]
    fn unique_ids_rejects_blank_and_duplicates() {
        assert!(unique_ids("x", ["a", "b"]).is_ok());
        assert!(unique_ids("x", ["a", " "]).unwrap_err().contains("blank"));
        assert!(unique_ids("x", ["a", "a"]).unwrap_err().contains("duplicate x id 'a'"));
    }

    #[test]
    fn study_hours_are_summed_from_minutes() {
        let subject = StudySubject {
            id: "s".into(),
            name: "Rust".into(),
            target_hours: 10.0,
            sessions: vec![
                StudySession {
                    id: "a".into(),
                    date: date("2024-01-01"),
                    duration_minutes: 90,
                    notes: None,
                },
                StudySession {
                    id: "b".into(),
                    date: date("2024-01-02"),
                    duration_minutes: 30,
                    notes: None,
                },
            ],
        };
        assert_eq!(subject.hours_logged(), 2.0);
    }

    #[test]
    fn clock_parses_hours_and_minutes() {
        assert!(clock("t", "09:30").is_ok());
        assert!(clock("t", "9.30").is_err());
        assert!(clock("t", "25:00").is_err());
    }

    #[test]
    fn diet_calories_filter_by_day() {
        let meal = |id: &str, d: &str, calories| Meal {
            id: id.into(),
            name: "x".into(),
            meal_type: MealType::Lunch,
            calories,
            protein: None,
            carbs: None,
            fat: None,
            date: date(d),
        };
        let data = DietData {
            meals: vec![
                meal("1", "2024-01-01", 500),
                meal("2", "2024-01-01", 250),
                meal("3", "2024-01-02", 900),
            ],
        };
        assert_eq!(data.calories_on(date("2024-01-01")), 750);
        assert_eq!(data.latest_day(), Some(date("2024-01-02")));
        assert_eq!(DietData::default().latest_day(), None);
    }

    #[test]
    fn diet_calories_do_not_overflow() {
        let meal = |id: &str| Meal {
            id: id.into(),
            name: "x".into(),
            meal_type: MealType::Snack,
            calories: u32::MAX,
            protein: None,
            carbs: None,
            fat: None,
            date: date("2024-03-01"),
        };
        let data = DietData {
            meals: vec![meal("1"), meal("2")],
        };
        assert_eq!(data.calories_on(date("2024-03-01")), 2 * u64::from(u32::MAX));
    }
}
