use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

pub type ResourceId = i32;

pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
pub const DEFAULT_HOURS_PER_WEEK: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionKind {
    #[default]
    Holiday,
    Leave,
    Other,
}

/// A single non-working date in a resource calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarException {
    pub date: NaiveDate,
    #[serde(default)]
    pub kind: ExceptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CalendarException {
    pub fn new(date: NaiveDate, kind: ExceptionKind) -> Self {
        Self {
            date,
            kind,
            note: None,
        }
    }
}

/// A person, crew, or piece of equipment with its own calendar and capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<Weekday>,
    #[serde(default)]
    pub calendar_exceptions: Vec<CalendarException>,
    #[serde(default = "default_hours_per_day")]
    pub max_hours_per_day: f64,
    #[serde(default = "default_hours_per_week")]
    pub max_hours_per_week: f64,
}

fn default_working_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

fn default_hours_per_day() -> f64 {
    DEFAULT_HOURS_PER_DAY
}

fn default_hours_per_week() -> f64 {
    DEFAULT_HOURS_PER_WEEK
}

impl Resource {
    pub fn new(id: ResourceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            working_days: default_working_days(),
            calendar_exceptions: Vec::new(),
            max_hours_per_day: DEFAULT_HOURS_PER_DAY,
            max_hours_per_week: DEFAULT_HOURS_PER_WEEK,
        }
    }
}

/// Links a resource to a task at an allocation percentage (1-200).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAssignment {
    pub task_id: TaskId,
    pub resource_id: ResourceId,
    /// Percent of the resource's daily capacity, 1-200.
    pub allocation: f64,
    /// Explicit effort for this assignment; `None` means an even split of
    /// the task's estimate across all of its assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_hours: Option<f64>,
}

impl ResourceAssignment {
    pub fn new(task_id: TaskId, resource_id: ResourceId, allocation: f64) -> Self {
        Self {
            task_id,
            resource_id,
            allocation,
            effort_hours: None,
        }
    }
}
