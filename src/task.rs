use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type TaskId = i32;

/// Hard scheduling rule attached to a task. `Asap`/`Alap` carry no date and
/// never conflict; the other six compare against `constraint_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    #[default]
    Asap,
    Alap,
    /// Start no earlier than
    Snet,
    /// Must start on
    Mso,
    /// Finish no earlier than
    Fnet,
    /// Must finish on
    Mfo,
    /// Start no later than
    Snlt,
    /// Finish no later than
    Fnlt,
}

impl ConstraintType {
    pub fn has_hard_date(self) -> bool {
        !matches!(self, ConstraintType::Asap | ConstraintType::Alap)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintType::Asap => "asap",
            ConstraintType::Alap => "alap",
            ConstraintType::Snet => "snet",
            ConstraintType::Mso => "mso",
            ConstraintType::Fnet => "fnet",
            ConstraintType::Mfo => "mfo",
            ConstraintType::Snlt => "snlt",
            ConstraintType::Fnlt => "fnlt",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "asap" => Some(ConstraintType::Asap),
            "alap" => Some(ConstraintType::Alap),
            "snet" => Some(ConstraintType::Snet),
            "mso" => Some(ConstraintType::Mso),
            "fnet" => Some(ConstraintType::Fnet),
            "mfo" => Some(ConstraintType::Mfo),
            "snlt" => Some(ConstraintType::Snlt),
            "fnlt" => Some(ConstraintType::Fnlt),
            _ => None,
        }
    }
}

/// How multiple assigned resources share a task's effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    /// Duration is gated by the slowest resource.
    #[default]
    Parallel,
    /// Each resource works only after the previous one finishes.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "FS" => Some(DependencyType::FinishToStart),
            "SS" => Some(DependencyType::StartToStart),
            "FF" => Some(DependencyType::FinishToFinish),
            "SF" => Some(DependencyType::StartToFinish),
            _ => None,
        }
    }
}

/// Directed dependency edge between two tasks of the same project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub predecessor_id: TaskId,
    pub successor_id: TaskId,
    pub dependency_type: DependencyType,
    /// Business-day offset; negative values are leads.
    #[serde(default)]
    pub lag_days: i64,
}

impl Dependency {
    pub fn new(predecessor_id: TaskId, successor_id: TaskId, dependency_type: DependencyType) -> Self {
        Self {
            predecessor_id,
            successor_id,
            dependency_type,
            lag_days: 0,
        }
    }

    pub fn with_lag(mut self, lag_days: i64) -> Self {
        self.lag_days = lag_days;
        self
    }
}

fn default_duration() -> i64 {
    1
}

/// A task record as supplied by the external store. The engine reads the
/// planning fields and writes back the computed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    /// Effort estimate in hours; `None` means "not estimated".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    /// 0-100. A task at 100 is historical fact and never recomputed.
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Business-day duration used by the CPM passes. Invariant: >= 1.
    #[serde(default = "default_duration")]
    pub duration_days: i64,
    /// Calendar duration from the resource simulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_finish: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_finish: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_float: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_float: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
    #[serde(default)]
    pub constraint_type: ConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_date: Option<NaiveDate>,
    #[serde(default)]
    pub work_mode: WorkMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            wbs_code: None,
            parent_id: None,
            estimated_hours: None,
            actual_hours: None,
            progress: 0.0,
            start_date: None,
            end_date: None,
            duration_days: default_duration(),
            computed_duration: None,
            early_start: None,
            early_finish: None,
            late_start: None,
            late_finish: None,
            total_float: None,
            free_float: None,
            is_critical: None,
            constraint_type: ConstraintType::default(),
            constraint_date: None,
            work_mode: WorkMode::default(),
            updated_at: None,
        }
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}
