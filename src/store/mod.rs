use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

use crate::schedule::{ProjectSnapshot, TaskScheduleWrite};
use crate::validation::{self, ValidationError};

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serialization(SerdeJsonError),
    Csv(csv::Error),
    InvalidData(String),
    ProjectNotFound(i32),
    TaskNotFound(i32),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "io error: {err}"),
            StoreError::Serialization(err) => write!(f, "serialization error: {err}"),
            StoreError::Csv(err) => write!(f, "csv error: {err}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StoreError::ProjectNotFound(id) => write!(f, "project {id} not found"),
            StoreError::TaskNotFound(id) => write!(f, "task {id} not found"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The engine's boundary to the surrounding CRUD layer: one consistent batch
/// read per invocation, followed by per-task writes of computed fields.
pub trait ProjectStore {
    fn load_project(&self, project_id: i32) -> StoreResult<ProjectSnapshot>;
    fn apply_task_updates(
        &mut self,
        project_id: i32,
        updates: &[TaskScheduleWrite],
    ) -> StoreResult<()>;
}

pub fn validate_snapshot(snapshot: &ProjectSnapshot) -> StoreResult<()> {
    validation::validate_snapshot(snapshot).map_err(StoreError::from)
}

/// Merge write-back records into a snapshot, persisting exactly the `Some`
/// fields of each update. Shared by the concrete stores.
pub(crate) fn apply_writes(
    snapshot: &mut ProjectSnapshot,
    updates: &[TaskScheduleWrite],
) -> StoreResult<()> {
    for update in updates {
        let task = snapshot
            .tasks
            .iter_mut()
            .find(|task| task.id == update.task_id)
            .ok_or(StoreError::TaskNotFound(update.task_id))?;
        if let Some(duration) = update.duration_days {
            task.duration_days = duration;
        }
        if let Some(computed) = update.computed_duration {
            task.computed_duration = Some(computed);
        }
        if let Some(date) = update.early_start {
            task.early_start = Some(date);
        }
        if let Some(date) = update.early_finish {
            task.early_finish = Some(date);
        }
        if let Some(date) = update.late_start {
            task.late_start = Some(date);
        }
        if let Some(date) = update.late_finish {
            task.late_finish = Some(date);
        }
        if let Some(float) = update.total_float {
            task.total_float = Some(float);
        }
        if let Some(float) = update.free_float {
            task.free_float = Some(float);
        }
        if let Some(critical) = update.is_critical {
            task.is_critical = Some(critical);
        }
        if let Some(date) = update.start_date {
            task.start_date = Some(date);
        }
        if let Some(date) = update.end_date {
            task.end_date = Some(date);
        }
        if let Some(stamp) = update.updated_at {
            task.updated_at = Some(stamp);
        }
    }
    Ok(())
}

pub mod file;
pub mod memory;

pub use file::{
    JsonFileStore, export_tasks_to_csv, import_tasks_from_csv, load_snapshot_from_json,
    save_snapshot_to_json,
};
pub use memory::MemoryStore;
