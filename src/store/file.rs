use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ProjectStore, StoreError, StoreResult, apply_writes, validate_snapshot};
use crate::schedule::{ProjectSnapshot, TaskScheduleWrite};
use crate::task::{ConstraintType, Task, WorkMode};

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> StoreResult<()> {
    validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> StoreResult<ProjectSnapshot> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// Flat CSV row for a task. Optional fields are carried as strings so an
/// empty cell round-trips to `None`.
#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: i32,
    name: String,
    wbs_code: String,
    parent_id: String,
    estimated_hours: String,
    actual_hours: String,
    progress: f64,
    start_date: String,
    end_date: String,
    duration_days: i64,
    computed_duration: String,
    early_start: String,
    early_finish: String,
    late_start: String,
    late_finish: String,
    total_float: String,
    free_float: String,
    is_critical: String,
    constraint_type: String,
    constraint_date: String,
    work_mode: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            wbs_code: task.wbs_code.clone().unwrap_or_default(),
            parent_id: format_option_i32(task.parent_id),
            estimated_hours: format_option_f64(task.estimated_hours),
            actual_hours: format_option_f64(task.actual_hours),
            progress: task.progress,
            start_date: format_date(task.start_date),
            end_date: format_date(task.end_date),
            duration_days: task.duration_days,
            computed_duration: format_option_i64(task.computed_duration),
            early_start: format_date(task.early_start),
            early_finish: format_date(task.early_finish),
            late_start: format_date(task.late_start),
            late_finish: format_date(task.late_finish),
            total_float: format_option_i64(task.total_float),
            free_float: format_option_i64(task.free_float),
            is_critical: format_option_bool(task.is_critical),
            constraint_type: task.constraint_type.as_str().to_string(),
            constraint_date: format_date(task.constraint_date),
            work_mode: match task.work_mode {
                WorkMode::Parallel => "parallel".to_string(),
                WorkMode::Sequential => "sequential".to_string(),
            },
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> StoreResult<Task> {
        let mut task = Task::new(self.id, self.name);
        task.wbs_code = parse_string_option(self.wbs_code);
        task.parent_id = parse_i32(&self.parent_id)?;
        task.estimated_hours = parse_f64(&self.estimated_hours)?;
        task.actual_hours = parse_f64(&self.actual_hours)?;
        task.progress = self.progress;
        task.start_date = parse_date(&self.start_date)?;
        task.end_date = parse_date(&self.end_date)?;
        task.duration_days = self.duration_days;
        task.computed_duration = parse_i64(&self.computed_duration)?;
        task.early_start = parse_date(&self.early_start)?;
        task.early_finish = parse_date(&self.early_finish)?;
        task.late_start = parse_date(&self.late_start)?;
        task.late_finish = parse_date(&self.late_finish)?;
        task.total_float = parse_i64(&self.total_float)?;
        task.free_float = parse_i64(&self.free_float)?;
        task.is_critical = parse_bool(&self.is_critical)?;
        task.constraint_type = ConstraintType::from_str(self.constraint_type.trim())
            .ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "invalid constraint_type '{}'",
                    self.constraint_type
                ))
            })?;
        task.constraint_date = parse_date(&self.constraint_date)?;
        task.work_mode = match self.work_mode.trim() {
            "" | "parallel" => WorkMode::Parallel,
            "sequential" => WorkMode::Sequential,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid work_mode '{other}'"
                )));
            }
        };
        Ok(task)
    }
}

pub fn export_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> StoreResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn import_tasks_from_csv<P: AsRef<Path>>(path: P) -> StoreResult<Vec<Task>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    if tasks.is_empty() {
        return Err(StoreError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }
    Ok(tasks)
}

/// File-per-project store: each project is a JSON snapshot named
/// `project_<id>.json` under one directory. Writes load, merge, and rewrite
/// the whole snapshot.
#[derive(Debug)]
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    pub fn new(directory: impl Into<PathBuf>) -> StoreResult<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    fn project_path(&self, project_id: i32) -> PathBuf {
        self.directory.join(format!("project_{project_id}.json"))
    }

    pub fn save_project(&self, project_id: i32, snapshot: &ProjectSnapshot) -> StoreResult<()> {
        save_snapshot_to_json(snapshot, self.project_path(project_id))
    }
}

impl ProjectStore for JsonFileStore {
    fn load_project(&self, project_id: i32) -> StoreResult<ProjectSnapshot> {
        let path = self.project_path(project_id);
        if !path.exists() {
            return Err(StoreError::ProjectNotFound(project_id));
        }
        load_snapshot_from_json(path)
    }

    fn apply_task_updates(
        &mut self,
        project_id: i32,
        updates: &[TaskScheduleWrite],
    ) -> StoreResult<()> {
        let mut snapshot = self.load_project(project_id)?;
        apply_writes(&mut snapshot, updates)?;
        save_snapshot_to_json(&snapshot, self.project_path(project_id))?;
        debug!(project_id, updates = updates.len(), "snapshot rewritten");
        Ok(())
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> StoreResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_f64(input: &str) -> StoreResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn format_option_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_i64(input: &str) -> StoreResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid integer '{input}': {e}")))
}

fn format_option_i32(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_i32(input: &str) -> StoreResult<Option<i32>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid integer '{input}': {e}")))
}

fn format_option_bool(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_bool(input: &str) -> StoreResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(StoreError::InvalidData(format!("invalid boolean '{other}'"))),
    }
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
