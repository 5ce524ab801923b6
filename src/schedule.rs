use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::float_analysis;
use crate::calculations::forward_pass::ForwardPass;
use crate::duration::{AssignmentWithResource, estimate_duration};
use crate::graph::schedule_dag::{CycleError, ScheduleDag};
use crate::propagation;
use crate::resource::{Resource, ResourceAssignment, ResourceId};
use crate::store::{ProjectStore, StoreError};
use crate::task::{ConstraintType, Dependency, DependencyType, Task, TaskId, WorkMode};

/// One consistent batch read of a project: everything the engine needs to
/// compute a schedule, with no reference back into the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub assignments: Vec<ResourceAssignment>,
}

impl ProjectSnapshot {
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn resource(&self, resource_id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == resource_id)
    }

    pub fn assignments_for(&self, task_id: TaskId) -> Vec<&ResourceAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.task_id == task_id)
            .collect()
    }

    /// Assignments for a task joined to their resources. Assignments whose
    /// resource record is missing are dropped, mirroring how dangling
    /// dependencies are skipped.
    pub fn resolved_assignments(&self, task_id: TaskId) -> Vec<AssignmentWithResource<'_>> {
        self.assignments
            .iter()
            .filter(|a| a.task_id == task_id)
            .filter_map(|assignment| {
                self.resource(assignment.resource_id)
                    .map(|resource| AssignmentWithResource {
                        assignment,
                        resource,
                    })
            })
            .collect()
    }
}

/// A resolved dependency edge as seen from one of its two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyLink {
    pub task_id: TaskId,
    pub dependency_type: DependencyType,
    pub lag_days: i64,
}

/// Ephemeral computed view of one task: the record joined with its resolved
/// edges, working duration, and CPM outputs. Built fresh per run and
/// discarded after results are written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: TaskId,
    pub name: String,
    pub wbs_code: Option<String>,
    pub duration: i64,
    pub computed_duration: Option<i64>,
    pub progress: f64,
    pub work_mode: WorkMode,
    pub constraint_type: ConstraintType,
    pub constraint_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub early_start: Option<NaiveDate>,
    pub early_finish: Option<NaiveDate>,
    pub late_start: Option<NaiveDate>,
    pub late_finish: Option<NaiveDate>,
    pub total_float: Option<i64>,
    pub free_float: Option<i64>,
    pub is_critical: bool,
    pub predecessors: Vec<DependencyLink>,
    pub successors: Vec<DependencyLink>,
}

impl ScheduleTask {
    fn fresh(task: &Task, duration: i64) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            wbs_code: task.wbs_code.clone(),
            duration,
            computed_duration: task.computed_duration,
            progress: task.progress,
            work_mode: task.work_mode,
            constraint_type: task.constraint_type,
            constraint_date: task.constraint_date,
            start_date: task.start_date,
            end_date: task.end_date,
            early_start: None,
            early_finish: None,
            late_start: None,
            late_finish: None,
            total_float: None,
            free_float: None,
            is_critical: false,
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    fn stored(task: &Task) -> Self {
        Self {
            early_start: task.early_start,
            early_finish: task.early_finish,
            late_start: task.late_start,
            late_finish: task.late_finish,
            total_float: task.total_float,
            free_float: task.free_float,
            is_critical: task.is_critical.unwrap_or(false),
            ..Self::fresh(task, task.duration_days.max(1))
        }
    }
}

/// Result of one pure schedule computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub tasks: Vec<ScheduleTask>,
    pub project_start_date: NaiveDate,
    pub project_end_date: Option<NaiveDate>,
    pub critical_tasks: Vec<TaskId>,
    pub critical_path_length: i64,
}

/// Per-task write-back record. A store persists exactly the `Some` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskScheduleWrite {
    pub task_id: TaskId,
    pub duration_days: Option<i64>,
    pub computed_duration: Option<i64>,
    pub early_start: Option<NaiveDate>,
    pub early_finish: Option<NaiveDate>,
    pub late_start: Option<NaiveDate>,
    pub late_finish: Option<NaiveDate>,
    pub total_float: Option<i64>,
    pub free_float: Option<i64>,
    pub is_critical: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TaskScheduleWrite {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            ..Self::default()
        }
    }
}

/// Outcome of a full `run_schedule` invocation. Never an `Err`: failures are
/// reported through `success`/`message` so callers check the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunScheduleOutcome {
    pub success: bool,
    pub message: String,
    pub tasks_updated: usize,
    pub critical_path_length: i64,
    pub project_end_date: Option<NaiveDate>,
    pub critical_tasks: Vec<TaskId>,
}

impl RunScheduleOutcome {
    fn no_tasks() -> Self {
        Self {
            success: true,
            message: "no tasks to schedule".to_string(),
            tasks_updated: 0,
            critical_path_length: 0,
            project_end_date: None,
            critical_tasks: Vec::new(),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            tasks_updated: 0,
            critical_path_length: 0,
            project_end_date: None,
            critical_tasks: Vec::new(),
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("success={}", self.success));
        parts.push(format!("tasks={}", self.tasks_updated));
        parts.push(format!("critical_len={}", self.critical_path_length));
        if let Some(date) = self.project_end_date {
            parts.push(format!("finish={date}"));
        }
        if !self.critical_tasks.is_empty() {
            let chain = self
                .critical_tasks
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            parts.push(format!("crit_path={chain}"));
        }
        parts.join(", ")
    }
}

#[derive(Debug)]
pub enum ScheduleError {
    Cycle(CycleError),
    Store(StoreError),
    TaskNotFound(TaskId),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Cycle(err) => write!(f, "{err}"),
            ScheduleError::Store(err) => write!(f, "store error: {err}"),
            ScheduleError::TaskNotFound(id) => write!(f, "task {id} not found"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<CycleError> for ScheduleError {
    fn from(value: CycleError) -> Self {
        Self::Cycle(value)
    }
}

impl From<StoreError> for ScheduleError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Build the fresh ScheduleTask map for a run: stored planning fields, a
/// duration from the estimate (no assignment resolution at this level), and
/// resolved edges in both directions. Dependencies with missing endpoints
/// are skipped.
pub(crate) fn build_schedule_tasks(snapshot: &ProjectSnapshot) -> HashMap<TaskId, ScheduleTask> {
    let mut tasks: HashMap<TaskId, ScheduleTask> = snapshot
        .tasks
        .iter()
        .map(|task| (task.id, ScheduleTask::fresh(task, estimate_duration(task, &[]))))
        .collect();
    link_dependencies(&mut tasks, &snapshot.dependencies);
    tasks
}

fn link_dependencies(tasks: &mut HashMap<TaskId, ScheduleTask>, dependencies: &[Dependency]) {
    for dependency in dependencies {
        if !tasks.contains_key(&dependency.predecessor_id)
            || !tasks.contains_key(&dependency.successor_id)
        {
            continue;
        }
        if let Some(successor) = tasks.get_mut(&dependency.successor_id) {
            successor.predecessors.push(DependencyLink {
                task_id: dependency.predecessor_id,
                dependency_type: dependency.dependency_type,
                lag_days: dependency.lag_days,
            });
        }
        if let Some(predecessor) = tasks.get_mut(&dependency.predecessor_id) {
            predecessor.successors.push(DependencyLink {
                task_id: dependency.successor_id,
                dependency_type: dependency.dependency_type,
                lag_days: dependency.lag_days,
            });
        }
    }
}

/// Pure two-pass CPM over a project snapshot. The project start falls back
/// to the earliest stored task start, then to today.
pub fn compute_schedule(
    snapshot: &ProjectSnapshot,
    project_start: Option<NaiveDate>,
) -> Result<ScheduleResult, ScheduleError> {
    let project_start_date = project_start
        .or_else(|| snapshot.tasks.iter().filter_map(|t| t.start_date).min())
        .unwrap_or_else(|| Utc::now().date_naive());

    let mut tasks = build_schedule_tasks(snapshot);
    if tasks.is_empty() {
        return Ok(ScheduleResult {
            tasks: Vec::new(),
            project_start_date,
            project_end_date: None,
            critical_tasks: Vec::new(),
            critical_path_length: 0,
        });
    }

    let dag = ScheduleDag::build(&snapshot.tasks, &snapshot.dependencies);
    let order = dag.topological_order()?;

    let forward = ForwardPass::new(&tasks, &order).execute(project_start_date);
    for (task_id, (early_start, early_finish)) in &forward {
        if let Some(task) = tasks.get_mut(task_id) {
            task.early_start = Some(*early_start);
            task.early_finish = Some(*early_finish);
        }
    }

    let project_end_date = forward.values().map(|&(_, ef)| ef).max();
    let backward = BackwardPass::new(&tasks, &order)
        .execute(project_end_date.unwrap_or(project_start_date));
    for (task_id, (late_start, late_finish)) in &backward {
        if let Some(task) = tasks.get_mut(task_id) {
            task.late_start = Some(*late_start);
            task.late_finish = Some(*late_finish);
        }
    }

    let summary = float_analysis::analyze(&mut tasks);
    debug!(
        tasks = tasks.len(),
        critical = summary.critical_tasks.len(),
        "schedule computed"
    );

    let ordered = snapshot
        .tasks
        .iter()
        .filter_map(|task| tasks.remove(&task.id))
        .collect();

    Ok(ScheduleResult {
        tasks: ordered,
        project_start_date,
        project_end_date,
        critical_tasks: summary.critical_tasks,
        critical_path_length: summary.critical_path_length,
    })
}

/// Read-only projection of the stored schedule fields with resolved edges.
/// No recomputation happens here.
pub fn schedule_view(snapshot: &ProjectSnapshot) -> Vec<ScheduleTask> {
    let mut tasks: HashMap<TaskId, ScheduleTask> = snapshot
        .tasks
        .iter()
        .map(|task| (task.id, ScheduleTask::stored(task)))
        .collect();
    link_dependencies(&mut tasks, &snapshot.dependencies);
    snapshot
        .tasks
        .iter()
        .filter_map(|task| tasks.remove(&task.id))
        .collect()
}

/// Store-facing orchestrator: loads snapshots, runs the pure computations,
/// and writes computed fields back through the store.
pub struct ScheduleEngine<S: ProjectStore> {
    store: S,
}

impl<S: ProjectStore> ScheduleEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Full recompute of every task in a project. Failures never propagate;
    /// callers check `success` on the outcome.
    pub fn run_schedule(
        &mut self,
        project_id: i32,
        project_start: Option<NaiveDate>,
    ) -> RunScheduleOutcome {
        match self.run_schedule_inner(project_id, project_start) {
            Ok(outcome) => outcome,
            Err(err) => RunScheduleOutcome::failure(err.to_string()),
        }
    }

    fn run_schedule_inner(
        &mut self,
        project_id: i32,
        project_start: Option<NaiveDate>,
    ) -> Result<RunScheduleOutcome, ScheduleError> {
        let snapshot = self.store.load_project(project_id)?;
        if snapshot.tasks.is_empty() {
            return Ok(RunScheduleOutcome::no_tasks());
        }

        let result = compute_schedule(&snapshot, project_start)?;
        let now = Utc::now().naive_utc();
        let writes: Vec<TaskScheduleWrite> = result
            .tasks
            .iter()
            .map(|task| {
                let mut write = TaskScheduleWrite::new(task.id);
                write.early_start = task.early_start;
                write.early_finish = task.early_finish;
                write.late_start = task.late_start;
                write.late_finish = task.late_finish;
                write.total_float = task.total_float;
                write.free_float = task.free_float;
                write.is_critical = Some(task.is_critical);
                write.updated_at = Some(now);
                // Completed tasks keep their historical duration and dates.
                if task.progress < 100.0 {
                    write.duration_days = Some(task.duration);
                    write.start_date = task.early_start;
                    write.end_date = task.early_finish;
                }
                write
            })
            .collect();
        self.store.apply_task_updates(project_id, &writes)?;

        info!(
            project_id,
            tasks_updated = writes.len(),
            critical = result.critical_tasks.len(),
            "schedule run complete"
        );

        Ok(RunScheduleOutcome {
            success: true,
            message: format!("scheduled {} task(s)", writes.len()),
            tasks_updated: writes.len(),
            critical_path_length: result.critical_path_length,
            project_end_date: result.project_end_date,
            critical_tasks: result.critical_tasks,
        })
    }

    /// Incremental recompute of one changed task and its downstream
    /// subgraph.
    pub fn propagate_dates(
        &mut self,
        project_id: i32,
        changed_task_id: TaskId,
    ) -> Result<(), ScheduleError> {
        let snapshot = self.store.load_project(project_id)?;
        let writes = propagation::propagate_dates(&snapshot, changed_task_id)?;
        if !writes.is_empty() {
            self.store.apply_task_updates(project_id, &writes)?;
        }
        info!(
            project_id,
            changed_task_id,
            writes = writes.len(),
            "propagation complete"
        );
        Ok(())
    }

    /// Current stored schedule fields with resolved edges, for display.
    pub fn get_schedule_data(&self, project_id: i32) -> Result<Vec<ScheduleTask>, ScheduleError> {
        let snapshot = self.store.load_project(project_id)?;
        Ok(schedule_view(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_summary_includes_critical_chain() {
        let outcome = RunScheduleOutcome {
            success: true,
            message: "scheduled 3 task(s)".to_string(),
            tasks_updated: 3,
            critical_path_length: 5,
            project_end_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            critical_tasks: vec![1, 3],
        };
        let summary = outcome.to_cli_summary();
        assert!(summary.contains("tasks=3"));
        assert!(summary.contains("finish=2024-01-05"));
        assert!(summary.contains("crit_path=1->3"));
    }

    #[test]
    fn failure_outcome_carries_message() {
        let outcome = RunScheduleOutcome::failure("boom".to_string());
        assert!(!outcome.success);
        assert_eq!(outcome.message, "boom");
        assert_eq!(outcome.tasks_updated, 0);
    }
}
