use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use crate::calculations::dependency_start_candidate;
use crate::calendar::WorkCalendar;
use crate::duration::estimate_duration;
use crate::schedule::{ProjectSnapshot, ScheduleError, TaskScheduleWrite};
use crate::task::{Dependency, DependencyType, Task, TaskId};

/// Incremental recomputation after one task changed: rewrite its simulated
/// duration and end date, then walk only the downstream subgraph advancing
/// successor start dates. Start dates only ever move forward; a candidate
/// earlier than the stored start is ignored. Each task is processed at most
/// once per call.
pub fn propagate_dates(
    snapshot: &ProjectSnapshot,
    changed_task_id: TaskId,
) -> Result<Vec<TaskScheduleWrite>, ScheduleError> {
    let mut tasks: HashMap<TaskId, Task> = snapshot
        .tasks
        .iter()
        .map(|task| (task.id, task.clone()))
        .collect();
    if !tasks.contains_key(&changed_task_id) {
        return Err(ScheduleError::TaskNotFound(changed_task_id));
    }

    let mut successors: HashMap<TaskId, Vec<&Dependency>> = HashMap::new();
    for dependency in &snapshot.dependencies {
        if tasks.contains_key(&dependency.predecessor_id)
            && tasks.contains_key(&dependency.successor_id)
        {
            successors
                .entry(dependency.predecessor_id)
                .or_default()
                .push(dependency);
        }
    }

    let now = Utc::now().naive_utc();
    let today = Utc::now().date_naive();
    let mut writes: Vec<TaskScheduleWrite> = Vec::new();
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut queue: VecDeque<TaskId> = VecDeque::from([changed_task_id]);

    while let Some(task_id) = queue.pop_front() {
        if !visited.insert(task_id) {
            continue;
        }
        let outgoing = successors.get(&task_id).cloned().unwrap_or_default();

        // The duration simulation and the stepped end date share one start
        // anchor, so pin a missing start_date before estimating.
        if let Some(task) = tasks.get_mut(&task_id) {
            if !task.is_complete() && task.start_date.is_none() {
                task.start_date = Some(task.early_start.unwrap_or(today));
            }
        }

        let (start, end, duration) = {
            let task = &tasks[&task_id];
            if task.is_complete() {
                // Historical fact; leave it alone but keep walking.
                for dependency in &outgoing {
                    queue.push_back(dependency.successor_id);
                }
                continue;
            }

            let resolved = snapshot.resolved_assignments(task_id);
            let duration = estimate_duration(task, &resolved);
            let start = task.start_date.unwrap_or(today);
            let calendar = WorkCalendar::for_resource(resolved.first().map(|j| j.resource));
            let end = calendar.add_working_days(start, duration);

            let mut write = TaskScheduleWrite::new(task_id);
            write.computed_duration = Some(duration);
            write.end_date = Some(end);
            write.updated_at = Some(now);
            writes.push(write);
            debug!(task_id, duration, %end, "propagated task recomputed");
            (start, end, duration)
        };
        if let Some(task) = tasks.get_mut(&task_id) {
            task.start_date = Some(start);
            task.end_date = Some(end);
            task.computed_duration = Some(duration);
        }

        for dependency in outgoing {
            let successor_id = dependency.successor_id;
            let successor_duration = match dependency.dependency_type {
                DependencyType::FinishToFinish | DependencyType::StartToFinish => {
                    estimate_duration(
                        &tasks[&successor_id],
                        &snapshot.resolved_assignments(successor_id),
                    )
                }
                _ => 1,
            };
            let candidate = dependency_start_candidate(
                start,
                end,
                dependency.dependency_type,
                dependency.lag_days,
                successor_duration,
            );

            let Some(successor) = tasks.get_mut(&successor_id) else {
                continue;
            };
            let advances = match successor.start_date {
                Some(current) => candidate > current,
                None => true,
            };
            if advances {
                successor.start_date = Some(candidate);
                let mut write = TaskScheduleWrite::new(successor_id);
                write.start_date = Some(candidate);
                write.updated_at = Some(now);
                writes.push(write);
                if !visited.contains(&successor_id) {
                    queue.push_back(successor_id);
                }
            }
        }
    }

    Ok(writes)
}
