use chrono::NaiveDate;
use std::collections::HashMap;

use crate::calendar::business_days_between;
use crate::task::TaskId;

use crate::schedule::ScheduleTask;

/// Derived critical-path view of a computed schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatSummary {
    /// Zero-float task ids ordered by early start, then id.
    pub critical_tasks: Vec<TaskId>,
    /// Sum of durations of all zero-float tasks. This is deliberately not
    /// the length of a single longest chain; disjoint critical chains all
    /// contribute.
    pub critical_path_length: i64,
}

/// Fill total float, free float, and the critical flag on every task from
/// the forward/backward results already stored on them.
pub fn analyze(tasks: &mut HashMap<TaskId, ScheduleTask>) -> FloatSummary {
    let early_starts: HashMap<TaskId, NaiveDate> = tasks
        .iter()
        .filter_map(|(&id, task)| task.early_start.map(|es| (id, es)))
        .collect();

    let ids: Vec<TaskId> = tasks.keys().copied().collect();
    for id in ids {
        let (total_float, free_float) = {
            let task = &tasks[&id];
            let total = match (task.early_finish, task.late_finish) {
                (Some(ef), Some(lf)) => Some(business_days_between(ef, lf)),
                _ => None,
            };
            let free = match task.early_finish {
                Some(ef) => {
                    let min_successor_start = task
                        .successors
                        .iter()
                        .filter_map(|link| early_starts.get(&link.task_id))
                        .min()
                        .copied();
                    match min_successor_start {
                        Some(es) => Some(business_days_between(ef, es)),
                        None => total,
                    }
                }
                None => None,
            };
            (total, free)
        };
        if let Some(task) = tasks.get_mut(&id) {
            task.total_float = total_float;
            task.free_float = free_float;
            task.is_critical = total_float == Some(0);
        }
    }

    let mut critical: Vec<(NaiveDate, TaskId, i64)> = tasks
        .values()
        .filter(|task| task.is_critical)
        .map(|task| {
            (
                task.early_start.unwrap_or(NaiveDate::MIN),
                task.id,
                task.duration.max(1),
            )
        })
        .collect();
    critical.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let critical_path_length = critical.iter().map(|(_, _, duration)| duration).sum();
    let critical_tasks = critical.into_iter().map(|(_, id, _)| id).collect();

    FloatSummary {
        critical_tasks,
        critical_path_length,
    }
}
