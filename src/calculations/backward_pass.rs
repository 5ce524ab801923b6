use chrono::NaiveDate;
use std::collections::HashMap;

use crate::calendar::{add_business_days, subtract_business_days};
use crate::schedule::ScheduleTask;
use crate::task::{ConstraintType, DependencyType, TaskId};

/// Computes late start/finish for every task, walking the reverse
/// topological order and taking the minimum constrained candidate over all
/// successor edges.
pub struct BackwardPass<'a> {
    tasks: &'a HashMap<TaskId, ScheduleTask>,
    order: &'a [TaskId],
}

impl<'a> BackwardPass<'a> {
    pub fn new(tasks: &'a HashMap<TaskId, ScheduleTask>, order: &'a [TaskId]) -> Self {
        Self { tasks, order }
    }

    pub fn execute(&self, project_end: NaiveDate) -> HashMap<TaskId, (NaiveDate, NaiveDate)> {
        let mut results: HashMap<TaskId, (NaiveDate, NaiveDate)> = HashMap::new();

        for &task_id in self.order.iter().rev() {
            let Some(task) = self.tasks.get(&task_id) else {
                continue;
            };
            let duration = task.duration.max(1);

            let mut late_finish: Option<NaiveDate> = None;
            for link in &task.successors {
                if let Some(&(succ_ls, succ_lf)) = results.get(&link.task_id) {
                    let candidate = finish_candidate(
                        succ_ls,
                        succ_lf,
                        link.dependency_type,
                        link.lag_days,
                        duration,
                    );
                    late_finish = Some(match late_finish {
                        Some(current) if current <= candidate => current,
                        _ => candidate,
                    });
                }
            }

            let mut late_finish = late_finish.unwrap_or(project_end);
            late_finish =
                apply_finish_constraint(late_finish, task.constraint_type, task.constraint_date);

            let late_start = if duration <= 1 {
                late_finish
            } else {
                subtract_business_days(late_finish, duration - 1)
            };
            results.insert(task_id, (late_start, late_finish));
        }

        results
    }
}

/// Latest finish this task may take given one successor edge.
fn finish_candidate(
    succ_late_start: NaiveDate,
    succ_late_finish: NaiveDate,
    dependency_type: DependencyType,
    lag_days: i64,
    duration: i64,
) -> NaiveDate {
    match dependency_type {
        DependencyType::FinishToStart => subtract_business_days(succ_late_start, 1 + lag_days),
        DependencyType::StartToStart => {
            add_business_days(subtract_business_days(succ_late_start, lag_days), duration)
        }
        DependencyType::FinishToFinish => subtract_business_days(succ_late_finish, lag_days),
        DependencyType::StartToFinish => {
            add_business_days(succ_late_start, duration - 1 - lag_days)
        }
    }
}

fn apply_finish_constraint(
    late_finish: NaiveDate,
    constraint_type: ConstraintType,
    constraint_date: Option<NaiveDate>,
) -> NaiveDate {
    match (constraint_type, constraint_date) {
        (ConstraintType::Fnet, Some(date)) => late_finish.max(date),
        (ConstraintType::Mfo, Some(date)) => date,
        _ => late_finish,
    }
}
