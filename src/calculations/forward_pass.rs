use chrono::NaiveDate;
use std::collections::HashMap;

use super::dependency_start_candidate;
use crate::calendar::add_business_days;
use crate::schedule::ScheduleTask;
use crate::task::{ConstraintType, TaskId};

/// Computes early start/finish for every task, walking the topological order
/// and taking the maximum constrained candidate over all predecessor edges.
pub struct ForwardPass<'a> {
    tasks: &'a HashMap<TaskId, ScheduleTask>,
    order: &'a [TaskId],
}

impl<'a> ForwardPass<'a> {
    pub fn new(tasks: &'a HashMap<TaskId, ScheduleTask>, order: &'a [TaskId]) -> Self {
        Self { tasks, order }
    }

    pub fn execute(&self, project_start: NaiveDate) -> HashMap<TaskId, (NaiveDate, NaiveDate)> {
        let mut results: HashMap<TaskId, (NaiveDate, NaiveDate)> = HashMap::new();

        for &task_id in self.order {
            let Some(task) = self.tasks.get(&task_id) else {
                continue;
            };
            let duration = task.duration.max(1);

            let mut early_start: Option<NaiveDate> = None;
            for link in &task.predecessors {
                // Predecessors always precede in topological order; an absent
                // entry means the edge referenced a task outside the run.
                if let Some(&(pred_es, pred_ef)) = results.get(&link.task_id) {
                    let candidate = dependency_start_candidate(
                        pred_es,
                        pred_ef,
                        link.dependency_type,
                        link.lag_days,
                        duration,
                    );
                    early_start = Some(match early_start {
                        Some(current) if current >= candidate => current,
                        _ => candidate,
                    });
                }
            }

            let mut early_start = early_start.unwrap_or(project_start);
            early_start =
                apply_start_constraint(early_start, task.constraint_type, task.constraint_date);

            let early_finish = if duration <= 1 {
                early_start
            } else {
                add_business_days(early_start, duration - 1)
            };
            results.insert(task_id, (early_start, early_finish));
        }

        results
    }
}

fn apply_start_constraint(
    early_start: NaiveDate,
    constraint_type: ConstraintType,
    constraint_date: Option<NaiveDate>,
) -> NaiveDate {
    match (constraint_type, constraint_date) {
        (ConstraintType::Snet, Some(date)) => early_start.max(date),
        (ConstraintType::Mso, Some(date)) => date,
        _ => early_start,
    }
}
