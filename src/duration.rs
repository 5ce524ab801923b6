use chrono::{Duration, NaiveDate, Utc};
use tracing::debug;

use crate::calendar::WorkCalendar;
use crate::resource::{DEFAULT_HOURS_PER_DAY, Resource, ResourceAssignment};
use crate::task::{Task, WorkMode};

const EFFORT_EPSILON: f64 = 1e-9;
// Safety valve for the day-stepping simulation; a century of calendar days.
const MAX_SIMULATED_DAYS: i64 = 36_500;

/// An assignment joined to its resource, as resolved from a project snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentWithResource<'a> {
    pub assignment: &'a ResourceAssignment,
    pub resource: &'a Resource,
}

/// Convert a task's effort estimate into a working-day duration, simulating
/// day-by-day capacity consumption per assigned resource. Always >= 1.
///
/// Completed tasks keep their stored duration. With no assignments the
/// estimate is divided by the default 8 h/day. With assignments, parallel
/// work mode takes the slowest resource and sequential mode the sum.
pub fn estimate_duration(task: &Task, assignments: &[AssignmentWithResource<'_>]) -> i64 {
    if task.is_complete() {
        return task.computed_duration.unwrap_or(task.duration_days).max(1);
    }

    let estimated = match task.estimated_hours {
        Some(hours) if hours > 0.0 => hours,
        _ => return 1,
    };

    if assignments.is_empty() {
        return (estimated / DEFAULT_HOURS_PER_DAY).ceil() as i64;
    }

    let start = task
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let even_split = estimated / assignments.len() as f64;

    let per_resource: Vec<i64> = assignments
        .iter()
        .map(|joined| {
            let effort = joined.assignment.effort_hours.unwrap_or(even_split);
            simulate_resource_days(effort, joined.assignment.allocation, joined.resource, start)
        })
        .collect();

    let combined = match task.work_mode {
        WorkMode::Parallel => per_resource.iter().copied().max().unwrap_or(1),
        WorkMode::Sequential => per_resource.iter().sum(),
    };
    let duration = combined.max(1);
    debug!(task_id = task.id, duration, "estimated task duration");
    duration
}

/// Working days one resource needs to burn down `effort_hours`, starting at
/// `start`. Non-working days advance the date without counting; working days
/// count even when the weekly budget leaves no hours available.
fn simulate_resource_days(
    effort_hours: f64,
    allocation: f64,
    resource: &Resource,
    start: NaiveDate,
) -> i64 {
    if effort_hours <= EFFORT_EPSILON {
        return 1;
    }

    let daily = resource.max_hours_per_day * allocation / 100.0;
    if daily <= EFFORT_EPSILON || resource.max_hours_per_week <= EFFORT_EPSILON {
        // Zero capacity would never converge; fall back to the flat estimate.
        return (effort_hours / DEFAULT_HOURS_PER_DAY).ceil().max(1.0) as i64;
    }

    let calendar = WorkCalendar::for_resource(Some(resource));
    let mut remaining = effort_hours;
    let mut current = start;
    let mut days = 0i64;
    let mut week_consumed = 0.0;

    while remaining > EFFORT_EPSILON {
        // Weekly budget tracks a rolling 7-calendar-day window anchored at
        // the simulation start, not ISO weeks.
        if (current - start).num_days() % 7 == 0 {
            week_consumed = 0.0;
        }
        if calendar.is_working_day(current) {
            days += 1;
            let budget = (resource.max_hours_per_week - week_consumed).max(0.0);
            let available = daily.min(budget);
            let consumed = available.min(remaining);
            remaining -= consumed;
            week_consumed += consumed;
        }
        current = current + Duration::days(1);
        if (current - start).num_days() > MAX_SIMULATED_DAYS {
            break;
        }
    }

    days.max(1)
}
