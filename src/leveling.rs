use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::WorkCalendar;
use crate::duration::{AssignmentWithResource, estimate_duration};
use crate::resource::{Resource, ResourceAssignment};
use crate::task::Task;

const MAX_ALLOCATION: f64 = 200.0;
const MAX_DAILY_HOURS: f64 = 12.0;
const DAILY_HOURS_STEP: f64 = 2.0;

/// How disruptive a remediation is, from routine to a hard sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feasibility {
    High,
    Medium,
    Low,
}

/// One ranked remediation option with a preview of its effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelingSuggestion {
    pub description: String,
    pub feasibility: Feasibility,
    /// Duration the task would take with the change applied.
    pub preview_duration: Option<i64>,
    pub preview_end_date: Option<NaiveDate>,
}

/// Heuristic "how do I hit this date" options for a task in constraint
/// conflict: raise allocations, add parallel capacity, or raise the daily
/// hour cap. Each preview re-runs the duration simulation with the
/// hypothetical change. Never fails; with no assignments the only option is
/// to assign resources first.
pub fn suggest_resource_leveling(
    task: &Task,
    assignments: &[AssignmentWithResource<'_>],
    conflict_days: i64,
    constraint_date: Option<NaiveDate>,
) -> Vec<LevelingSuggestion> {
    if assignments.is_empty() {
        return vec![LevelingSuggestion {
            description: "No resources assigned; assign at least one resource before leveling."
                .to_string(),
            feasibility: Feasibility::Low,
            preview_duration: None,
            preview_end_date: None,
        }];
    }

    let target = constraint_date
        .map(|date| {
            format!(
                " to meet the {} constraint ({date})",
                task.constraint_type.as_str()
            )
        })
        .unwrap_or_default();
    // Roughly ten allocation points per day of conflict.
    let allocation_bump = (conflict_days.max(1) as f64 * 10.0).min(100.0);

    let baseline: Vec<(ResourceAssignment, Resource)> = assignments
        .iter()
        .map(|joined| (joined.assignment.clone(), joined.resource.clone()))
        .collect();

    let mut suggestions = Vec::new();

    for (index, joined) in assignments.iter().enumerate() {
        let current = joined.assignment.allocation;
        let raised = (current + allocation_bump).min(MAX_ALLOCATION);
        if raised <= current {
            continue;
        }
        let mut hypothetical = baseline.clone();
        hypothetical[index].0.allocation = raised;
        let (duration, end) = preview(task, &hypothetical);
        suggestions.push(LevelingSuggestion {
            description: format!(
                "Raise {} allocation from {:.0}% to {:.0}%{target}",
                joined.resource.name, current, raised
            ),
            feasibility: if raised <= 100.0 {
                Feasibility::High
            } else if raised <= 150.0 {
                Feasibility::Medium
            } else {
                Feasibility::Low
            },
            preview_duration: Some(duration),
            preview_end_date: end,
        });
    }

    if let Some(first) = assignments.first() {
        let mut hypothetical = baseline.clone();
        let mut duplicate = first.assignment.clone();
        // The duplicate shares the even effort split rather than doubling an
        // explicit effort figure.
        duplicate.effort_hours = None;
        hypothetical.push((duplicate, first.resource.clone()));
        let (duration, end) = preview(task, &hypothetical);
        suggestions.push(LevelingSuggestion {
            description: format!(
                "Add another resource like {} to work in parallel{target}",
                first.resource.name
            ),
            feasibility: Feasibility::Medium,
            preview_duration: Some(duration),
            preview_end_date: end,
        });
    }

    let raisable = baseline
        .iter()
        .any(|(_, resource)| resource.max_hours_per_day < MAX_DAILY_HOURS);
    if raisable {
        let mut hypothetical = baseline.clone();
        let mut max_raised: f64 = 0.0;
        for (_, resource) in &mut hypothetical {
            let raised = (resource.max_hours_per_day + DAILY_HOURS_STEP).min(MAX_DAILY_HOURS);
            max_raised = max_raised.max(raised);
            resource.max_hours_per_day = raised;
        }
        let (duration, end) = preview(task, &hypothetical);
        suggestions.push(LevelingSuggestion {
            description: format!(
                "Raise the daily hour cap by {DAILY_HOURS_STEP:.0}h (to at most {max_raised:.0}h){target}"
            ),
            feasibility: if max_raised <= 10.0 {
                Feasibility::High
            } else {
                Feasibility::Medium
            },
            preview_duration: Some(duration),
            preview_end_date: end,
        });
    }

    suggestions.sort_by(|a, b| {
        a.feasibility.cmp(&b.feasibility).then_with(|| {
            a.preview_duration
                .unwrap_or(i64::MAX)
                .cmp(&b.preview_duration.unwrap_or(i64::MAX))
        })
    });
    suggestions
}

fn preview(
    task: &Task,
    hypothetical: &[(ResourceAssignment, Resource)],
) -> (i64, Option<NaiveDate>) {
    let joined: Vec<AssignmentWithResource<'_>> = hypothetical
        .iter()
        .map(|(assignment, resource)| AssignmentWithResource {
            assignment,
            resource,
        })
        .collect();
    let duration = estimate_duration(task, &joined);
    let start = task
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let calendar = WorkCalendar::for_resource(hypothetical.first().map(|(_, r)| r));
    (duration, Some(calendar.add_working_days(start, duration)))
}
