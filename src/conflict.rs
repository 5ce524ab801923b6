use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{ConstraintType, Task};

/// Result of comparing computed dates against a task's hard constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflict: bool,
    /// Whole days by which the computed date overshoots the constraint.
    pub conflict_days: i64,
    pub message: String,
}

impl ConflictReport {
    fn none() -> Self {
        Self {
            has_conflict: false,
            conflict_days: 0,
            message: "no constraint conflict".to_string(),
        }
    }

    fn late(task: &Task, days: i64, which: &str, constraint_date: NaiveDate) -> Self {
        Self {
            has_conflict: true,
            conflict_days: days,
            message: format!(
                "task '{}' {which} {days} day(s) after its {} constraint ({constraint_date})",
                task.name,
                task.constraint_type.as_str()
            ),
        }
    }
}

/// Compare the computed end date (and stored start date) against the task's
/// constraint. `asap`/`alap` carry no hard date and never conflict. Never
/// fails; insufficient input yields a structured no-conflict report.
pub fn detect_constraint_conflict(task: &Task, computed_end_date: NaiveDate) -> ConflictReport {
    let Some(constraint_date) = task.constraint_date else {
        return ConflictReport::none();
    };

    match task.constraint_type {
        ConstraintType::Mfo | ConstraintType::Fnlt => {
            if computed_end_date > constraint_date {
                let days = (computed_end_date - constraint_date).num_days();
                ConflictReport::late(task, days, "finishes", constraint_date)
            } else {
                ConflictReport::none()
            }
        }
        ConstraintType::Mso | ConstraintType::Snlt => match task.start_date {
            Some(start) if start > constraint_date => {
                let days = (start - constraint_date).num_days();
                ConflictReport::late(task, days, "starts", constraint_date)
            }
            _ => ConflictReport::none(),
        },
        ConstraintType::Asap
        | ConstraintType::Alap
        | ConstraintType::Snet
        | ConstraintType::Fnet => ConflictReport::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn asap_never_conflicts() {
        let mut task = Task::new(1, "A");
        task.constraint_date = Some(d(2024, 1, 1));
        let report = detect_constraint_conflict(&task, d(2024, 3, 1));
        assert!(!report.has_conflict);
    }

    #[test]
    fn finish_no_later_than_overshoot_is_reported_in_days() {
        let mut task = Task::new(1, "A");
        task.constraint_type = ConstraintType::Fnlt;
        task.constraint_date = Some(d(2024, 1, 10));
        let report = detect_constraint_conflict(&task, d(2024, 1, 15));
        assert!(report.has_conflict);
        assert_eq!(report.conflict_days, 5);
    }

    #[test]
    fn must_start_on_checks_the_start_date() {
        let mut task = Task::new(1, "A");
        task.constraint_type = ConstraintType::Mso;
        task.constraint_date = Some(d(2024, 1, 8));
        task.start_date = Some(d(2024, 1, 10));
        let report = detect_constraint_conflict(&task, d(2024, 1, 20));
        assert!(report.has_conflict);
        assert_eq!(report.conflict_days, 2);
    }
}
