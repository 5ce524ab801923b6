use std::collections::HashSet;
use std::fmt;

use crate::resource::{Resource, ResourceAssignment};
use crate::schedule::ProjectSnapshot;
use crate::task::Task;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.duration_days < 1 {
        return Err(ValidationError::new(format!(
            "task {} has duration {} (must be at least 1 business day)",
            task.id, task.duration_days
        )));
    }

    if !task.progress.is_finite() || task.progress < -EPSILON || task.progress > 100.0 + EPSILON {
        return Err(ValidationError::new(format!(
            "task {} has invalid progress {} (must be between 0 and 100)",
            task.id, task.progress
        )));
    }

    for (label, hours) in [
        ("estimated_hours", task.estimated_hours),
        ("actual_hours", task.actual_hours),
    ] {
        if let Some(hours) = hours {
            if !hours.is_finite() || hours < -EPSILON {
                return Err(ValidationError::new(format!(
                    "task {} has invalid {} {}",
                    task.id, label, hours
                )));
            }
        }
    }

    if task.constraint_type.has_hard_date() && task.constraint_date.is_none() {
        return Err(ValidationError::new(format!(
            "task {} has constraint type '{}' but no constraint date",
            task.id,
            task.constraint_type.as_str()
        )));
    }

    Ok(())
}

pub fn validate_resource(resource: &Resource) -> Result<(), ValidationError> {
    if !resource.max_hours_per_day.is_finite() || resource.max_hours_per_day <= 0.0 {
        return Err(ValidationError::new(format!(
            "resource {} has invalid max_hours_per_day {}",
            resource.id, resource.max_hours_per_day
        )));
    }
    if !resource.max_hours_per_week.is_finite() || resource.max_hours_per_week <= 0.0 {
        return Err(ValidationError::new(format!(
            "resource {} has invalid max_hours_per_week {}",
            resource.id, resource.max_hours_per_week
        )));
    }
    Ok(())
}

pub fn validate_assignment(assignment: &ResourceAssignment) -> Result<(), ValidationError> {
    if !assignment.allocation.is_finite()
        || assignment.allocation < 1.0 - EPSILON
        || assignment.allocation > 200.0 + EPSILON
    {
        return Err(ValidationError::new(format!(
            "assignment of resource {} to task {} has invalid allocation {} (must be 1-200)",
            assignment.resource_id, assignment.task_id, assignment.allocation
        )));
    }
    if let Some(effort) = assignment.effort_hours {
        if !effort.is_finite() || effort < -EPSILON {
            return Err(ValidationError::new(format!(
                "assignment of resource {} to task {} has invalid effort_hours {}",
                assignment.resource_id, assignment.task_id, effort
            )));
        }
    }
    Ok(())
}

pub fn validate_snapshot(snapshot: &ProjectSnapshot) -> Result<(), ValidationError> {
    let mut task_ids = HashSet::with_capacity(snapshot.tasks.len());
    for task in &snapshot.tasks {
        if !task_ids.insert(task.id) {
            return Err(ValidationError::new(format!("duplicate task id {}", task.id)));
        }
        validate_task(task)?;
    }

    let mut resource_ids = HashSet::with_capacity(snapshot.resources.len());
    for resource in &snapshot.resources {
        if !resource_ids.insert(resource.id) {
            return Err(ValidationError::new(format!(
                "duplicate resource id {}",
                resource.id
            )));
        }
        validate_resource(resource)?;
    }

    for assignment in &snapshot.assignments {
        validate_assignment(assignment)?;
    }

    for dependency in &snapshot.dependencies {
        if dependency.predecessor_id == dependency.successor_id {
            return Err(ValidationError::new(format!(
                "task {} depends on itself",
                dependency.predecessor_id
            )));
        }
    }

    Ok(())
}
