use std::collections::HashMap;

use super::{ProjectStore, StoreError, StoreResult, apply_writes};
use crate::schedule::{ProjectSnapshot, TaskScheduleWrite};

/// In-memory project store, used by the test suite and by callers that
/// assemble snapshots themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: HashMap<i32, ProjectSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&mut self, project_id: i32, snapshot: ProjectSnapshot) {
        self.projects.insert(project_id, snapshot);
    }

    pub fn snapshot(&self, project_id: i32) -> Option<&ProjectSnapshot> {
        self.projects.get(&project_id)
    }
}

impl ProjectStore for MemoryStore {
    fn load_project(&self, project_id: i32) -> StoreResult<ProjectSnapshot> {
        self.projects
            .get(&project_id)
            .cloned()
            .ok_or(StoreError::ProjectNotFound(project_id))
    }

    fn apply_task_updates(
        &mut self,
        project_id: i32,
        updates: &[TaskScheduleWrite],
    ) -> StoreResult<()> {
        let snapshot = self
            .projects
            .get_mut(&project_id)
            .ok_or(StoreError::ProjectNotFound(project_id))?;
        apply_writes(snapshot, updates)
    }
}
