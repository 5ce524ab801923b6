use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

use crate::task::{Dependency, DependencyType, Task, TaskId};

/// Typed edge: predecessor -> successor with a dependency type and lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub dependency_type: DependencyType,
    pub lag_days: i64,
}

/// The dependency set contained a cycle; `task_id` sits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleError {
    pub task_id: TaskId,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency cycle detected involving task {}",
            self.task_id
        )
    }
}

impl std::error::Error for CycleError {}

pub struct ScheduleDag {
    pub graph: DiGraph<TaskId, DependencyEdge>,
    pub id_to_index: HashMap<TaskId, NodeIndex>,
}

impl ScheduleDag {
    /// Build the project DAG. Dependencies referencing a task that is not in
    /// the snapshot are skipped rather than failing the run.
    pub fn build(tasks: &[Task], dependencies: &[Dependency]) -> Self {
        let mut graph: DiGraph<TaskId, DependencyEdge> = DiGraph::new();
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::new();

        for task in tasks {
            let node_ix = graph.add_node(task.id);
            id_to_index.insert(task.id, node_ix);
        }

        for dependency in dependencies {
            if let (Some(&pred_ix), Some(&succ_ix)) = (
                id_to_index.get(&dependency.predecessor_id),
                id_to_index.get(&dependency.successor_id),
            ) {
                graph.add_edge(
                    pred_ix,
                    succ_ix,
                    DependencyEdge {
                        dependency_type: dependency.dependency_type,
                        lag_days: dependency.lag_days,
                    },
                );
            }
        }

        Self { graph, id_to_index }
    }

    /// Task ids in dependency order, or the offending task when the edges
    /// form a cycle.
    pub fn topological_order(&self) -> Result<Vec<TaskId>, CycleError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|ix| self.graph[ix]).collect())
            .map_err(|cycle| CycleError {
                task_id: self.graph[cycle.node_id()],
            })
    }
}
