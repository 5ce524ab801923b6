pub mod calculations;
pub mod calendar;
pub mod conflict;
pub mod duration;
pub mod graph;
pub mod leveling;
pub mod propagation;
pub mod resource;
pub mod schedule;
pub mod store;
pub mod task;
pub(crate) mod validation;

pub use calendar::{
    WorkCalendar, add_business_days, business_days_between, subtract_business_days,
};
pub use conflict::{ConflictReport, detect_constraint_conflict};
pub use duration::{AssignmentWithResource, estimate_duration};
pub use leveling::{Feasibility, LevelingSuggestion, suggest_resource_leveling};
pub use propagation::propagate_dates;
pub use resource::{CalendarException, ExceptionKind, Resource, ResourceAssignment, ResourceId};
pub use schedule::{
    DependencyLink, ProjectSnapshot, RunScheduleOutcome, ScheduleEngine, ScheduleError,
    ScheduleResult, ScheduleTask, TaskScheduleWrite, compute_schedule, schedule_view,
};
pub use store::{
    JsonFileStore, MemoryStore, ProjectStore, StoreError, export_tasks_to_csv,
    import_tasks_from_csv, load_snapshot_from_json, save_snapshot_to_json, validate_snapshot,
};
pub use task::{ConstraintType, Dependency, DependencyType, Task, TaskId, WorkMode};
