use chrono::NaiveDate;
use schedule_engine::propagation::propagate_dates;
use schedule_engine::resource::{CalendarException, ExceptionKind, Resource, ResourceAssignment};
use schedule_engine::schedule::{ProjectSnapshot, TaskScheduleWrite};
use schedule_engine::task::{Dependency, DependencyType, Task, TaskId};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn start_write(writes: &[TaskScheduleWrite], id: TaskId) -> Option<NaiveDate> {
    writes
        .iter()
        .filter(|w| w.task_id == id)
        .find_map(|w| w.start_date)
}

fn end_write(writes: &[TaskScheduleWrite], id: TaskId) -> Option<NaiveDate> {
    writes
        .iter()
        .filter(|w| w.task_id == id)
        .find_map(|w| w.end_date)
}

#[test]
fn change_ripples_down_a_chain() {
    let mut t1 = Task::new(1, "A").with_estimate(16.0);
    t1.start_date = Some(d(2024, 1, 1)); // Monday
    let mut t2 = Task::new(2, "B");
    t2.start_date = Some(d(2024, 1, 2));
    let snapshot = ProjectSnapshot {
        tasks: vec![t1, t2, Task::new(3, "C")],
        dependencies: vec![
            Dependency::new(1, 2, DependencyType::FinishToStart),
            Dependency::new(2, 3, DependencyType::FinishToStart),
        ],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();

    // T1: 16h unassigned -> 2 days, end two working days after its start
    assert_eq!(end_write(&writes, 1), Some(d(2024, 1, 3)));
    // T2 moves from Tuesday out past T1's new end
    assert_eq!(start_write(&writes, 2), Some(d(2024, 1, 4)));
    assert_eq!(end_write(&writes, 2), Some(d(2024, 1, 5)));
    // T3 lands on the following Monday
    assert_eq!(start_write(&writes, 3), Some(d(2024, 1, 8)));
}

#[test]
fn successor_starts_are_never_pulled_earlier() {
    let mut t1 = Task::new(1, "A").with_estimate(16.0);
    t1.start_date = Some(d(2024, 1, 1));
    let mut t2 = Task::new(2, "B");
    t2.start_date = Some(d(2024, 2, 5)); // already far later than required
    let snapshot = ProjectSnapshot {
        tasks: vec![t1, t2],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToStart)],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();
    assert!(writes.iter().all(|w| w.task_id == 1));
}

#[test]
fn completed_tasks_are_skipped_but_the_walk_continues() {
    let mut done = Task::new(1, "Done").with_estimate(16.0);
    done.progress = 100.0;
    done.start_date = Some(d(2024, 1, 1));
    done.end_date = Some(d(2024, 1, 3));
    let mut next = Task::new(2, "Next").with_estimate(8.0);
    next.start_date = Some(d(2024, 1, 8));
    let snapshot = ProjectSnapshot {
        tasks: vec![done, next],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToStart)],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();
    assert!(writes.iter().all(|w| w.task_id == 2));
    // The successor still gets its duration and end recomputed
    assert_eq!(end_write(&writes, 2), Some(d(2024, 1, 9)));
}

#[test]
fn assigned_resources_drive_the_recomputed_duration() {
    let mut t1 = Task::new(1, "A").with_estimate(40.0);
    t1.start_date = Some(d(2024, 1, 1));
    let snapshot = ProjectSnapshot {
        tasks: vec![t1],
        resources: vec![Resource::new(7, "Dev")],
        assignments: vec![ResourceAssignment::new(1, 7, 50.0)],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();
    let write = writes.iter().find(|w| w.task_id == 1).unwrap();
    // 40h at 4h/day effective -> 10 working days
    assert_eq!(write.computed_duration, Some(10));
    assert_eq!(write.end_date, Some(d(2024, 1, 15)));
}

#[test]
fn missing_start_date_anchors_the_simulation_at_the_early_start() {
    let mut t1 = Task::new(1, "A").with_estimate(32.0);
    t1.early_start = Some(d(2024, 1, 1)); // Monday
    let mut resource = Resource::new(7, "Dev");
    resource.max_hours_per_week = 16.0;
    resource
        .calendar_exceptions
        .push(CalendarException::new(d(2024, 1, 3), ExceptionKind::Holiday));
    let snapshot = ProjectSnapshot {
        tasks: vec![t1],
        resources: vec![resource],
        assignments: vec![ResourceAssignment::new(1, 7, 100.0)],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();
    let write = writes.iter().find(|w| w.task_id == 1).unwrap();
    // The Wednesday holiday removes a counted day from the first weekly
    // window only when the simulation starts at the early start; 32h under
    // the 16h/week cap then lands at six working days, not seven.
    assert_eq!(write.computed_duration, Some(6));
    assert_eq!(write.end_date, Some(d(2024, 1, 10)));
}

#[test]
fn unknown_changed_task_is_an_error() {
    let snapshot = ProjectSnapshot {
        tasks: vec![Task::new(1, "A")],
        ..ProjectSnapshot::default()
    };
    let err = propagate_dates(&snapshot, 99).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn diamond_join_is_processed_once() {
    let mut t1 = Task::new(1, "A").with_estimate(8.0);
    t1.start_date = Some(d(2024, 1, 1));
    let snapshot = ProjectSnapshot {
        tasks: vec![
            t1,
            Task::new(2, "B").with_estimate(8.0),
            Task::new(3, "C").with_estimate(8.0),
            Task::new(4, "D").with_estimate(8.0),
        ],
        dependencies: vec![
            Dependency::new(1, 2, DependencyType::FinishToStart),
            Dependency::new(1, 3, DependencyType::FinishToStart),
            Dependency::new(2, 4, DependencyType::FinishToStart),
            Dependency::new(3, 4, DependencyType::FinishToStart),
        ],
        ..ProjectSnapshot::default()
    };

    let writes = propagate_dates(&snapshot, 1).unwrap();
    let recomputes = writes
        .iter()
        .filter(|w| w.task_id == 4 && w.computed_duration.is_some())
        .count();
    assert_eq!(recomputes, 1);
}
