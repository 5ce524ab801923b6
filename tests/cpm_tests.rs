use chrono::NaiveDate;
use schedule_engine::schedule::{ProjectSnapshot, ScheduleTask, compute_schedule};
use schedule_engine::task::{ConstraintType, Dependency, DependencyType, Task, TaskId};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn task(id: TaskId, hours: f64) -> Task {
    Task::new(id, format!("T{id}")).with_estimate(hours)
}

fn find(result: &[ScheduleTask], id: TaskId) -> &ScheduleTask {
    result.iter().find(|t| t.id == id).unwrap()
}

#[test]
fn two_task_chain_is_entirely_critical() {
    // Project start Monday 2024-01-01. A: 8h -> 1 day; B: 16h -> 2 days, FS.
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 8.0), task(2, 16.0)],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToStart)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2024, 1, 1))).unwrap();

    let a = find(&result.tasks, 1);
    assert_eq!(a.early_start, Some(d(2024, 1, 1)));
    assert_eq!(a.early_finish, Some(d(2024, 1, 1)));
    assert_eq!(a.total_float, Some(0));
    assert!(a.is_critical);

    let b = find(&result.tasks, 2);
    assert_eq!(b.early_start, Some(d(2024, 1, 2)));
    assert_eq!(b.early_finish, Some(d(2024, 1, 3)));
    assert_eq!(b.late_finish, Some(d(2024, 1, 3)));
    assert!(b.is_critical);

    assert_eq!(result.project_end_date, Some(d(2024, 1, 3)));
    assert_eq!(result.critical_tasks, vec![1, 2]);
    assert_eq!(result.critical_path_length, 3);
}

#[test]
fn diamond_slack_branch_is_not_critical() {
    // 1 -> {2, 3} -> 4 from Monday 2025-01-06; durations 2, 3, 1, 2.
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 16.0), task(2, 24.0), task(3, 8.0), task(4, 16.0)],
        dependencies: vec![
            Dependency::new(1, 2, DependencyType::FinishToStart),
            Dependency::new(1, 3, DependencyType::FinishToStart),
            Dependency::new(2, 4, DependencyType::FinishToStart),
            Dependency::new(3, 4, DependencyType::FinishToStart),
        ],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    let t1 = find(&result.tasks, 1);
    assert_eq!(t1.early_start, Some(d(2025, 1, 6)));
    assert_eq!(t1.early_finish, Some(d(2025, 1, 7)));
    assert_eq!(t1.late_finish, Some(d(2025, 1, 7)));
    assert_eq!(t1.free_float, Some(0));

    let t2 = find(&result.tasks, 2);
    assert_eq!(t2.early_start, Some(d(2025, 1, 8)));
    assert_eq!(t2.early_finish, Some(d(2025, 1, 10))); // Wed + 2 = Fri
    assert_eq!(t2.total_float, Some(0));

    let t3 = find(&result.tasks, 3);
    assert_eq!(t3.early_start, Some(d(2025, 1, 8)));
    assert_eq!(t3.early_finish, Some(d(2025, 1, 8)));
    assert_eq!(t3.late_finish, Some(d(2025, 1, 10)));
    assert_eq!(t3.total_float, Some(1));
    assert!(!t3.is_critical);

    let t4 = find(&result.tasks, 4);
    // Gated by the slower branch, crossing the weekend
    assert_eq!(t4.early_start, Some(d(2025, 1, 13)));
    assert_eq!(t4.early_finish, Some(d(2025, 1, 14)));
    assert!(t4.is_critical);

    assert_eq!(result.critical_tasks, vec![1, 2, 4]);
    assert_eq!(result.critical_path_length, 7);
}

#[test]
fn lag_and_lead_shift_the_successor() {
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 16.0), task(2, 8.0), task(3, 8.0)],
        dependencies: vec![
            Dependency::new(1, 2, DependencyType::FinishToStart).with_lag(2),
            Dependency::new(1, 3, DependencyType::StartToStart).with_lag(1),
        ],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    // T1 finishes Tuesday 01-07; FS lag 2: Wed + 2 more = Friday
    assert_eq!(find(&result.tasks, 2).early_start, Some(d(2025, 1, 10)));
    // SS lag 1 from T1's Monday start
    assert_eq!(find(&result.tasks, 3).early_start, Some(d(2025, 1, 7)));
}

#[test]
fn finish_to_finish_aligns_finishes() {
    // T1: 3 days from Monday (finishes Wednesday). T2: 2 days, FF.
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 24.0), task(2, 16.0)],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToFinish)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    let t2 = find(&result.tasks, 2);
    // Successor starts so that it finishes alongside T1's Wednesday finish
    assert_eq!(t2.early_start, Some(d(2025, 1, 7)));
    assert_eq!(t2.early_finish, Some(d(2025, 1, 8)));
    assert_eq!(t2.late_start, Some(d(2025, 1, 7)));
    assert_eq!(t2.late_finish, Some(d(2025, 1, 8)));

    // Backward, the FF edge holds T1's late finish to its successor's
    let t1 = find(&result.tasks, 1);
    assert_eq!(t1.late_finish, Some(d(2025, 1, 8)));
    assert_eq!(t1.late_start, Some(d(2025, 1, 6)));
    assert!(t1.is_critical && t2.is_critical);
}

#[test]
fn start_to_finish_ties_the_successor_finish_to_the_predecessor_start() {
    // T1: 3 days from Monday 2025-01-06. T2: 2 days, SF.
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 24.0), task(2, 16.0)],
        dependencies: vec![Dependency::new(1, 2, DependencyType::StartToFinish)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    // Forward: T2 backs up so its finish lands on T1's Monday start
    let t2 = find(&result.tasks, 2);
    assert_eq!(t2.early_start, Some(d(2025, 1, 3)));
    assert_eq!(t2.early_finish, Some(d(2025, 1, 6)));

    // Backward: project end is T1's Wednesday finish; T2 drifts to it and
    // the SF edge lets T1 finish one day later than its early finish
    assert_eq!(t2.late_start, Some(d(2025, 1, 7)));
    assert_eq!(t2.late_finish, Some(d(2025, 1, 8)));
    assert_eq!(t2.total_float, Some(1));

    let t1 = find(&result.tasks, 1);
    assert_eq!(t1.early_finish, Some(d(2025, 1, 8)));
    assert_eq!(t1.late_start, Some(d(2025, 1, 7)));
    assert_eq!(t1.late_finish, Some(d(2025, 1, 9)));
    assert_eq!(t1.total_float, Some(0));
    assert!(t1.is_critical);
}

#[test]
fn start_to_start_backward_candidate_follows_the_successor_late_start() {
    // T1: 3 days from Monday 2025-01-06. T2: 1 day, SS.
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 24.0), task(2, 8.0)],
        dependencies: vec![Dependency::new(1, 2, DependencyType::StartToStart)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    let t2 = find(&result.tasks, 2);
    assert_eq!(t2.early_start, Some(d(2025, 1, 6)));
    // Sink: late finish drifts to the project end (T1's Wednesday finish)
    assert_eq!(t2.late_start, Some(d(2025, 1, 8)));
    assert_eq!(t2.late_finish, Some(d(2025, 1, 8)));
    assert_eq!(t2.total_float, Some(1));

    // T1's late finish follows T2's late start plus its own duration
    let t1 = find(&result.tasks, 1);
    assert_eq!(t1.late_finish, Some(d(2025, 1, 13)));
    assert_eq!(t1.late_start, Some(d(2025, 1, 9)));
    assert_eq!(t1.total_float, Some(2));
    assert!(result.critical_tasks.is_empty());
}

#[test]
fn start_no_earlier_than_pushes_the_early_start() {
    let mut constrained = task(2, 8.0);
    constrained.constraint_type = ConstraintType::Snet;
    constrained.constraint_date = Some(d(2025, 1, 10));
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 8.0), constrained],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToStart)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    let t2 = find(&result.tasks, 2);
    assert_eq!(t2.early_start, Some(d(2025, 1, 10)));
    // The predecessor now has slack: its late finish slides to 01-09
    assert_eq!(find(&result.tasks, 1).total_float, Some(2));
}

#[test]
fn must_start_on_overrides_dependencies() {
    let mut pinned = task(2, 8.0);
    pinned.constraint_type = ConstraintType::Mso;
    pinned.constraint_date = Some(d(2025, 1, 6));
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 24.0), pinned],
        dependencies: vec![Dependency::new(1, 2, DependencyType::FinishToStart)],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    // Forced to the pinned date even though the predecessor runs past it
    assert_eq!(find(&result.tasks, 2).early_start, Some(d(2025, 1, 6)));
}

#[test]
fn must_finish_on_anchors_the_backward_pass() {
    let mut anchored = task(1, 8.0);
    anchored.constraint_type = ConstraintType::Mfo;
    anchored.constraint_date = Some(d(2025, 1, 17));
    let snapshot = ProjectSnapshot {
        tasks: vec![anchored],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();

    let t1 = find(&result.tasks, 1);
    assert_eq!(t1.late_finish, Some(d(2025, 1, 17)));
    assert!(!t1.is_critical);
}

#[test]
fn empty_project_yields_an_empty_result() {
    let snapshot = ProjectSnapshot::default();
    let result = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap();
    assert!(result.tasks.is_empty());
    assert_eq!(result.project_end_date, None);
    assert_eq!(result.critical_path_length, 0);
}

#[test]
fn cycle_is_rejected() {
    let snapshot = ProjectSnapshot {
        tasks: vec![task(1, 8.0), task(2, 8.0)],
        dependencies: vec![
            Dependency::new(1, 2, DependencyType::FinishToStart),
            Dependency::new(2, 1, DependencyType::FinishToStart),
        ],
        ..ProjectSnapshot::default()
    };
    let err = compute_schedule(&snapshot, Some(d(2025, 1, 6))).unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn project_start_falls_back_to_the_earliest_task_start() {
    let mut t1 = task(1, 8.0);
    t1.start_date = Some(d(2025, 2, 3));
    let mut t2 = task(2, 8.0);
    t2.start_date = Some(d(2025, 1, 20));
    let snapshot = ProjectSnapshot {
        tasks: vec![t1, t2],
        ..ProjectSnapshot::default()
    };
    let result = compute_schedule(&snapshot, None).unwrap();
    assert_eq!(result.project_start_date, d(2025, 1, 20));
    assert_eq!(find(&result.tasks, 1).early_start, Some(d(2025, 1, 20)));
}
