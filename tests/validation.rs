#![forbid(unsafe_code)]
use chrono::NaiveDate;
use nivellement::validation::{validate_tasks, validate_tracked_tasks, RawTask, ValidationIssue};
use nivellement::{Activity, ActivityType, Progress, TaskId};

fn raw(name: &str, owner: &str) -> RawTask {
    RawTask {
        name: Some(name.into()),
        owner_name: Some(owner.into()),
        ..RawTask::default()
    }
}

#[test]
fn missing_fields_take_defaults() {
    let tasks = validate_tasks(&[raw("Write docs", "Ann")]).unwrap();
    let task = &tasks[0];
    assert_eq!(task.activity, Activity::OneTime { estimate: 1.0 });
    assert_eq!(task.id, TaskId::new("task-1"));
    assert_eq!(task.start_date, None);
    assert_eq!(task.due_date, None);
}

#[test]
fn explicit_id_is_kept() {
    let mut record = raw("Write docs", "Ann");
    record.id = Some("DOC-7".into());
    let tasks = validate_tasks(&[record]).unwrap();
    assert_eq!(tasks[0].id.as_str(), "DOC-7");
}

#[test]
fn every_problem_is_collected() {
    let mut bad_kind = raw("Deploy", "Ann");
    bad_kind.activity_type = Some("SOMETIMES".into());
    let mut bad_estimate = raw("Plan", "Bo");
    bad_estimate.duration_estimate = Some(-2.0);
    bad_estimate.due_date = Some("31/12/2025".into());
    let nameless = RawTask {
        owner_name: Some("Cy".into()),
        ..RawTask::default()
    };
    let ownerless = RawTask {
        name: Some("Orphan".into()),
        ..RawTask::default()
    };

    let report =
        validate_tasks(&[raw("Fine", "Ann"), bad_kind, bad_estimate, nameless, ownerless])
            .unwrap_err();

    let issues: Vec<_> = report.errors.iter().map(|e| (e.index, e.issue.clone())).collect();
    assert_eq!(
        issues,
        vec![
            (1, ValidationIssue::UnknownActivityType("SOMETIMES".into())),
            (2, ValidationIssue::InvalidDuration(-2.0)),
            (
                2,
                ValidationIssue::InvalidDate {
                    field: "due_date",
                    value: "31/12/2025".into()
                }
            ),
            (3, ValidationIssue::MissingName),
            (4, ValidationIssue::MissingOwner),
        ]
    );
    assert_eq!(report.to_string(), "5 invalid task field(s)");
    assert_eq!(
        report.errors[0].to_string(),
        "task #2 (Deploy): unknown activity type: SOMETIMES"
    );
    assert_eq!(
        report.errors[3].to_string(),
        "task #4 (<unnamed>): task name is required"
    );
}

#[test]
fn activity_type_spelling_is_tolerant() {
    for (input, expected) in [
        ("one_time", ActivityType::OneTime),
        ("Parallel-Allowed", ActivityType::ParallelAllowed),
        ("recurring weekly", ActivityType::RecurringWeekly),
        ("API_1_DAY", ActivityType::Api1Day),
        ("milestone", ActivityType::Milestone),
    ] {
        let mut record = raw("T", "Ann");
        record.activity_type = Some(input.into());
        let tasks = validate_tasks(&[record]).unwrap();
        assert_eq!(tasks[0].activity.kind(), expected, "input {input}");
    }
}

#[test]
fn estimate_is_dropped_for_fixed_duration_types() {
    let mut record = raw("Call", "Ann");
    record.activity_type = Some("API_1_DAY".into());
    record.duration_estimate = Some(8.0);
    let tasks = validate_tasks(&[record]).unwrap();
    assert_eq!(tasks[0].activity, Activity::Api1Day);
    assert_eq!(tasks[0].activity.estimate(), None);
}

#[test]
fn camel_case_json_is_accepted() {
    let json = r#"[
        {"name": "API Dev", "ownerName": "Alice", "durationEstimate": 10,
         "activityType": "ONE_TIME", "startDate": "2025-09-08T09:00:00Z", "dueDate": "2025-09-30"}
    ]"#;
    let records: Vec<RawTask> = serde_json::from_str(json).unwrap();
    let tasks = validate_tasks(&records).unwrap();
    let task = &tasks[0];
    assert_eq!(task.owner_name, "Alice");
    assert_eq!(task.activity, Activity::OneTime { estimate: 10.0 });
    assert_eq!(task.start_date, NaiveDate::from_ymd_opt(2025, 9, 8));
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 9, 30));
}

#[test]
fn tracked_tasks_fall_back_to_owner_and_dedupe_assignees() {
    let mut shared = raw("Design", "ignored");
    shared.assignees = vec!["Alice".into(), " Bob ".into(), "Alice".into(), "".into()];
    shared.completed = Some(true);
    shared.actual_start_date = Some("2025-09-01".into());
    shared.progress = Some("done".into());
    let mut single = raw("Build", "Carol");
    single.progress = Some("in-progress".into());

    let tasks = validate_tracked_tasks(&[shared, single]).unwrap();
    assert_eq!(tasks[0].assignees, vec!["Alice", "Bob"]);
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].progress, Some(Progress::Completed));
    assert_eq!(tasks[0].actual_start_date, NaiveDate::from_ymd_opt(2025, 9, 1));
    assert_eq!(tasks[1].assignees, vec!["Carol"]);
    assert!(!tasks[1].completed);
    assert_eq!(tasks[1].progress, Some(Progress::InProgress));
}

#[test]
fn tracked_validation_reports_progress_and_owner_problems() {
    let mut unknown = raw("Build", "Carol");
    unknown.progress = Some("halfway".into());
    let nobody = RawTask {
        name: Some("Nobody".into()),
        actual_end_date: Some("yesterday".into()),
        ..RawTask::default()
    };

    let report = validate_tracked_tasks(&[unknown, nobody]).unwrap_err();
    let issues: Vec<_> = report.errors.iter().map(|e| e.issue.to_string()).collect();
    assert_eq!(
        issues,
        vec![
            "unknown progress value: halfway",
            "owner name is required",
            "invalid actual_end_date: yesterday",
        ]
    );
}

#[test]
fn estimate_has_an_upper_bound() {
    let mut longest = raw("Longest", "Ann");
    longest.duration_estimate = Some(Activity::MAX_ESTIMATE);
    assert!(validate_tasks(&[longest]).is_ok());

    let mut endless = raw("Endless", "Ann");
    endless.duration_estimate = Some(1.0e8);
    let report = validate_tasks(&[endless]).unwrap_err();
    assert_eq!(report.errors[0].issue, ValidationIssue::InvalidDuration(1.0e8));
    assert_eq!(
        report.errors[0].to_string(),
        "task #1 (Endless): duration estimate must be between 0 and 2600 days (got 100000000)"
    );
}
