#![forbid(unsafe_code)]
use chrono::NaiveDate;
use nivellement::validation::validate_tasks;
use nivellement::{io, Activity, FixedClock, OccupancyGrid, Schedule, Scheduler};
use std::fs;
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 9, 10).unwrap())
}

#[test]
fn csv_import_feeds_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    fs::write(
        &path,
        "name,owner_name,duration_estimate,activity_type,start_date,due_date\n\
         DB Design,Alice,5,ONE_TIME,,\n\
         Standup,Frank,,RECURRING_WEEKLY,,\n\
         Launch,Alice\n",
    )
    .unwrap();

    let raw = io::import_tasks_csv(&path).unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[1].duration_estimate, None);
    assert_eq!(raw[2].activity_type, None);

    let tasks = validate_tasks(&raw).unwrap();
    assert_eq!(tasks[0].activity, Activity::OneTime { estimate: 5.0 });
    assert_eq!(tasks[1].activity, Activity::RecurringWeekly);
    assert_eq!(tasks[2].activity, Activity::OneTime { estimate: 1.0 });
}

#[test]
fn csv_import_rejects_non_numeric_estimate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    fs::write(&path, "name,owner_name,duration_estimate\nA,Ann,lots\n").unwrap();

    let err = io::import_tasks_csv(&path).unwrap_err();
    assert!(err.to_string().contains("row 1"), "{err}");
}

#[test]
fn json_import_and_export_round_through_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tasks.json");
    fs::write(
        &input,
        r#"[{"name": "API Dev", "owner_name": "Alice", "duration_estimate": 10},
            {"name": "Docs", "owner": "Bob"}]"#,
    )
    .unwrap();

    let tasks = validate_tasks(&io::import_tasks_json(&input).unwrap()).unwrap();
    let plan = Scheduler::new().schedule(&tasks, &clock());

    let output = dir.path().join("schedule.json");
    io::export_json(&output, &plan).unwrap();
    let back: Schedule = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(back.scheduled_tasks, plan.scheduled_tasks);
    assert_eq!(back.total_project_days, 10);
}

#[test]
fn csv_exports_have_one_line_per_row_or_cell() {
    let dir = tempdir().unwrap();
    let raw = vec![
        nivellement::RawTask {
            name: Some("Build".into()),
            owner_name: Some("Ann".into()),
            duration_estimate: Some(3.0),
            ..Default::default()
        },
        nivellement::RawTask {
            name: Some("Sync".into()),
            owner_name: Some("Bo".into()),
            activity_type: Some("RECURRING_WEEKLY".into()),
            ..Default::default()
        },
    ];
    let tasks = validate_tasks(&raw).unwrap();
    let scheduler = Scheduler::new();
    let plan = scheduler.schedule(&tasks, &clock());
    let rows = scheduler.expand_recurring(&plan);

    let schedule_csv = dir.path().join("schedule.csv");
    io::export_schedule_csv(&schedule_csv, &rows).unwrap();
    let text = fs::read_to_string(&schedule_csv).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1 + rows.len());
    assert!(lines[0].starts_with("id,name,owner_name,activity_type,start_day"));
    assert_eq!(lines[1], "task-1,Build,Ann,ONE_TIME,1,3,1,1,2025-09-01,2025-09-03,false");

    let grid = OccupancyGrid::build(&rows, plan.total_project_weeks);
    let grid_csv = dir.path().join("grid.csv");
    io::export_grid_csv(&grid_csv, &grid).unwrap();
    let text = fs::read_to_string(&grid_csv).unwrap();
    assert_eq!(text.lines().count(), 1 + 2 * grid.total_days as usize);
    assert!(text.contains("Bo,1,1,Mon,Sync (W1),false"));
}
