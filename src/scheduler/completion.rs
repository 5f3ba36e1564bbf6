use super::leveling::{Leveler, LevelingState};
use super::{util, OwnerSummary, ScheduleMetadata, Scheduler, TaskSummary, TrackedSchedule};
use crate::calendar::{day_to_week, Clock, WorkingCalendar};
use crate::model::{Progress, RowKind, ScheduledTask, Task, TrackedTask};
use crate::policy::{effective_duration, ActivityPolicy};
use tracing::debug;

pub(super) fn schedule_tracked<P: ActivityPolicy>(
    scheduler: &Scheduler<P>,
    tasks: &[TrackedTask],
    roster: &[String],
    clock: &dyn Clock,
) -> TrackedSchedule {
    let (completed, active): (Vec<&TrackedTask>, Vec<&TrackedTask>) =
        tasks.iter().partition(|task| task.is_completed());

    let project_start = tasks
        .iter()
        .filter_map(TrackedTask::recorded_start)
        .min()
        .unwrap_or_else(|| clock.today());
    let calendar = WorkingCalendar::new(project_start);
    let mut state = LevelingState::with_roster(roster);

    debug!(
        completed = completed.len(),
        active = active.len(),
        roster = roster.len(),
        "schedule_tracked: called"
    );

    // l'historique passe en premier : il consomme la capacité des propriétaires
    for task in &completed {
        for owner in &task.assignees {
            freeze(&mut state, task, owner, &calendar, &scheduler.policy);
        }
    }

    let fanned: Vec<(Task, Progress)> = active
        .iter()
        .flat_map(|task| {
            let status = task.progress.unwrap_or(Progress::NotStarted);
            task.assignees
                .iter()
                .map(move |owner| (task.for_owner(owner), status))
        })
        .collect();

    let leveler = Leveler {
        calendar: &calendar,
        policy: &scheduler.policy,
        options: scheduler.options,
    };
    let ordered = util::order_tasks(
        fanned,
        scheduler.options.ordering,
        |(task, _): &(Task, Progress)| task.due_date,
    );
    for (task, status) in ordered {
        let row = leveler.place(&mut state, &task);
        row.status = Some(status);
    }

    let leveled = state.finish(&calendar);
    let completed_count = leveled.rows.iter().filter(|row| row.is_frozen).count();
    let total = leveled.rows.len();
    let completion_rate = if total == 0 {
        0
    } else {
        (completed_count as f64 / total as f64 * 100.0).round() as u32
    };

    let owners = leveled
        .timelines
        .iter()
        .map(|(owner, timeline)| OwnerSummary {
            owner: owner.clone(),
            next_available_day: timeline.next_available_day,
            total_tasks: timeline.total_tasks,
            tasks: leveled
                .rows
                .iter()
                .filter(|row| row.owner() == owner)
                .map(summarize)
                .collect(),
        })
        .collect();

    TrackedSchedule {
        total_project_days: leveled.total_days,
        total_project_weeks: leveled.total_weeks,
        owners,
        project_start_date: calendar.project_start(),
        completed_count,
        active_count: total - completed_count,
        completion_rate,
        metadata: ScheduleMetadata {
            task_count: tasks.len(),
            generated_at: clock.now(),
        },
        owner_timelines: leveled.timelines,
        scheduled_tasks: leveled.rows,
    }
}

/// Fige une tâche terminée sur ses dates historiques. Sans date de début
/// connue, elle prend la prochaine disponibilité du propriétaire ; sans fin
/// connue, sa durée nominale.
fn freeze(
    state: &mut LevelingState,
    task: &TrackedTask,
    owner: &str,
    calendar: &WorkingCalendar,
    policy: &dyn ActivityPolicy,
) {
    let duration = policy.duration_days(&task.activity);
    let effective = effective_duration(duration);

    let timeline = state.timeline_mut(owner);
    let start_day = task
        .recorded_start()
        .map(|date| calendar.date_to_working_day(date))
        .unwrap_or(timeline.next_available_day);
    let end_day = match task.recorded_end() {
        Some(date) => calendar.date_to_working_day(date).max(start_day),
        None => start_day.saturating_add(effective.saturating_sub(1)),
    };
    timeline.next_available_day = timeline.next_available_day.max(end_day.saturating_add(1));
    timeline.record(&task.name);

    // une ligne gelée est un fait accompli : jamais un gabarit à déplier
    let row = ScheduledTask {
        task: task.for_owner(owner),
        start_day,
        end_day,
        start_week: day_to_week(start_day),
        end_week: day_to_week(end_day),
        raw_duration: duration,
        effective_duration: effective,
        calculated_start_date: calendar.date_for_day(start_day),
        calculated_end_date: calendar.date_for_day(end_day),
        is_frozen: true,
        status: Some(Progress::Completed),
        row: RowKind::Single,
    };
    state.push_row(row);
}

fn summarize(row: &ScheduledTask) -> TaskSummary {
    TaskSummary {
        id: row.task.id.clone(),
        name: row.task.name.clone(),
        start_day: row.start_day,
        end_day: row.end_day,
        status: row.status.unwrap_or(Progress::NotStarted),
        is_frozen: row.is_frozen,
    }
}
