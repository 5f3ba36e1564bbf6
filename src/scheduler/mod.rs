mod completion;
mod leveling;
mod recurring;
mod types;
mod util;

pub use recurring::RecurringExpander;
pub use types::{
    OwnerSummary, Schedule, ScheduleMetadata, ScheduleOptions, TaskOrdering, TaskSummary,
    TrackedSchedule,
};

use crate::calendar::{select_project_start, Clock, WorkingCalendar};
use crate::model::{ScheduledTask, Task, TrackedTask};
use crate::policy::{ActivityPolicy, StandardPolicy};
use leveling::{Leveler, LevelingState};
use tracing::debug;

/// Scheduler : nivellement de charge par propriétaire, sans état entre deux
/// appels.
#[derive(Debug, Default, Clone)]
pub struct Scheduler<P = StandardPolicy> {
    policy: P,
    options: ScheduleOptions,
}

impl Scheduler<StandardPolicy> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ActivityPolicy> Scheduler<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            options: ScheduleOptions::default(),
        }
    }

    pub fn options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Place chaque tâche sur la ligne de temps de son propriétaire, dans
    /// l'ordre de l'entrée, puis étire les tâches CONTINUOUS jusqu'à la fin
    /// du projet. Une entrée vide donne un planning vide.
    pub fn schedule(&self, tasks: &[Task], clock: &dyn Clock) -> Schedule {
        debug!(tasks = tasks.len(), options = ?self.options, "Scheduler::schedule: called");

        let project_start = select_project_start(
            tasks
                .iter()
                .flat_map(|task| [task.start_date, task.due_date])
                .flatten(),
            clock,
        );
        let calendar = WorkingCalendar::new(project_start);
        let leveler = Leveler {
            calendar: &calendar,
            policy: &self.policy,
            options: self.options,
        };

        let mut state = LevelingState::new();
        let ordered = util::order_tasks(tasks.to_vec(), self.options.ordering, |task: &Task| {
            task.due_date
        });
        for task in &ordered {
            leveler.place(&mut state, task);
        }
        let leveled = state.finish(&calendar);

        debug!(
            total_days = leveled.total_days,
            total_weeks = leveled.total_weeks,
            owners = leveled.timelines.len(),
            "Scheduler::schedule: done"
        );

        Schedule {
            scheduled_tasks: leveled.rows,
            total_project_days: leveled.total_days,
            total_project_weeks: leveled.total_weeks,
            owner_timelines: leveled.timelines,
            project_start_date: calendar.project_start(),
            metadata: ScheduleMetadata {
                task_count: tasks.len(),
                generated_at: clock.now(),
            },
        }
    }

    /// Variante qui gèle les tâches terminées à leurs dates historiques et
    /// liste tous les membres de `roster`, même sans tâche.
    pub fn schedule_tracked(
        &self,
        tasks: &[TrackedTask],
        roster: &[String],
        clock: &dyn Clock,
    ) -> TrackedSchedule {
        completion::schedule_tracked(self, tasks, roster, clock)
    }

    /// Déplie les tâches récurrentes d'un planning, semaine par semaine.
    pub fn expand_recurring(&self, schedule: &Schedule) -> Vec<ScheduledTask> {
        RecurringExpander::new(WorkingCalendar::new(schedule.project_start_date))
            .expand_all(&schedule.scheduled_tasks, schedule.total_project_weeks)
    }
}
