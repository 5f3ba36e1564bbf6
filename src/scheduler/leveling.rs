use super::ScheduleOptions;
use crate::calendar::{day_to_week, WorkingCalendar};
use crate::model::{ActivityType, OwnerTimeline, RowKind, ScheduledTask, Task};
use crate::policy::{effective_duration, ActivityPolicy};
use std::collections::BTreeMap;
use tracing::debug;

/// État d'un seul calcul : disponibilités par propriétaire, lignes produites
/// et lignes CONTINUOUS à étirer en fin de passe.
#[derive(Debug, Default)]
pub(crate) struct LevelingState {
    timelines: BTreeMap<String, OwnerTimeline>,
    rows: Vec<ScheduledTask>,
    continuous: Vec<usize>,
}

/// Ce que produit `LevelingState::finish`.
pub(crate) struct LeveledRows {
    pub(crate) rows: Vec<ScheduledTask>,
    pub(crate) timelines: BTreeMap<String, OwnerTimeline>,
    pub(crate) total_days: u32,
    pub(crate) total_weeks: u32,
}

impl LevelingState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Ouvre une ligne de temps pour chaque membre connu, même sans tâche.
    pub(crate) fn with_roster<S: AsRef<str>>(roster: &[S]) -> Self {
        let mut state = Self::new();
        for member in roster {
            state.timeline_mut(member.as_ref());
        }
        state
    }

    pub(crate) fn timeline_mut(&mut self, owner: &str) -> &mut OwnerTimeline {
        self.timelines.entry(owner.to_owned()).or_default()
    }

    pub(crate) fn push_row(&mut self, row: ScheduledTask) -> &mut ScheduledTask {
        let index = self.rows.len();
        self.rows.push(row);
        &mut self.rows[index]
    }

    /// Calcule les totaux puis étire chaque tâche CONTINUOUS jusqu'au dernier
    /// jour du projet.
    pub(crate) fn finish(mut self, calendar: &WorkingCalendar) -> LeveledRows {
        let total_days = self.rows.iter().map(|row| row.end_day).max().unwrap_or(0);
        let total_weeks = day_to_week(total_days);

        for &index in &self.continuous {
            let row = &mut self.rows[index];
            let span = total_days - row.start_day + 1;
            row.end_day = total_days;
            row.end_week = total_weeks;
            row.raw_duration = f64::from(span);
            row.effective_duration = span;
            row.calculated_end_date = calendar.date_for_day(total_days);
        }

        LeveledRows {
            rows: self.rows,
            timelines: self.timelines,
            total_days,
            total_weeks,
        }
    }
}

/// Place les tâches une à une sur la ligne de temps de leur propriétaire.
pub(crate) struct Leveler<'a> {
    pub(crate) calendar: &'a WorkingCalendar,
    pub(crate) policy: &'a dyn ActivityPolicy,
    pub(crate) options: ScheduleOptions,
}

impl Leveler<'_> {
    pub(crate) fn place<'s>(
        &self,
        state: &'s mut LevelingState,
        task: &Task,
    ) -> &'s mut ScheduledTask {
        let kind = task.activity.kind();
        let duration = self.policy.duration_days(&task.activity);
        let effective = effective_duration(duration);
        let overlaps = self.policy.can_overlap(kind);
        let pinned = task.start_date.is_some();

        let timeline = state.timeline_mut(&task.owner_name);
        let start_day = match task.start_date {
            Some(date) => self.calendar.date_to_working_day(date),
            None if overlaps => 1,
            None => timeline.next_available_day,
        };

        let end_day = match kind {
            _ if effective == 0 => start_day,
            ActivityType::Milestone | ActivityType::RecurringWeekly => start_day,
            _ => start_day.saturating_add(effective - 1),
        };

        if !overlaps && effective > 0 {
            // une récurrence ne bloque que son jour, pas la semaine
            let released = if kind == ActivityType::RecurringWeekly {
                start_day.saturating_add(1)
            } else {
                end_day.saturating_add(1)
            };
            if !pinned {
                timeline.next_available_day = released;
            } else if self.options.pinned_tasks_reserve_owner {
                timeline.next_available_day = timeline.next_available_day.max(released);
            }
        }
        timeline.record(&task.name);

        debug!(
            task = %task.name,
            owner = %task.owner_name,
            %kind,
            start_day,
            end_day,
            "Leveler::place: placed"
        );

        let row = ScheduledTask {
            task: task.clone(),
            start_day,
            end_day,
            start_week: day_to_week(start_day),
            end_week: day_to_week(end_day),
            raw_duration: duration,
            effective_duration: effective,
            calculated_start_date: self.calendar.date_for_day(start_day),
            calculated_end_date: self.calendar.date_for_day(end_day),
            is_frozen: false,
            status: None,
            row: RowKind::for_activity(kind),
        };

        if kind == ActivityType::Continuous {
            state.continuous.push(state.rows.len());
        }
        state.push_row(row)
    }
}
