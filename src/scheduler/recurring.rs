use crate::calendar::{first_day_of_week, WorkingCalendar};
use crate::model::{RowKind, ScheduledTask};

/// Déplie les gabarits RECURRING_WEEKLY en une occurrence par semaine.
#[derive(Debug, Clone, Copy)]
pub struct RecurringExpander {
    calendar: WorkingCalendar,
}

impl RecurringExpander {
    pub fn new(calendar: WorkingCalendar) -> Self {
        Self { calendar }
    }

    /// Une ligne non récurrente revient telle quelle. Un gabarit donne une
    /// occurrence par semaine, de `start_week` à `total_project_weeks`
    /// inclus, placée sur le premier jour ouvré de la semaine. Si le gabarit
    /// commence après la dernière semaine, le résultat est vide.
    pub fn expand(&self, row: &ScheduledTask, total_project_weeks: u32) -> Vec<ScheduledTask> {
        if row.row != RowKind::RecurringTemplate {
            return vec![row.clone()];
        }

        (row.start_week..=total_project_weeks)
            .map(|week| {
                let day = first_day_of_week(week);
                let date = self.calendar.date_for_day(day);
                let mut occurrence = row.clone();
                occurrence.start_day = day;
                occurrence.end_day = day;
                occurrence.start_week = week;
                occurrence.end_week = week;
                occurrence.calculated_start_date = date;
                occurrence.calculated_end_date = date;
                occurrence.row = RowKind::RecurringOccurrence { week };
                occurrence
            })
            .collect()
    }

    pub fn expand_all(&self, rows: &[ScheduledTask], total_project_weeks: u32) -> Vec<ScheduledTask> {
        rows.iter()
            .flat_map(|row| self.expand(row, total_project_weeks))
            .collect()
    }
}
