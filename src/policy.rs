use crate::model::{Activity, ActivityType};

/// Règles de durée et de chevauchement par type d'activité.
pub trait ActivityPolicy {
    /// Durée nominale en jours ouvrés (fractions autorisées).
    fn duration_days(&self, activity: &Activity) -> f64;
    /// Une tâche chevauchable ne bloque pas, et n'est pas bloquée par, la
    /// ligne de temps de son propriétaire.
    fn can_overlap(&self, kind: ActivityType) -> bool;
}

/// Table standard :
///
/// | Type | Durée |
/// |---|---|
/// | ONE_TIME / BUFFER / CONTINUOUS / PARALLEL_ALLOWED | estimation |
/// | API_1_DAY | 1 |
/// | MILESTONE | 0 |
/// | RECURRING_WEEKLY | 1 (par occurrence) |
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPolicy;

impl ActivityPolicy for StandardPolicy {
    fn duration_days(&self, activity: &Activity) -> f64 {
        match activity {
            Activity::OneTime { estimate }
            | Activity::Buffer { estimate }
            | Activity::Continuous { estimate }
            | Activity::ParallelAllowed { estimate } => *estimate,
            Activity::Api1Day => 1.0,
            Activity::Milestone => 0.0,
            Activity::RecurringWeekly => 1.0,
        }
    }

    fn can_overlap(&self, kind: ActivityType) -> bool {
        kind == ActivityType::ParallelAllowed
    }
}

/// Durée arrondie pour la mise en page : 0 reste 0, sinon au moins un jour.
/// Sature à `u32::MAX`.
pub fn effective_duration(duration_days: f64) -> u32 {
    if duration_days == 0.0 {
        0
    } else {
        (duration_days.ceil() as u32).max(1)
    }
}
