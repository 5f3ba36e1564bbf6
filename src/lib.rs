#![forbid(unsafe_code)]
//! Nivellement : planification de charge par propriétaire (sans BD).
//!
//! - Axe des jours ouvrés (lundi → vendredi), jours et semaines 1-based.
//! - Un propriétaire ne traite qu'une tâche bloquante à la fois.
//! - Tâches récurrentes dépliées par semaine, grille d'occupation.
//! - Variante qui gèle les tâches terminées à leurs dates historiques.
//! - Calcul pur : horloge injectée, aucun état partagé entre appels.

pub mod calendar;
pub mod grid;
pub mod io;
pub mod model;
pub mod policy;
pub mod report;
pub mod scheduler;
pub mod validation;

pub use calendar::{Clock, FixedClock, SystemClock, WorkingCalendar};
pub use grid::{DayCell, GridAnomaly, OccupancyGrid, OwnerGrid, OwnerStats};
pub use model::{
    Activity, ActivityType, OwnerTimeline, Progress, RowKind, ScheduledTask, Task, TaskId,
    TrackedTask,
};
pub use policy::{ActivityPolicy, StandardPolicy};
pub use report::{prepare_capacity_report, CapacityReport, ReportRenderer, TextReport};
pub use scheduler::{
    RecurringExpander, Schedule, ScheduleOptions, Scheduler, TaskOrdering, TrackedSchedule,
};
pub use validation::{validate_tasks, validate_tracked_tasks, RawTask, ValidationReport};
