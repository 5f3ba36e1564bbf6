use crate::model::{OwnerTimeline, Progress, ScheduledTask, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordre de traitement des tâches avant nivellement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrdering {
    /// Ordre de l'entrée, FIFO par propriétaire.
    #[default]
    InputOrder,
    /// Tri stable par échéance, les tâches sans échéance en dernier.
    DueDate,
}

/// Options de planification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Une tâche à date de début explicite réserve aussi la ligne de temps de
    /// son propriétaire. Désactivé : la tâche épinglée est invisible au
    /// nivellement et peut être chevauchée.
    pub pinned_tasks_reserve_owner: bool,
    pub ordering: TaskOrdering,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub task_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Résultat du nivellement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub total_project_days: u32,
    pub total_project_weeks: u32,
    pub owner_timelines: BTreeMap<String, OwnerTimeline>,
    pub project_start_date: NaiveDate,
    pub metadata: ScheduleMetadata,
}

impl Schedule {
    pub fn find_task(&self, name: &str) -> Option<&ScheduledTask> {
        self.scheduled_tasks.iter().find(|row| row.name() == name)
    }

    pub fn tasks_for_owner<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a ScheduledTask> {
        self.scheduled_tasks.iter().filter(move |row| row.owner() == owner)
    }
}

/// Résumé d'une ligne dans la vue par propriétaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub name: String,
    pub start_day: u32,
    pub end_day: u32,
    pub status: Progress,
    pub is_frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub owner: String,
    pub next_available_day: u32,
    pub total_tasks: usize,
    pub tasks: Vec<TaskSummary>,
}

/// Résultat de la variante qui gèle les tâches terminées.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSchedule {
    /// Lignes gelées d'abord, puis lignes actives.
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub total_project_days: u32,
    pub total_project_weeks: u32,
    pub owner_timelines: BTreeMap<String, OwnerTimeline>,
    /// Tous les membres connus, y compris ceux sans tâche.
    pub owners: Vec<OwnerSummary>,
    pub project_start_date: NaiveDate,
    pub completed_count: usize,
    pub active_count: usize,
    /// Pourcentage arrondi de lignes gelées.
    pub completion_rate: u32,
    pub metadata: ScheduleMetadata,
}

impl TrackedSchedule {
    pub fn completed_tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.scheduled_tasks.iter().filter(|row| row.is_frozen)
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.scheduled_tasks.iter().filter(|row| !row.is_frozen)
    }

    pub fn owner(&self, name: &str) -> Option<&OwnerSummary> {
        self.owners.iter().find(|summary| summary.owner == name)
    }
}
