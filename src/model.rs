use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiant fort pour Task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    /// Identifiant déterministe dérivé de la position dans l'entrée (1-based).
    pub fn from_position(index: usize) -> Self {
        Self(format!("task-{}", index + 1))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Étiquette de type d'activité, telle qu'elle circule dans le JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    OneTime,
    Buffer,
    Continuous,
    ParallelAllowed,
    #[serde(rename = "API_1_DAY")]
    Api1Day,
    Milestone,
    RecurringWeekly,
}

impl ActivityType {
    pub const ALL: [ActivityType; 7] = [
        ActivityType::OneTime,
        ActivityType::Buffer,
        ActivityType::Continuous,
        ActivityType::ParallelAllowed,
        ActivityType::Api1Day,
        ActivityType::Milestone,
        ActivityType::RecurringWeekly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::OneTime => "ONE_TIME",
            ActivityType::Buffer => "BUFFER",
            ActivityType::Continuous => "CONTINUOUS",
            ActivityType::ParallelAllowed => "PARALLEL_ALLOWED",
            ActivityType::Api1Day => "API_1_DAY",
            ActivityType::Milestone => "MILESTONE",
            ActivityType::RecurringWeekly => "RECURRING_WEEKLY",
        }
    }

    /// Accepte `one_time`, `ONE-TIME`, `One Time`...
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|kind| kind.as_str() == normalized)
    }

    /// Types dont la durée vient de l'estimation fournie.
    pub fn uses_estimate(&self) -> bool {
        matches!(
            self,
            ActivityType::OneTime
                | ActivityType::Buffer
                | ActivityType::Continuous
                | ActivityType::ParallelAllowed
        )
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activité d'une tâche : un enregistrement par type, l'estimation n'existe
/// que pour les types qui l'utilisent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    OneTime { estimate: f64 },
    Buffer { estimate: f64 },
    Continuous { estimate: f64 },
    ParallelAllowed { estimate: f64 },
    #[serde(rename = "API_1_DAY")]
    Api1Day,
    Milestone,
    RecurringWeekly,
}

impl Activity {
    pub const DEFAULT_ESTIMATE: f64 = 1.0;
    /// Plus longue estimation acceptée à la validation : dix ans de jours
    /// ouvrés.
    pub const MAX_ESTIMATE: f64 = 2600.0;

    /// Construit l'activité à partir d'un type et d'une estimation ;
    /// l'estimation est ignorée pour les types à durée fixe.
    pub fn from_parts(kind: ActivityType, estimate: f64) -> Self {
        match kind {
            ActivityType::OneTime => Activity::OneTime { estimate },
            ActivityType::Buffer => Activity::Buffer { estimate },
            ActivityType::Continuous => Activity::Continuous { estimate },
            ActivityType::ParallelAllowed => Activity::ParallelAllowed { estimate },
            ActivityType::Api1Day => Activity::Api1Day,
            ActivityType::Milestone => Activity::Milestone,
            ActivityType::RecurringWeekly => Activity::RecurringWeekly,
        }
    }

    pub fn kind(&self) -> ActivityType {
        match self {
            Activity::OneTime { .. } => ActivityType::OneTime,
            Activity::Buffer { .. } => ActivityType::Buffer,
            Activity::Continuous { .. } => ActivityType::Continuous,
            Activity::ParallelAllowed { .. } => ActivityType::ParallelAllowed,
            Activity::Api1Day => ActivityType::Api1Day,
            Activity::Milestone => ActivityType::Milestone,
            Activity::RecurringWeekly => ActivityType::RecurringWeekly,
        }
    }

    pub fn estimate(&self) -> Option<f64> {
        match self {
            Activity::OneTime { estimate }
            | Activity::Buffer { estimate }
            | Activity::Continuous { estimate }
            | Activity::ParallelAllowed { estimate } => Some(*estimate),
            Activity::Api1Day | Activity::Milestone | Activity::RecurringWeekly => None,
        }
    }
}

impl Default for Activity {
    fn default() -> Self {
        Activity::OneTime {
            estimate: Self::DEFAULT_ESTIMATE,
        }
    }
}

/// Tâche attribuée à un seul propriétaire (le fan-out multi-assignés est
/// fait en amont).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub owner_name: String,
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// L'identifiant reprend le nom. Deux tâches homonymes partageraient donc
    /// le même identifiant dans la grille : leur donner un `with_id` distinct
    /// (la validation numérote déjà `task-<n>`).
    pub fn new<N: Into<String>, O: Into<String>>(name: N, owner: O, activity: Activity) -> Self {
        let name = name.into();
        Self {
            id: TaskId::new(&name),
            name,
            owner_name: owner.into(),
            activity,
            start_date: None,
            due_date: None,
        }
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }
}

/// Avancement déclaré d'une tâche suivie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    NotStarted,
    InProgress,
    Completed,
}

impl Progress {
    pub fn as_str(&self) -> &'static str {
        match self {
            Progress::NotStarted => "not_started",
            Progress::InProgress => "in_progress",
            Progress::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" | "todo" => Some(Progress::NotStarted),
            "in_progress" | "started" => Some(Progress::InProgress),
            "completed" | "done" => Some(Progress::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tâche suivie (variante « completion-safe ») : plusieurs assignés,
/// dates réelles et état d'avancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTask {
    pub id: TaskId,
    pub name: String,
    pub assignees: Vec<String>,
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl TrackedTask {
    pub fn new<N: Into<String>>(name: N, assignees: Vec<String>, activity: Activity) -> Self {
        let name = name.into();
        Self {
            id: TaskId::new(&name),
            name,
            assignees,
            activity,
            start_date: None,
            due_date: None,
            actual_start_date: None,
            actual_end_date: None,
            completed: false,
            progress: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed || self.progress == Some(Progress::Completed)
    }

    /// Début historique : date réelle, sinon date planifiée.
    pub fn recorded_start(&self) -> Option<NaiveDate> {
        self.actual_start_date.or(self.start_date)
    }

    /// Fin historique : date réelle, sinon échéance.
    pub fn recorded_end(&self) -> Option<NaiveDate> {
        self.actual_end_date.or(self.due_date)
    }

    /// Projection sur un seul propriétaire.
    pub fn for_owner(&self, owner: &str) -> Task {
        Task {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_name: owner.to_owned(),
            activity: self.activity,
            start_date: self.start_date,
            due_date: self.due_date,
        }
    }
}

/// Forme d'une ligne planifiée : une tâche récurrente existe d'abord comme
/// gabarit, puis comme occurrences hebdomadaires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    Single,
    RecurringTemplate,
    RecurringOccurrence { week: u32 },
}

impl RowKind {
    pub fn for_activity(kind: ActivityType) -> Self {
        if kind == ActivityType::RecurringWeekly {
            RowKind::RecurringTemplate
        } else {
            RowKind::Single
        }
    }
}

/// Ligne de planning : tâche + position sur l'axe des jours ouvrés.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub task: Task,
    pub start_day: u32,
    pub end_day: u32,
    pub start_week: u32,
    pub end_week: u32,
    pub raw_duration: f64,
    pub effective_duration: u32,
    pub calculated_start_date: NaiveDate,
    pub calculated_end_date: NaiveDate,
    pub is_frozen: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Progress>,
    pub row: RowKind,
}

impl ScheduledTask {
    pub fn activity_type(&self) -> ActivityType {
        self.task.activity.kind()
    }

    pub fn owner(&self) -> &str {
        &self.task.owner_name
    }

    pub fn name(&self) -> &str {
        &self.task.name
    }

    /// Libellé d'affichage ; les récurrences portent leur semaine.
    pub fn label(&self) -> String {
        match self.row {
            RowKind::RecurringOccurrence { week } => format!("{} (W{week})", self.task.name),
            RowKind::Single | RowKind::RecurringTemplate => self.task.name.clone(),
        }
    }
}

/// Disponibilité d'un propriétaire pendant un calcul.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerTimeline {
    pub next_available_day: u32,
    pub total_tasks: usize,
    pub tasks: Vec<String>,
}

impl OwnerTimeline {
    pub fn new() -> Self {
        Self {
            next_available_day: 1,
            total_tasks: 0,
            tasks: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, task_name: &str) {
        self.total_tasks += 1;
        self.tasks.push(task_name.to_owned());
    }
}

impl Default for OwnerTimeline {
    fn default() -> Self {
        Self::new()
    }
}
