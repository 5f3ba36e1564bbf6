//! Validation à la frontière : transforme des enregistrements JSON/CSV
//! permissifs en tâches typées, ou en une liste d'erreurs par tâche.
//!
//! Le planificateur ne revalide rien : tout ce qui passe ici est supposé
//! bien formé.

use crate::model::{Activity, ActivityType, Progress, Task, TaskId, TrackedTask};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Enregistrement brut, tel que fourni par l'appelant. Les alias camelCase
/// acceptent les exports de l'API web.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "ownerName", alias = "owner")]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default, alias = "durationEstimate")]
    pub duration_estimate: Option<f64>,
    #[serde(default, alias = "activityType")]
    pub activity_type: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(default, alias = "actualStartDate")]
    pub actual_start_date: Option<String>,
    #[serde(default, alias = "actualEndDate")]
    pub actual_end_date: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub progress: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("task name is required")]
    MissingName,
    #[error("owner name is required")]
    MissingOwner,
    #[error("duration estimate must be between 0 and {max} days (got {0})", max = Activity::MAX_ESTIMATE)]
    InvalidDuration(f64),
    #[error("unknown activity type: {0}")]
    UnknownActivityType(String),
    #[error("invalid {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("unknown progress value: {0}")]
    UnknownProgress(String),
}

/// Erreur rattachée à une tâche de l'entrée.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskError {
    pub index: usize,
    pub task: String,
    pub issue: ValidationIssue,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task #{} ({}): {}", self.index + 1, self.task, self.issue)
    }
}

/// Toutes les erreurs de toutes les tâches, pas seulement la première.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} invalid task field(s)", .errors.len())]
pub struct ValidationReport {
    pub errors: Vec<TaskError>,
}

/// Champs communs aux deux formes de tâche, une fois validés.
struct CommonFields {
    id: TaskId,
    name: String,
    activity: Activity,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
}

/// Collecte les problèmes d'un enregistrement.
struct Checker<'a> {
    index: usize,
    label: String,
    errors: &'a mut Vec<TaskError>,
}

impl Checker<'_> {
    fn report(&mut self, issue: ValidationIssue) {
        self.errors.push(TaskError {
            index: self.index,
            task: self.label.clone(),
            issue,
        });
    }

    fn date(&mut self, field: &'static str, raw: Option<&str>) -> Option<NaiveDate> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
        match parse_date(raw) {
            Some(date) => Some(date),
            None => {
                self.report(ValidationIssue::InvalidDate {
                    field,
                    value: raw.to_owned(),
                });
                None
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// `YYYY-MM-DD` ou RFC 3339 (la partie date est conservée).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    raw.parse::<DateTime<Utc>>().ok().map(|dt| dt.date_naive())
}

fn check_common(raw: &RawTask, checker: &mut Checker<'_>) -> Option<CommonFields> {
    let before = checker.errors.len();

    let name = non_blank(raw.name.as_deref());
    if name.is_none() {
        checker.report(ValidationIssue::MissingName);
    }

    let estimate = raw.duration_estimate.unwrap_or(Activity::DEFAULT_ESTIMATE);
    if !(0.0..=Activity::MAX_ESTIMATE).contains(&estimate) {
        checker.report(ValidationIssue::InvalidDuration(estimate));
    }

    let kind = match non_blank(raw.activity_type.as_deref()) {
        None => Some(ActivityType::OneTime),
        Some(value) => {
            let parsed = ActivityType::parse(value);
            if parsed.is_none() {
                checker.report(ValidationIssue::UnknownActivityType(value.to_owned()));
            }
            parsed
        }
    };

    let start_date = checker.date("start_date", raw.start_date.as_deref());
    let due_date = checker.date("due_date", raw.due_date.as_deref());

    if checker.errors.len() > before {
        return None;
    }
    let (name, kind) = (name?, kind?);
    Some(CommonFields {
        id: non_blank(raw.id.as_deref())
            .map(TaskId::new)
            .unwrap_or_else(|| TaskId::from_position(checker.index)),
        name: name.to_owned(),
        activity: Activity::from_parts(kind, estimate),
        start_date,
        due_date,
    })
}

fn checker_for<'a>(index: usize, raw: &RawTask, errors: &'a mut Vec<TaskError>) -> Checker<'a> {
    let label = non_blank(raw.name.as_deref())
        .map(str::to_owned)
        .unwrap_or_else(|| "<unnamed>".to_owned());
    Checker {
        index,
        label,
        errors,
    }
}

/// Valide des tâches à propriétaire unique.
pub fn validate_tasks(raw: &[RawTask]) -> Result<Vec<Task>, ValidationReport> {
    let mut errors = Vec::new();
    let mut tasks = Vec::with_capacity(raw.len());

    for (index, record) in raw.iter().enumerate() {
        let mut checker = checker_for(index, record, &mut errors);
        let owner = non_blank(record.owner_name.as_deref());
        if owner.is_none() {
            checker.report(ValidationIssue::MissingOwner);
        }
        let common = check_common(record, &mut checker);
        if let (Some(common), Some(owner)) = (common, owner) {
            tasks.push(Task {
                id: common.id,
                name: common.name,
                owner_name: owner.to_owned(),
                activity: common.activity,
                start_date: common.start_date,
                due_date: common.due_date,
            });
        }
    }

    if errors.is_empty() {
        Ok(tasks)
    } else {
        Err(ValidationReport { errors })
    }
}

/// Valide des tâches suivies : assignés multiples (ou `owner_name` à
/// défaut), dates réelles et avancement.
pub fn validate_tracked_tasks(raw: &[RawTask]) -> Result<Vec<TrackedTask>, ValidationReport> {
    let mut errors = Vec::new();
    let mut tasks = Vec::with_capacity(raw.len());

    for (index, record) in raw.iter().enumerate() {
        let mut checker = checker_for(index, record, &mut errors);
        let before = checker.errors.len();

        let mut assignees: Vec<String> = Vec::new();
        for candidate in &record.assignees {
            if let Some(owner) = non_blank(Some(candidate.as_str())) {
                if !assignees.iter().any(|known| known == owner) {
                    assignees.push(owner.to_owned());
                }
            }
        }
        if assignees.is_empty() {
            assignees.extend(non_blank(record.owner_name.as_deref()).map(str::to_owned));
        }
        if assignees.is_empty() {
            checker.report(ValidationIssue::MissingOwner);
        }

        let actual_start_date = checker.date("actual_start_date", record.actual_start_date.as_deref());
        let actual_end_date = checker.date("actual_end_date", record.actual_end_date.as_deref());
        let progress = match non_blank(record.progress.as_deref()) {
            None => None,
            Some(value) => {
                let parsed = Progress::parse(value);
                if parsed.is_none() {
                    checker.report(ValidationIssue::UnknownProgress(value.to_owned()));
                }
                parsed
            }
        };
        let own_errors = checker.errors.len() > before;

        let common = check_common(record, &mut checker);
        if let Some(common) = common.filter(|_| !own_errors) {
            tasks.push(TrackedTask {
                id: common.id,
                name: common.name,
                assignees,
                activity: common.activity,
                start_date: common.start_date,
                due_date: common.due_date,
                actual_start_date,
                actual_end_date,
                completed: record.completed.unwrap_or(false),
                progress,
            });
        }
    }

    if errors.is_empty() {
        Ok(tasks)
    } else {
        Err(ValidationReport { errors })
    }
}
