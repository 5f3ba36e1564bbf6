//! Grille d'occupation : pour chaque propriétaire, une matrice
//! semaines × jours ouvrés indiquant les tâches actives chaque jour.
//!
//! Une cellule portant plus d'une tâche signale une surcharge.

use crate::calendar::{first_day_of_week, week_position, DAYS_PER_WEEK, WORKDAY_NAMES};
use crate::model::{ActivityType, RowKind, ScheduledTask, TaskId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// En-tête d'un jour de la grille.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayHeader {
    pub absolute_day: u32,
    pub week_number: u32,
    /// 1 = lundi … 5 = vendredi
    pub day_of_week: u32,
    pub day_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekHeader {
    pub week_number: u32,
    pub days: Vec<DayHeader>,
}

/// Référence légère vers une tâche, posée dans une cellule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRef {
    pub id: TaskId,
    pub name: String,
    pub label: String,
    pub activity_type: ActivityType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub absolute_day: u32,
    pub week_number: u32,
    pub day_name: &'static str,
    pub tasks: Vec<TaskRef>,
    pub is_empty: bool,
}

impl DayCell {
    fn empty(header: &DayHeader) -> Self {
        Self {
            absolute_day: header.absolute_day,
            week_number: header.week_number,
            day_name: header.day_name,
            tasks: Vec::new(),
            is_empty: true,
        }
    }

    pub fn is_overloaded(&self) -> bool {
        self.tasks.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerStats {
    pub occupied_days: u32,
    pub free_days: u32,
    /// Pourcentage, une décimale.
    pub utilization: f64,
    pub overlapping_days: u32,
    pub has_overload: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerGrid {
    pub owner: String,
    pub weeks: Vec<Vec<DayCell>>,
    pub stats: OwnerStats,
}

impl OwnerGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        let (week, position) = week_position(day)?;
        self.weeks
            .get(week as usize - 1)?
            .get(position as usize - 1)
    }
}

/// Écriture hors de la grille, ignorée plutôt que de déborder sur une
/// cellule voisine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridAnomaly {
    pub owner: String,
    pub task_id: TaskId,
    pub day: u32,
    pub total_days: u32,
}

impl fmt::Display for GridAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} of {} lands on day {} outside 1..={}",
            self.task_id.as_str(),
            self.owner,
            self.day,
            self.total_days
        )
    }
}

/// Vue aplatie : une ligne par propriétaire, une cellule par jour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub owner: String,
    pub cells: Vec<DayCell>,
    pub stats: OwnerStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyGrid {
    pub total_weeks: u32,
    pub total_days: u32,
    pub headers: Vec<WeekHeader>,
    /// Triés par nom.
    pub owners: Vec<OwnerGrid>,
    pub anomalies: Vec<GridAnomaly>,
}

impl OccupancyGrid {
    pub fn build(rows: &[ScheduledTask], total_project_weeks: u32) -> Self {
        Self::build_with_roster::<&str>(rows, total_project_weeks, &[])
    }

    /// Comme `build`, en ajoutant une grille vide pour chaque membre du
    /// roster sans tâche : la capacité inoccupée reste visible.
    pub fn build_with_roster<S: AsRef<str>>(
        rows: &[ScheduledTask],
        total_project_weeks: u32,
        roster: &[S],
    ) -> Self {
        let total_days = total_project_weeks.saturating_mul(DAYS_PER_WEEK);
        let headers = week_headers(total_project_weeks);

        let mut by_owner: BTreeMap<&str, Vec<&ScheduledTask>> = BTreeMap::new();
        for member in roster {
            by_owner.entry(member.as_ref()).or_default();
        }
        for row in rows {
            by_owner.entry(row.owner()).or_default().push(row);
        }

        let mut anomalies = Vec::new();
        let owners = by_owner
            .into_iter()
            .map(|(owner, rows)| {
                let mut weeks: Vec<Vec<DayCell>> = headers
                    .iter()
                    .map(|week| week.days.iter().map(DayCell::empty).collect())
                    .collect();
                for row in rows {
                    for (day, label) in marked_days(row) {
                        if !mark(&mut weeks, day, row, label) {
                            let anomaly = GridAnomaly {
                                owner: owner.to_owned(),
                                task_id: row.task.id.clone(),
                                day,
                                total_days,
                            };
                            warn!(%anomaly, "OccupancyGrid::build: write skipped");
                            anomalies.push(anomaly);
                        }
                    }
                }
                let stats = owner_stats(&weeks, total_days);
                OwnerGrid {
                    owner: owner.to_owned(),
                    weeks,
                    stats,
                }
            })
            .collect();

        Self {
            total_weeks: total_project_weeks,
            total_days,
            headers,
            owners,
            anomalies,
        }
    }

    pub fn owner(&self, name: &str) -> Option<&OwnerGrid> {
        self.owners.iter().find(|grid| grid.owner == name)
    }

    pub fn flatten(&self) -> Vec<FlatRow> {
        self.owners
            .iter()
            .map(|grid| FlatRow {
                owner: grid.owner.clone(),
                cells: grid.cells().cloned().collect(),
                stats: grid.stats.clone(),
            })
            .collect()
    }

    pub fn overloaded_owners(&self) -> Vec<&str> {
        self.owners
            .iter()
            .filter(|grid| grid.stats.has_overload)
            .map(|grid| grid.owner.as_str())
            .collect()
    }

    /// Propriétaires sans aucun jour occupé.
    pub fn idle_owners(&self) -> Vec<&str> {
        self.owners
            .iter()
            .filter(|grid| grid.stats.occupied_days == 0)
            .map(|grid| grid.owner.as_str())
            .collect()
    }
}

fn week_headers(total_weeks: u32) -> Vec<WeekHeader> {
    (1..=total_weeks)
        .map(|week_number| WeekHeader {
            week_number,
            days: (1..=DAYS_PER_WEEK)
                .map(|day_of_week| DayHeader {
                    absolute_day: first_day_of_week(week_number) + day_of_week - 1,
                    week_number,
                    day_of_week,
                    day_name: WORKDAY_NAMES[day_of_week as usize - 1],
                })
                .collect(),
        })
        .collect()
}

/// Jours occupés par une ligne, avec le libellé à afficher pour chacun.
fn marked_days(row: &ScheduledTask) -> Vec<(u32, String)> {
    match (row.activity_type(), row.row) {
        (ActivityType::Milestone, _) => vec![(row.start_day, row.label())],
        (_, RowKind::RecurringTemplate) => (row.start_week..=row.end_week)
            .map(|week| (first_day_of_week(week), format!("{} (W{week})", row.name())))
            .collect(),
        _ => (row.start_day..=row.end_day)
            .map(|day| (day, row.label()))
            .collect(),
    }
}

fn mark(weeks: &mut [Vec<DayCell>], day: u32, row: &ScheduledTask, label: String) -> bool {
    let Some((week, position)) = week_position(day) else {
        return false;
    };
    let Some(cell) = weeks
        .get_mut(week as usize - 1)
        .and_then(|days| days.get_mut(position as usize - 1))
    else {
        return false;
    };
    cell.tasks.push(TaskRef {
        id: row.task.id.clone(),
        name: row.task.name.clone(),
        label,
        activity_type: row.activity_type(),
    });
    cell.is_empty = false;
    true
}

fn owner_stats(weeks: &[Vec<DayCell>], total_days: u32) -> OwnerStats {
    let cells = weeks.iter().flatten();
    let occupied_days = cells.clone().filter(|cell| !cell.is_empty).count() as u32;
    let overlapping_days = cells.filter(|cell| cell.is_overloaded()).count() as u32;
    let utilization = if total_days == 0 {
        0.0
    } else {
        (f64::from(occupied_days) / f64::from(total_days) * 1000.0).round() / 10.0
    };
    OwnerStats {
        occupied_days,
        free_days: total_days - occupied_days,
        utilization,
        overlapping_days,
        has_overload: overlapping_days > 0,
    }
}
