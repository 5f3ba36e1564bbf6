use crate::grid::OccupancyGrid;
use crate::model::ScheduledTask;
use crate::validation::RawTask;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Import de tâches depuis un tableau JSON.
pub fn import_tasks_json<P: AsRef<Path>>(path: P) -> Result<Vec<RawTask>> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let tasks: Vec<RawTask> =
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(tasks)
}

/// Import depuis CSV: header
/// `name,owner_name[,duration_estimate][,activity_type][,start_date][,due_date]`.
/// Les cellules vides sont laissées à la validation.
pub fn import_tasks_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawTask>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let cell = |i: usize| {
            rec.get(i)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let duration_estimate = cell(2)
            .map(|raw| raw.parse::<f64>())
            .transpose()
            .with_context(|| format!("invalid duration_estimate on row {}", line + 1))?;
        out.push(RawTask {
            name: cell(0),
            owner_name: cell(1),
            duration_estimate,
            activity_type: cell(3),
            start_date: cell(4),
            due_date: cell(5),
            ..RawTask::default()
        });
    }
    Ok(out)
}

/// Écriture atomique (fichier temporaire puis renommage).
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}

/// Export JSON (jolie mise en forme) d'un planning, d'une grille...
pub fn export_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path.as_ref(), &json)
}

/// Export CSV des lignes planifiées: header
/// `id,name,owner_name,activity_type,start_day,end_day,start_week,end_week,start_date,end_date,frozen`
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, rows: &[ScheduledTask]) -> Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "id",
        "name",
        "owner_name",
        "activity_type",
        "start_day",
        "end_day",
        "start_week",
        "end_week",
        "start_date",
        "end_date",
        "frozen",
    ])?;
    let (mut sd, mut ed) = (itoa::Buffer::new(), itoa::Buffer::new());
    let (mut sw, mut ew) = (itoa::Buffer::new(), itoa::Buffer::new());
    for row in rows {
        let start_date = row.calculated_start_date.to_string();
        let end_date = row.calculated_end_date.to_string();
        w.write_record([
            row.task.id.as_str(),
            row.name(),
            row.owner(),
            row.activity_type().as_str(),
            sd.format(row.start_day),
            ed.format(row.end_day),
            sw.format(row.start_week),
            ew.format(row.end_week),
            start_date.as_str(),
            end_date.as_str(),
            if row.is_frozen { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV de la grille aplatie: header `owner,day,week,day_name,tasks,overload`
/// (`tasks` = libellés séparés par `;`).
pub fn export_grid_csv<P: AsRef<Path>>(path: P, grid: &OccupancyGrid) -> Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["owner", "day", "week", "day_name", "tasks", "overload"])?;
    let mut day = itoa::Buffer::new();
    let mut week = itoa::Buffer::new();
    for row in grid.flatten() {
        for cell in &row.cells {
            let labels = cell
                .tasks
                .iter()
                .map(|task| task.label.as_str())
                .collect::<Vec<_>>()
                .join(";");
            w.write_record([
                row.owner.as_str(),
                day.format(cell.absolute_day),
                week.format(cell.week_number),
                cell.day_name,
                labels.as_str(),
                if cell.is_overloaded() { "true" } else { "false" },
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
