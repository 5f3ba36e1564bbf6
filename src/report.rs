use crate::grid::{OccupancyGrid, OwnerGrid};
use std::fmt::Write;

/// Constat de capacité tiré d'une grille d'occupation.
#[derive(Debug, Clone)]
pub struct CapacityReport {
    pub overloaded: Vec<String>,
    pub idle: Vec<String>,
    pub content: String,
}

impl CapacityReport {
    pub fn has_overload(&self) -> bool {
        !self.overloaded.is_empty()
    }
}

/// Permet de customiser le rendu (texte, Markdown, message de chat...).
pub trait ReportRenderer {
    fn render(&self, grid: &OccupancyGrid) -> String;
}

/// Rendu texte brut, une ligne par propriétaire.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render(&self, grid: &OccupancyGrid) -> String {
        let mut out = format!(
            "Capacité sur {} semaine(s), {} jours ouvrés\n",
            grid.total_weeks, grid.total_days
        );
        for owner in &grid.owners {
            // write! sur String ne peut pas échouer
            let _ = writeln!(out, "- {}", owner_line(owner));
        }
        out
    }
}

fn owner_line(grid: &OwnerGrid) -> String {
    let stats = &grid.stats;
    let mut line = format!(
        "{}: {} jour(s) occupé(s), {} libre(s), {:.1}%",
        grid.owner, stats.occupied_days, stats.free_days, stats.utilization
    );
    if stats.has_overload {
        let _ = write!(line, " [SURCHARGE {} jour(s)]", stats.overlapping_days);
    } else if stats.occupied_days == 0 {
        line.push_str(" [INACTIF]");
    }
    line
}

/// Prépare le constat de capacité d'une grille.
pub fn prepare_capacity_report(
    grid: &OccupancyGrid,
    renderer: &dyn ReportRenderer,
) -> CapacityReport {
    CapacityReport {
        overloaded: grid.overloaded_owners().into_iter().map(str::to_owned).collect(),
        idle: grid.idle_owners().into_iter().map(str::to_owned).collect(),
        content: renderer.render(grid),
    }
}
