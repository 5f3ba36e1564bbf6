#![forbid(unsafe_code)]
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nivellement::{
    io,
    report::{prepare_capacity_report, TextReport},
    validation::{validate_tasks, validate_tracked_tasks, RawTask, ValidationReport},
    Clock, OccupancyGrid, ScheduleOptions, Scheduler, SystemClock, Task, TaskOrdering,
};
use std::path::Path;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de nivellement de charge (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier de tâches (.json ou .csv)
    #[arg(long, global = true, default_value = "tasks.json")]
    tasks: String,

    /// Ordre de traitement des tâches
    #[arg(long, global = true, value_enum, default_value_t = Order::Input)]
    order: Order,

    /// Les tâches à date de début fixée réservent aussi leur propriétaire
    #[arg(long, global = true)]
    reserve_pinned: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Ordre du fichier
    Input,
    /// Échéance croissante, sans échéance en dernier
    DueDate,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Valider le fichier de tâches sans planifier
    Validate {
        /// Valider au format « tâches suivies » (assignés, avancement)
        #[arg(long)]
        tracked: bool,
    },

    /// Planifier et optionnellement exporter
    Schedule {
        /// Déplier les tâches récurrentes semaine par semaine
        #[arg(long)]
        expand: bool,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Construire la grille d'occupation
    Grid {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Planifier en gelant les tâches terminées
    Track {
        /// liste "membre1,membre2,..." (membres sans tâche inclus)
        #[arg(long)]
        roster: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Constat de capacité (surcharge, inactivité)
    Report {
        /// Fichier de sortie (texte brut) ; sinon stdout
        #[arg(long)]
        out: Option<String>,
    },
}

fn load_raw(path: &str) -> Result<Vec<RawTask>> {
    let is_csv = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        io::import_tasks_csv(path)
    } else {
        io::import_tasks_json(path)
    }
}

/// Affiche chaque erreur puis sort en code 1.
fn checked<T>(result: Result<Vec<T>, ValidationReport>) -> Vec<T> {
    match result {
        Ok(tasks) => tasks,
        Err(report) => {
            eprintln!("Validation failed: {report}");
            for error in &report.errors {
                eprintln!("  {error}");
            }
            std::process::exit(1);
        }
    }
}

/// Planning déplié puis grille d'occupation.
fn build_grid(scheduler: &Scheduler, tasks: &[Task], clock: &dyn Clock) -> OccupancyGrid {
    let schedule = scheduler.schedule(tasks, clock);
    let rows = scheduler.expand_recurring(&schedule);
    OccupancyGrid::build(&rows, schedule.total_project_weeks)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let options = ScheduleOptions {
        pinned_tasks_reserve_owner: cli.reserve_pinned,
        ordering: match cli.order {
            Order::Input => TaskOrdering::InputOrder,
            Order::DueDate => TaskOrdering::DueDate,
        },
    };
    let scheduler = Scheduler::new().options(options);
    let clock = SystemClock;
    let raw = load_raw(&cli.tasks)?;

    let code = match cli.cmd {
        Commands::Validate { tracked } => {
            let count = if tracked {
                checked(validate_tracked_tasks(&raw)).len()
            } else {
                checked(validate_tasks(&raw)).len()
            };
            println!("OK: {count} task(s)");
            0
        }
        Commands::Schedule {
            expand,
            out_json,
            out_csv,
        } => {
            let tasks = checked(validate_tasks(&raw));
            let schedule = scheduler.schedule(&tasks, &clock);
            let rows = if expand {
                scheduler.expand_recurring(&schedule)
            } else {
                schedule.scheduled_tasks.clone()
            };
            if let Some(path) = out_json {
                io::export_json(path, &schedule)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &rows)?;
            }
            // impression compacte
            for row in &rows {
                println!(
                    "{} | {} | j{}→j{} | {} → {}",
                    row.owner(),
                    row.label(),
                    row.start_day,
                    row.end_day,
                    row.calculated_start_date,
                    row.calculated_end_date
                );
            }
            println!(
                "{} jour(s), {} semaine(s)",
                schedule.total_project_days, schedule.total_project_weeks
            );
            0
        }
        Commands::Grid { out_json, out_csv } => {
            let grid = build_grid(&scheduler, &checked(validate_tasks(&raw)), &clock);
            if let Some(path) = out_json {
                io::export_json(path, &grid)?;
            }
            if let Some(path) = out_csv {
                io::export_grid_csv(path, &grid)?;
            }
            for owner in &grid.owners {
                println!(
                    "{} | {} occupé(s) | {} libre(s) | {:.1}% | chevauchements {}",
                    owner.owner,
                    owner.stats.occupied_days,
                    owner.stats.free_days,
                    owner.stats.utilization,
                    owner.stats.overlapping_days
                );
            }
            for anomaly in &grid.anomalies {
                eprintln!("anomaly: {anomaly}");
            }
            // Code 2 = WARNING (surcharge)
            if grid.overloaded_owners().is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Track { roster, out_json } => {
            let tasks = checked(validate_tracked_tasks(&raw));
            let roster: Vec<String> = roster
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let tracked = scheduler.schedule_tracked(&tasks, &roster, &clock);
            if let Some(path) = out_json {
                io::export_json(path, &tracked)?;
            }
            println!(
                "{} jour(s), {} semaine(s), {}% terminé",
                tracked.total_project_days, tracked.total_project_weeks, tracked.completion_rate
            );
            for owner in &tracked.owners {
                println!(
                    "{} | {} tâche(s) | prochain jour libre {}",
                    owner.owner, owner.total_tasks, owner.next_available_day
                );
            }
            0
        }
        Commands::Report { out } => {
            let grid = build_grid(&scheduler, &checked(validate_tasks(&raw)), &clock);
            let report = prepare_capacity_report(&grid, &TextReport);
            match out {
                Some(path) => {
                    std::fs::write(&path, &report.content)?;
                    println!("Report written to {path}");
                }
                None => print!("{}", report.content),
            }
            if report.has_overload() {
                2
            } else {
                0
            }
        }
    };

    std::process::exit(code);
}
