use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc, Weekday};

/// Jours ouvrés par semaine (lundi → vendredi).
pub const DAYS_PER_WEEK: u32 = 5;

pub const WORKDAY_NAMES: [&str; DAYS_PER_WEEK as usize] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Source de temps injectée : aucun calcul ne lit l'horloge système
/// directement.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Horloge réelle (CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Horloge figée, pour les tests et les recalculs reproductibles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Minuit UTC du jour donné.
    pub fn at_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Ajoute `ceil(n)` jours ouvrés en sautant samedi et dimanche.
/// `n = 0` ne bouge pas ; `0.5` avance d'un jour. Au-delà du calendrier
/// chrono, le résultat sature à `NaiveDate::MAX`.
pub fn add_working_days(start: NaiveDate, n: f64) -> NaiveDate {
    let steps = if n > 0.0 { n.ceil() as u64 } else { 0 };
    if steps == 0 {
        return start;
    }
    // pas à pas jusqu'à un jour ouvré, puis par semaines entières
    let stepped = (steps - 1) % u64::from(DAYS_PER_WEEK) + 1;
    let mut current = start;
    let mut added = 0;
    while added < stepped {
        let Some(next) = current.checked_add_days(Days::new(1)) else {
            return NaiveDate::MAX;
        };
        current = next;
        if is_working_day(current) {
            added += 1;
        }
    }
    let weeks = (steps - stepped) / u64::from(DAYS_PER_WEEK);
    weeks
        .checked_mul(7)
        .and_then(|days| current.checked_add_days(Days::new(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// `ceil(day / 5)` ; le jour 0 (projet vide) donne la semaine 0.
pub fn day_to_week(day: u32) -> u32 {
    day.div_ceil(DAYS_PER_WEEK)
}

/// Premier jour ouvré (absolu) d'une semaine 1-based.
pub fn first_day_of_week(week: u32) -> u32 {
    week.saturating_sub(1)
        .saturating_mul(DAYS_PER_WEEK)
        .saturating_add(1)
}

/// Décompose un jour absolu 1-based en (semaine, rang dans la semaine),
/// tous deux 1-based.
pub fn week_position(day: u32) -> Option<(u32, u32)> {
    if day == 0 {
        return None;
    }
    let zero_based = day - 1;
    Some((
        zero_based / DAYS_PER_WEEK + 1,
        zero_based % DAYS_PER_WEEK + 1,
    ))
}

/// Date de début de projet : la plus ancienne date explicite, sinon le
/// premier jour du mois courant (stable d'un recalcul à l'autre dans le mois).
pub fn select_project_start<I>(dates: I, clock: &dyn Clock) -> NaiveDate
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates.into_iter().min().unwrap_or_else(|| {
        let today = clock.today();
        today.with_day(1).unwrap_or(today)
    })
}

/// Calendrier de travail ancré sur la date de début du projet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingCalendar {
    project_start: NaiveDate,
}

impl WorkingCalendar {
    /// Un début tombant un week-end est reporté au lundi suivant, sinon le
    /// jour 1 ne serait pas un jour ouvré.
    pub fn new(project_start: NaiveDate) -> Self {
        let mut start = project_start;
        while !is_working_day(start) {
            match start.succ_opt() {
                Some(next) => start = next,
                None => break,
            }
        }
        Self {
            project_start: start,
        }
    }

    pub fn project_start(&self) -> NaiveDate {
        self.project_start
    }

    /// Index 1-based : jours ouvrés dans `[début, date)`, plus un. Une date
    /// antérieure au début donne le jour 1 ; un samedi ou un dimanche compte
    /// comme le lundi suivant.
    pub fn date_to_working_day(&self, date: NaiveDate) -> u32 {
        let mut count = 0u32;
        let mut current = self.project_start;
        while current < date {
            if is_working_day(current) {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        count + 1
    }

    /// Date calendaire du jour ouvré `day` (1-based).
    pub fn date_for_day(&self, day: u32) -> NaiveDate {
        add_working_days(self.project_start, f64::from(day.saturating_sub(1)))
    }
}
