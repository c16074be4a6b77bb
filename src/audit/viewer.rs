//! Reading audit entries back for the `log` command.

use super::audit_file_path;
use crate::error::{CheckoutError, Result};
use chrono::{Days, NaiveDate};
use std::fs;
use std::path::Path;

/// Largest day count accepted by [`LogSelection::LastDays`] and [`LogSelection::DaysAgo`].
pub const MAX_DAYS: u32 = 99;

/// Default window when no selection is given.
pub const DEFAULT_DAYS: u32 = 7;

/// Which days of audit entries to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSelection {
    /// Today and the N-1 days before it.
    LastDays(u32),
    /// The single day N days before today.
    DaysAgo(u32),
    Date(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Default for LogSelection {
    fn default() -> Self {
        LogSelection::LastDays(DEFAULT_DAYS)
    }
}

impl LogSelection {
    /// Build a selection from `log` command arguments.
    ///
    /// A positive `days` selects the last N days, a negative one the single day
    /// N days ago. At most one selector may be given.
    pub fn from_args(
        days: Option<i32>,
        date: Option<&str>,
        month: Option<&str>,
        year: Option<&str>,
    ) -> Result<Self> {
        let given = [days.is_some(), date.is_some(), month.is_some(), year.is_some()]
            .iter()
            .filter(|g| **g)
            .count();
        if given > 1 {
            return Err(CheckoutError::UserError(
                "choose only one of N, --date, --month or --year".to_string(),
            ));
        }

        if let Some(days) = days {
            let n = days.unsigned_abs();
            if n == 0 || n > MAX_DAYS {
                return Err(CheckoutError::UserError(format!(
                    "day count must be between 1 and {} (or -{} and -1), got {}",
                    MAX_DAYS, MAX_DAYS, days
                )));
            }
            return Ok(if days > 0 {
                LogSelection::LastDays(n)
            } else {
                LogSelection::DaysAgo(n)
            });
        }

        if let Some(date) = date {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                CheckoutError::UserError(format!("invalid date '{}': expected YYYY-M-D", date))
            })?;
            return Ok(LogSelection::Date(parsed));
        }

        if let Some(month) = month {
            let invalid = || {
                CheckoutError::UserError(format!("invalid month '{}': expected YYYY-M", month))
            };
            let (y, m) = month.split_once('-').ok_or_else(invalid)?;
            let year: i32 = y.parse().map_err(|_| invalid())?;
            let month: u32 = m.parse().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
            return Ok(LogSelection::Month { year, month });
        }

        if let Some(year) = year {
            let parsed: i32 = year.parse().map_err(|_| {
                CheckoutError::UserError(format!("invalid year '{}': expected YYYY", year))
            })?;
            return Ok(LogSelection::Year(parsed));
        }

        Ok(LogSelection::default())
    }
}

/// Audit lines recorded on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLog {
    pub date: NaiveDate,
    pub lines: Vec<String>,
}

/// Read the selected days, oldest first.
///
/// Day-count and single-date selections include days with no entries so the
/// caller can report them; month and year selections list only days that have
/// a log file.
pub fn read_selection(
    audit_dir: &Path,
    selection: &LogSelection,
    today: NaiveDate,
) -> Result<Vec<DayLog>> {
    let dates = match *selection {
        LogSelection::LastDays(n) => (0..n)
            .rev()
            .filter_map(|ago| today.checked_sub_days(Days::new(u64::from(ago))))
            .collect(),
        LogSelection::DaysAgo(n) => today
            .checked_sub_days(Days::new(u64::from(n)))
            .into_iter()
            .collect(),
        LogSelection::Date(date) => vec![date],
        LogSelection::Month { year, month } => {
            logged_dates(&audit_dir.join(year.to_string()).join(month.to_string()))?
        }
        LogSelection::Year(year) => {
            let mut dates = Vec::new();
            for month in 1..=12u32 {
                dates.extend(logged_dates(
                    &audit_dir.join(year.to_string()).join(month.to_string()),
                )?);
            }
            dates
        }
    };

    dates
        .into_iter()
        .map(|date| read_day(audit_dir, date))
        .collect()
}

fn read_day(audit_dir: &Path, date: NaiveDate) -> Result<DayLog> {
    let path = audit_file_path(audit_dir, date);
    let lines = match fs::read_to_string(&path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            return Err(CheckoutError::Audit(format!(
                "failed to read audit file '{}': {}",
                path.display(),
                e
            )));
        }
    };
    Ok(DayLog { date, lines })
}

/// Dates with a `<YYYY-MM-DD>.log` file in `dir`, sorted.
fn logged_dates(dir: &Path) -> Result<Vec<NaiveDate>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CheckoutError::Audit(format!(
                "failed to read audit directory '{}': {}",
                dir.display(),
                e
            )));
        }
    };

    let mut dates: Vec<NaiveDate> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let stem = name.to_str()?.strip_suffix(".log")?.to_string();
            NaiveDate::parse_from_str(&stem, "%Y-%m-%d").ok()
        })
        .collect();
    dates.sort();
    Ok(dates)
}
