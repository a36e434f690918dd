//! Calendar primitives: day-interval parsing and month-run date-range expansion.
//!
//! Grounded on `cygne/core/periods.py` (`parse_days`, `check_dates`,
//! `from_inventory_to_list_date`) and `cygne/core/utils.py`
//! (`safe_end_of_month`). All dates are anchored in a fixed reference year;
//! callers discard the year on export.

use crate::error::CoreError;
use chrono::NaiveDate;

const REFERENCE_YEAR: i32 = 1970;

const DAYS: [&str; 7] = [
    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Parses a French day-interval expression into a sorted list of weekday
/// indices (0 = lundi .. 6 = dimanche).
pub fn parse_days(day: &str) -> Result<Vec<u8>, CoreError> {
    let day = day.trim();
    if day == "dim-sam" {
        return Ok((0..7).collect());
    }
    if let Some(idx) = DAYS.iter().position(|d| *d == day) {
        return Ok(vec![idx as u8]);
    }
    if let Some((first, last)) = day.split_once('-') {
        let first = day_index(first.trim())?;
        let last = day_index(last.trim())?;
        if first > last {
            return Err(CoreError::InvalidDayExpression(day.to_string()));
        }
        return Ok((first..=last).collect());
    }
    if day.contains('+') {
        let mut days = day
            .split('+')
            .map(|d| day_index(d.trim()))
            .collect::<Result<Vec<u8>, CoreError>>()?;
        days.sort_unstable();
        return Ok(days);
    }
    Err(CoreError::InvalidDayExpression(day.to_string()))
}

fn day_index(token: &str) -> Result<u8, CoreError> {
    DAYS.iter()
        .position(|d| *d == token)
        .map(|i| i as u8)
        .ok_or_else(|| CoreError::InvalidDayExpression(token.to_string()))
}

/// Parses a comma-separated list of French month names into 0-indexed month
/// numbers (0 = janvier .. 11 = décembre), sorted ascending.
pub fn parse_months(months: &str) -> Result<Vec<u8>, CoreError> {
    let mut out = months
        .split(',')
        .map(|m| {
            MONTHS
                .iter()
                .position(|name| *name == m.trim())
                .map(|i| i as u8)
                .ok_or_else(|| CoreError::InvalidDayExpression(m.to_string()))
        })
        .collect::<Result<Vec<u8>, CoreError>>()?;
    out.sort_unstable();
    Ok(out)
}

/// The 1970-anchored last day of a (1-indexed) month, per `safe_end_of_month`:
/// day 28 always exists, +4 days always rolls into the next month, then we
/// back up by the resulting day-of-month.
fn safe_end_of_month(month: u32) -> NaiveDate {
    let probe = NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, 28).expect("month in 1..=12")
        + chrono::Days::new(4);
    probe - chrono::Days::new(probe.day() as u64)
}

use chrono::Datelike;

/// Groups a sorted list of 0-indexed months into runs of consecutive months
/// and emits, for each run, a (from, to) date pair using `start_day`/`end_day`
/// clamped to the true end of month when they overflow it.
///
/// Mirrors `from_inventory_to_list_date`: an empty `months` list yields two
/// empty vectors.
pub fn months_to_date_ranges(
    start_day: u32,
    end_day: u32,
    months: &[u8],
) -> (Vec<NaiveDate>, Vec<NaiveDate>) {
    if months.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut dates_from = Vec::new();
    let mut dates_to = Vec::new();

    let mut run_start_idx = 0usize;
    for i in 1..=months.len() {
        let ends_run = i == months.len() || months[i] != months[i - 1] + 1;
        if ends_run {
            let run = &months[run_start_idx..i];
            let first_month = run[0] as u32 + 1;
            let last_month = *run.last().unwrap() as u32 + 1;

            let from = NaiveDate::from_ymd_opt(REFERENCE_YEAR, first_month, start_day)
                .unwrap_or_else(|| safe_end_of_month(first_month));
            let to = NaiveDate::from_ymd_opt(REFERENCE_YEAR, last_month, end_day)
                .unwrap_or_else(|| safe_end_of_month(last_month));

            dates_from.push(from);
            dates_to.push(to);
            run_start_idx = i;
        }
    }

    (dates_from, dates_to)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_simple_ranges() {
        assert_eq!(parse_days("lun-ven").unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(parse_days("lun+mer+ven").unwrap(), vec![0, 2, 4]);
        assert_eq!(parse_days("dim-sam").unwrap(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_days("lundi").unwrap(), vec![0]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_days("xyz").is_err());
        assert!(parse_days("ven-lun").is_err());
    }

    #[test]
    fn groups_consecutive_months() {
        let months = parse_months("janvier,février,mars,juillet").unwrap();
        let (from, to) = months_to_date_ranges(1, 28, &months);
        assert_eq!(from.len(), 2);
        assert_eq!(from[0], NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(to[0], NaiveDate::from_ymd_opt(1970, 3, 28).unwrap());
        assert_eq!(from[1], NaiveDate::from_ymd_opt(1970, 7, 1).unwrap());
    }

    #[test]
    fn clamps_to_end_of_month() {
        let months = parse_months("février").unwrap();
        let (_from, to) = months_to_date_ranges(1, 31, &months);
        assert_eq!(to[0], NaiveDate::from_ymd_opt(1970, 2, 28).unwrap());
    }

    #[test]
    fn empty_months_is_empty() {
        let (from, to) = months_to_date_ranges(1, 28, &[]);
        assert!(from.is_empty() && to.is_empty());
    }
}
