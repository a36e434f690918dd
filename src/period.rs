//! Temporal applicability of a regulation.
//!
//! Grounded on `cygne/core/periods.py`. A [`Period`] is built from one
//! inventory row in three steps (parse, validate, expand into one `Period`
//! per date-range), then optionally exploded into its off-hours/off-days
//! complement when the row marks the regulation as an exception.

use crate::calendar::{months_to_date_ranges, parse_days, parse_months};
use crate::curblr::{DaysOfWeek, EffectiveDate, TimeOfDay, TimeSpanCurbLR, DAYS};
use crate::error::CoreError;
use crate::row::InventoryRow;
use chrono::{NaiveDate, NaiveTime};

const SCHOOL_DAYS: [u8; 5] = [0, 1, 2, 3, 4];

fn school_period_1() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(1970, 6, 30).unwrap(),
    )
}

fn school_period_2() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1970, 9, 1).unwrap(),
        NaiveDate::from_ymd_opt(1970, 12, 31).unwrap(),
    )
}

/// The temporal window a regulation applies in: an hour range, a weekday
/// set, and a calendar date range, any of which may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    pub start_hour: Option<NaiveTime>,
    pub end_hour: Option<NaiveTime>,
    pub days: Vec<u8>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Period {
    pub fn empty() -> Self {
        Period {
            start_hour: None,
            end_hour: None,
            days: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }

    pub fn hour_empty(&self) -> bool {
        self.start_hour.is_none() || self.end_hour.is_none()
    }

    pub fn days_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates_empty(&self) -> bool {
        self.start_date.is_none() || self.end_date.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.hour_empty() && self.dates_empty() && self.days_empty()
    }

    /// Builds the list of Periods for one inventory row, applying exemption
    /// inversion and school-mode override where the row requests them.
    pub fn from_row(row: &InventoryRow) -> Result<Vec<Period>, CoreError> {
        let (start_hour, end_hour) = check_hours(row)?;
        let mut days = match row.reg_tmp_jours() {
            Some(expr) => parse_days(&expr.replace(',', "-"))?,
            None => Vec::new(),
        };

        let (mut dates_from, mut dates_to) = check_dates(row)?;

        if row.is_school() {
            if dates_from.iter().any(Option::is_some) || dates_to.iter().any(Option::is_some) {
                log::warn!(
                    "row {}: period specifies dates and a school period",
                    row.globalid_panneau
                );
            }
            let (s1_from, s1_to) = school_period_1();
            let (s2_from, s2_to) = school_period_2();
            dates_from = vec![Some(s1_from), Some(s2_from)];
            dates_to = vec![Some(s1_to), Some(s2_to)];

            if !days.is_empty() {
                log::warn!(
                    "row {}: period specifies days and a school period",
                    row.globalid_panneau
                );
            } else {
                days = SCHOOL_DAYS.to_vec();
            }
        }

        let mut periods: Vec<Period> = dates_from
            .into_iter()
            .zip(dates_to)
            .map(|(from, to)| Period {
                start_hour,
                end_hour,
                days: days.clone(),
                start_date: from,
                end_date: to,
            })
            .collect();

        if row.is_except() {
            let mut inverted = Vec::new();
            for p in &periods {
                inverted.extend(reverse_period(p));
            }
            periods = inverted;
        }

        Ok(periods)
    }

    /// Merges `other` into `self`, per-field: self-empty absorbs other
    /// wholesale; a field set on both sides that disagrees keeps self's
    /// value and logs a warning; a field set only on `other` is adopted.
    pub fn update(&mut self, other: &Period) {
        if self.is_empty() {
            *self = other.clone();
            return;
        }

        if self.start_hour.is_none() && other.start_hour.is_some() {
            self.start_hour = other.start_hour;
        } else if self.start_hour.is_some() && other.start_hour.is_some() {
            log::warn!("period update: conflicting start_hour, keeping existing value");
        }

        if self.end_hour.is_none() && other.end_hour.is_some() {
            self.end_hour = other.end_hour;
        } else if self.end_hour.is_some() && other.end_hour.is_some() {
            log::warn!("period update: conflicting end_hour, keeping existing value");
        }

        if self.days.is_empty() && !other.days.is_empty() {
            self.days = other.days.clone();
        } else if !self.days.is_empty() && !other.days.is_empty() {
            log::warn!("period update: conflicting days, keeping existing value");
        }

        if self.start_date.is_none() && other.start_date.is_some() {
            self.start_date = other.start_date;
        } else if self.start_date.is_some() && other.start_date.is_some() {
            log::warn!("period update: conflicting start_date, keeping existing value");
        }

        if self.end_date.is_none() && other.end_date.is_some() {
            self.end_date = other.end_date;
        } else if self.end_date.is_some() && other.end_date.is_some() {
            log::warn!("period update: conflicting end_date, keeping existing value");
        }
    }

    fn effective_date(&self) -> Option<EffectiveDate> {
        match (self.start_date, self.end_date) {
            (Some(from), Some(to)) => Some(EffectiveDate {
                from: from.format("%m-%d").to_string(),
                to: to.format("%m-%d").to_string(),
            }),
            _ => None,
        }
    }

    fn days_of_week(&self) -> Option<DaysOfWeek> {
        if self.days.is_empty() {
            return None;
        }
        Some(DaysOfWeek {
            days: self.days.iter().map(|&d| DAYS[d as usize]).collect(),
        })
    }

    fn time_of_day(&self) -> Option<TimeOfDay> {
        match (self.start_hour, self.end_hour) {
            (Some(from), Some(to)) => Some(TimeOfDay {
                from: from.format("%H:%M").to_string(),
                to: to.format("%H:%M").to_string(),
            }),
            _ => None,
        }
    }

    /// Renders a non-empty period as a single CurbLR time span; `None` for
    /// an empty period (the caller omits it entirely).
    pub fn to_curblr(&self) -> Option<TimeSpanCurbLR> {
        if self.is_empty() {
            return None;
        }
        Some(TimeSpanCurbLR {
            effective_dates: self.effective_date().into_iter().collect(),
            days_of_week: self.days_of_week(),
            times_of_day: self.time_of_day().into_iter().collect(),
        })
    }
}

fn check_hours(row: &InventoryRow) -> Result<(Option<NaiveTime>, Option<NaiveTime>), CoreError> {
    let start_hour = row
        .reg_tmp_heure_debut()
        .map(|s| parse_time(s, &row.globalid_panneau))
        .transpose()?;
    let end_hour = row
        .reg_tmp_heure_fin()
        .map(|s| parse_time(s, &row.globalid_panneau))
        .transpose()?;

    if start_hour.is_some() != end_hour.is_some() {
        return Err(CoreError::MalformedRow {
            row_id: row.globalid_panneau.clone(),
            reason: "start and end hour must both be set or both absent".to_string(),
        });
    }

    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    if start_hour == Some(midnight) && end_hour == Some(midnight) {
        return Err(CoreError::MalformedRow {
            row_id: row.globalid_panneau.clone(),
            reason: "start hour and end hour cannot both be 00:00".to_string(),
        });
    }

    Ok((start_hour, end_hour))
}

fn parse_time(s: &str, row_id: &str) -> Result<NaiveTime, CoreError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|_| CoreError::MalformedRow {
        row_id: row_id.to_string(),
        reason: format!("unparseable time {s:?}"),
    })
}

fn check_dates(
    row: &InventoryRow,
) -> Result<(Vec<Option<NaiveDate>>, Vec<Option<NaiveDate>>), CoreError> {
    let months = match row.panneau_mois() {
        Some(m) => parse_months(m)?,
        None => Vec::new(),
    };
    let start_day = row.panneau_an_jour_debut;
    let end_day = row.panneau_an_jour_fin;

    if !months.is_empty() && start_day.is_none() && end_day.is_none() {
        return Err(CoreError::MalformedRow {
            row_id: row.globalid_panneau.clone(),
            reason: "months referenced without start/end day".to_string(),
        });
    }
    if months.is_empty() && (start_day.is_some() || end_day.is_some()) {
        return Err(CoreError::MalformedRow {
            row_id: row.globalid_panneau.clone(),
            reason: "start/end day referenced without months".to_string(),
        });
    }

    if months.is_empty() {
        return Ok((vec![None], vec![None]));
    }

    let (from, to) = months_to_date_ranges(
        start_day.unwrap_or(1) as u32,
        end_day.unwrap_or(31) as u32,
        &months,
    );

    if from.len() != to.len() {
        return Err(CoreError::MalformedRow {
            row_id: row.globalid_panneau.clone(),
            reason: "mismatched start/end date counts".to_string(),
        });
    }

    Ok((
        from.into_iter().map(Some).collect(),
        to.into_iter().map(Some).collect(),
    ))
}

/// Rewrites a Period marked as an exception into its complement: the
/// off-hours window on the non-applicable weekdays with dates from the
/// start of year to `start_date`, and the off-hours window from `end_date`
/// to the end of year. Collapses to a single Period if the two coincide.
fn reverse_period(p: &Period) -> Vec<Period> {
    let complement_days: Vec<u8> = (0..7u8).filter(|d| !p.days.contains(d)).collect();

    let first = Period {
        start_hour: p.start_hour.map(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
        end_hour: p.start_hour,
        days: complement_days.clone(),
        start_date: p
            .start_date
            .map(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        end_date: p.start_date,
    };

    let second = Period {
        start_hour: p.end_hour,
        end_hour: p.end_hour.map(|_| NaiveTime::from_hms_opt(23, 59, 0).unwrap()),
        days: complement_days,
        start_date: p.end_date,
        end_date: p
            .end_date
            .map(|_| NaiveDate::from_ymd_opt(1970, 12, 31).unwrap()),
    };

    if first == second {
        vec![first]
    } else {
        vec![first, second]
    }
}
