//! Composition of one [`Rule`] with its applicable [`UserClass`]es and [`Period`]s.
//!
//! Grounded on `cygne/core/regulations.py`. Equality and hashing compare
//! only `rule`, `user_class` and `periods` (matching the source's
//! `__eq__`/`__hash__`, which both omit `other_text`).

use crate::curblr::{RegulationCurbLR, TimeSpanCurbLR};
use crate::error::CoreError;
use crate::period::Period;
use crate::row::InventoryRow;
use crate::rule::Rule;
use crate::user_class::UserClass;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Regulation {
    pub rule: Rule,
    pub user_class: Vec<UserClass>,
    pub periods: Vec<Period>,
    pub other_text: String,
}

impl PartialEq for Regulation {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.user_class == other.user_class && self.periods == other.periods
    }
}
impl Eq for Regulation {}

impl Hash for Regulation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule.hash(state);
        self.user_class.hash(state);
        self.periods.hash(state);
    }
}

impl Regulation {
    /// Builds the Regulation list for one inventory row. When the row's
    /// first user class is an exception, one Regulation is produced per
    /// rule returned by [`Rule::exempt`]; otherwise a single Regulation.
    pub fn from_row(row: &InventoryRow) -> Result<Vec<Regulation>, CoreError> {
        let rule = Rule::from_row(row);
        let user_class = UserClass::from_row(row);
        let periods = Period::from_row(row)?;
        let other_text = row.autre_texte().unwrap_or_default().to_string();

        let except_flags: Vec<bool> = user_class.iter().map(|uc| uc.is_except).collect();
        let any_except = except_flags.iter().any(|e| *e);
        let all_except = except_flags.iter().all(|e| *e);
        if any_except && !all_except {
            return Err(CoreError::InvalidUserClassMix);
        }

        if any_except {
            return Ok(rule
                .exempt()
                .into_iter()
                .map(|r| Regulation {
                    rule: r,
                    user_class: user_class.clone(),
                    periods: periods.clone(),
                    other_text: other_text.clone(),
                })
                .collect());
        }

        Ok(vec![Regulation {
            rule,
            user_class,
            periods,
            other_text,
        }])
    }

    /// Merges `other` into `self`. Requires matching rules; logs and
    /// no-ops when the two are already structurally equal.
    pub fn merge(&mut self, other: &Regulation) -> Result<(), CoreError> {
        if self.rule != other.rule {
            return Err(CoreError::ConflictingRules(
                format!("{:?}", self.rule),
                format!("{:?}", other.rule),
            ));
        }
        if self == other {
            log::warn!("trying to merge two identical regulations for rule {:?}", self.rule);
            return Ok(());
        }
        if self.periods != other.periods {
            self.periods.extend(other.periods.clone());
        }
        if self.user_class != other.user_class {
            self.user_class.extend(other.user_class.clone());
        }
        Ok(())
    }

    /// Renders `{rule, userClasses?, timeSpans?}`.
    pub fn to_curblr(&self) -> RegulationCurbLR {
        let all_except = !self.user_class.is_empty() && self.user_class.iter().all(|uc| uc.is_except);

        let user_classes: Vec<_> = self.user_class.iter().filter_map(UserClass::to_curblr).collect();
        let time_spans = group_periods_for_curblr(&self.periods);

        RegulationCurbLR {
            rule: self.rule.to_curblr(all_except),
            user_classes: (!user_classes.is_empty()).then_some(user_classes),
            time_spans: (!time_spans.is_empty()).then_some(time_spans),
        }
    }
}

/// Groups periods by their weekday set and unions each group's effective
/// dates and times of day, matching `cygne/core/periods.py::period2curblr`.
pub fn group_periods_for_curblr(periods: &[Period]) -> Vec<TimeSpanCurbLR> {
    let mut groups: BTreeMap<Vec<u8>, Vec<&Period>> = BTreeMap::new();
    for p in periods {
        if p.is_empty() {
            continue;
        }
        groups.entry(p.days.clone()).or_default().push(p);
    }

    let mut out = Vec::new();
    for (_, group) in groups {
        let days_of_week = group[0].to_curblr().and_then(|c| c.days_of_week);

        let mut effective_dates = Vec::new();
        let mut times_of_day = Vec::new();
        for p in group {
            if let Some(span) = p.to_curblr() {
                for d in span.effective_dates {
                    if !effective_dates.iter().any(|e: &crate::curblr::EffectiveDate| {
                        e.from == d.from && e.to == d.to
                    }) {
                        effective_dates.push(d);
                    }
                }
                for t in span.times_of_day {
                    if !times_of_day
                        .iter()
                        .any(|e: &crate::curblr::TimeOfDay| e.from == t.from && e.to == t.to)
                    {
                        times_of_day.push(t);
                    }
                }
            }
        }

        out.push(TimeSpanCurbLR {
            effective_dates,
            days_of_week,
            times_of_day,
        });
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn row() -> InventoryRow {
        InventoryRow {
            globalid: "g".into(),
            globalid_panneau: "p".into(),
            id_rp_panneau: None,
            id_objet_ref_ext: None,
            objet_type: None,
            objet_position_seq: Some(1),
            reg_nature: Some("interdiction".into()),
            reg_type_immo: Some("stationnement".into()),
            reg_fleche: None,
            reg_tmp_except: None,
            reg_tmp_ecole: None,
            reg_tmp_heure_debut: None,
            reg_tmp_heure_fin: None,
            reg_tmp_jours: None,
            reg_tmp_duree: None,
            reg_veh_except: None,
            reg_veh_type: None,
            reg_veh_srrr: None,
            reg_handicap: None,
            panneau_mois: None,
            panneau_an_jour_debut: None,
            panneau_an_jour_fin: None,
            panneau_type: None,
            panneau_nb_periodes: None,
            cote_rue_id: 1,
            id_troncon: Some(1),
            geometry_x: 0.0,
            geometry_y: 0.0,
            arrondissement: None,
            autre_texte: None,
        }
    }

    #[test]
    fn builds_single_regulation_without_exception() {
        let regs = Regulation::from_row(&row()).unwrap();
        assert_eq!(regs.len(), 1);
    }

    #[test]
    fn rejects_mixed_except_flags() {
        let mut r = row();
        r.reg_veh_type = Some("residentiel".into());
        r.reg_handicap = Some("oui".into());
        assert!(matches!(
            Regulation::from_row(&r),
            Err(CoreError::InvalidUserClassMix)
        ));
    }

    #[test]
    fn all_except_splits_into_two_regulations() {
        let mut r = row();
        r.reg_nature = Some("permission".into());
        r.reg_veh_except = Some("oui".into());
        r.reg_veh_type = Some("residentiel".into());
        r.reg_handicap = Some("oui".into());
        let regs = Regulation::from_row(&r).unwrap();
        assert_eq!(regs.len(), 2);
    }
}
