//! One sign: an arrow direction, its regulations, its location, and identity.
//!
//! Grounded on `cygne/core/panel.py`. `extend_regulation` folds a
//! sub-placard's regulation into its parent sign; `self_merge` collapses
//! duplicate-rule Regulations produced by merging multiple rows under the
//! same sign id; `merge` combines two Panels sharing a `unique_id`.

use crate::enums::{Arrow, SideOfStreet};
use crate::error::CoreError;
use crate::location::Location;
use crate::regulation::Regulation;
use crate::row::InventoryRow;
use geo_types::{LineString, Point};

#[derive(Debug, Clone)]
pub struct Panel {
    pub unique_id: String,
    pub position: Option<i64>,
    pub arrow: Arrow,
    pub regulation: Vec<Regulation>,
    pub location: Location,
    pub nb_period: Option<i64>,
}

impl Panel {
    pub fn from_row(row: &InventoryRow) -> Result<Panel, CoreError> {
        let arrow = match row.reg_fleche() {
            Some("vers rue") => Arrow::Start,
            Some("vers trottoir") => Arrow::End,
            _ => Arrow::NoArrow,
        };

        let side_of_street = SideOfStreet::from_cote_rue_id(row.cote_rue_id);
        let regulation = Regulation::from_row(row)?;

        let mut location = Location::new(
            Point::new(row.geometry_x, row.geometry_y),
            side_of_street,
            row.street_id(),
        );
        location.asset_type = Some("sign".to_string());

        Ok(Panel {
            unique_id: row.globalid_panneau.clone(),
            position: row.objet_position_seq,
            arrow,
            regulation,
            location,
            nb_period: row.panneau_nb_periodes,
        })
    }

    /// Folds a sub-placard's single Regulation into this panel's regulations.
    pub fn extend_regulation(&mut self, incoming: &Regulation) {
        self.extend_period(incoming);
        self.extend_userclass(incoming);
    }

    fn extend_period(&mut self, incoming: &Regulation) {
        let incoming_non_empty = incoming.periods.iter().any(|p| !p.is_empty());
        if !incoming_non_empty {
            return;
        }
        for regulation in &mut self.regulation {
            if regulation.periods.is_empty() {
                regulation.periods = incoming.periods.clone();
                continue;
            }
            regulation.periods = regulation
                .periods
                .iter()
                .flat_map(|period| {
                    incoming.periods.iter().map(move |additional| {
                        let mut period = period.clone();
                        period.update(additional);
                        period
                    })
                })
                .collect();
        }
    }

    fn extend_userclass(&mut self, incoming: &Regulation) {
        let incoming_non_empty = incoming.user_class.iter().any(|uc| !uc.is_empty());
        if !incoming_non_empty {
            return;
        }
        let incoming_is_except = incoming.user_class.first().map(|uc| uc.is_except).unwrap_or(false);

        if incoming_is_except {
            for regulation in &mut self.regulation {
                let new_rules = regulation.rule.exempt();
                if new_rules.len() == 2 {
                    self.regulation.push(Regulation {
                        rule: new_rules[0].clone(),
                        user_class: incoming.user_class.clone(),
                        periods: regulation.periods.clone(),
                        other_text: incoming.other_text.clone(),
                    });
                    break;
                }
            }
        } else {
            for regulation in &mut self.regulation {
                regulation.user_class.extend(incoming.user_class.clone());
            }
        }
    }

    /// Collapses Regulations sharing the same Rule into one, flattening
    /// their periods and user classes and joining `other_text` with `" ; "`.
    pub fn self_merge(&mut self) {
        if self.regulation.len() <= 1 {
            return;
        }

        let mut merged: Vec<Regulation> = Vec::new();
        'outer: for reg in self.regulation.drain(..) {
            for existing in &mut merged {
                if existing.rule == reg.rule {
                    existing.periods.extend(reg.periods);
                    existing.user_class.extend(reg.user_class);
                    if !reg.other_text.is_empty() {
                        if existing.other_text.is_empty() {
                            existing.other_text = reg.other_text;
                        } else {
                            existing.other_text = format!("{} ; {}", existing.other_text, reg.other_text);
                        }
                    }
                    continue 'outer;
                }
            }
            merged.push(reg);
        }
        self.regulation = merged;
    }

    /// Combines two Panels sharing a `unique_id` (duplicate inventory rows).
    /// Both sides self-merge first; Regulations with matching rules are
    /// merged pairwise, and unmatched rules on `other` are appended.
    pub fn merge(&mut self, other: &mut Panel) -> Result<(), CoreError> {
        self.self_merge();
        other.self_merge();

        let mut consumed = vec![false; other.regulation.len()];
        for reg in &mut self.regulation {
            for (i, ot_reg) in other.regulation.iter().enumerate() {
                if !consumed[i] && reg.rule == ot_reg.rule {
                    reg.merge(ot_reg)?;
                    consumed[i] = true;
                    break;
                }
            }
        }

        for (i, ot_reg) in other.regulation.iter().enumerate() {
            if !consumed[i] {
                self.regulation.push(ot_reg.clone());
            }
        }
        Ok(())
    }

    /// Projects this panel's point onto `line`, storing the curvilinear
    /// abscissa on its [`Location`].
    pub fn linear_reference_from_geom(&mut self, line: &LineString<f64>) {
        self.location.linear_reference = crate::linear_ref::project(self.location.point, line);
    }

    /// A stable signature for de-duplication across Panels that share a
    /// `unique_id` but differ structurally (the location/geometry fields
    /// aren't `Hash`, so `Panel` can't derive it).
    pub fn signature(&self) -> String {
        let mut reg_sigs: Vec<String> = self.regulation.iter().map(|r| format!("{r:?}")).collect();
        reg_sigs.sort();
        format!(
            "{:?}|{:?}|{}|{}",
            self.position,
            self.arrow,
            self.location.signature(),
            reg_sigs.join(";")
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::period::Period;
    use crate::rule::Rule;
    use crate::user_class::UserClass;

    fn simple_panel() -> Panel {
        Panel {
            unique_id: "a".into(),
            position: Some(1),
            arrow: Arrow::Start,
            regulation: vec![Regulation {
                rule: Rule {
                    activity: crate::enums::Nature::Interdiction,
                    r#type: "parking".into(),
                    reason: "parking".into(),
                    priority: Some(1),
                    max_stay: None,
                    payment: false,
                    authority: None,
                },
                user_class: vec![],
                periods: vec![],
                other_text: String::new(),
            }],
            location: Location::new(Point::new(0.0, 0.0), SideOfStreet::Right, Some(1)),
            nb_period: None,
        }
    }

    #[test]
    fn self_merge_collapses_duplicate_rules() {
        let mut p = simple_panel();
        p.regulation.push(p.regulation[0].clone());
        p.self_merge();
        assert_eq!(p.regulation.len(), 1);
    }

    #[test]
    fn self_merge_is_idempotent() {
        let mut p = simple_panel();
        p.regulation.push(p.regulation[0].clone());
        p.self_merge();
        let once = p.clone();
        p.self_merge();
        assert_eq!(once.regulation.len(), p.regulation.len());
    }

    #[test]
    fn extend_period_fills_empty_periods() {
        let mut p = simple_panel();
        let incoming = Regulation {
            rule: p.regulation[0].rule.clone(),
            user_class: vec![],
            periods: vec![Period {
                start_hour: None,
                end_hour: None,
                days: vec![0, 1],
                start_date: None,
                end_date: None,
            }],
            other_text: String::new(),
        };
        p.extend_regulation(&incoming);
        assert_eq!(p.regulation[0].periods.len(), 1);
    }

    #[test]
    fn extend_period_takes_cartesian_product_when_both_sides_nonempty() {
        let mut p = simple_panel();
        p.regulation[0].periods = vec![
            Period { start_hour: None, end_hour: None, days: vec![0], start_date: None, end_date: None },
            Period { start_hour: None, end_hour: None, days: vec![1], start_date: None, end_date: None },
        ];
        let incoming = Regulation {
            rule: p.regulation[0].rule.clone(),
            user_class: vec![],
            periods: vec![
                Period { start_hour: None, end_hour: None, days: vec![2], start_date: None, end_date: None },
                Period { start_hour: None, end_hour: None, days: vec![3], start_date: None, end_date: None },
            ],
            other_text: String::new(),
        };
        p.extend_regulation(&incoming);
        assert_eq!(p.regulation[0].periods.len(), 4);
    }

    #[test]
    fn extend_userclass_appends_non_except() {
        let mut p = simple_panel();
        let incoming = Regulation {
            rule: p.regulation[0].rule.clone(),
            user_class: vec![UserClass {
                is_except: false,
                category: vec!["residentiel".into()],
                permit: vec![],
            }],
            periods: vec![],
            other_text: String::new(),
        };
        p.extend_regulation(&incoming);
        assert_eq!(p.regulation[0].user_class.len(), 1);
    }
}
