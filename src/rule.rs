//! Activity, type and stay limits a regulation enforces.
//!
//! Grounded on `cygne/core/rule.py`. `exempt()` is the heart of the "except
//! class" handling described in the component design: a permission gets
//! split into a paid/free twin, an interdiction gets flipped to a permission.

use crate::curblr::{Authority, RuleCurbLR};
use crate::enums::Nature;
use crate::error::CoreError;
use crate::row::InventoryRow;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rule {
    pub activity: Nature,
    pub r#type: String,
    pub reason: String,
    pub priority: Option<i64>,
    pub max_stay: Option<i64>,
    pub payment: bool,
    pub authority: Option<String>,
}

impl Rule {
    pub fn is_empty(&self) -> bool {
        self.activity == Nature::Unknown
            && self.r#type.is_empty()
            && self.reason.is_empty()
            && self.priority.is_none()
            && self.max_stay.is_none()
    }

    pub fn from_row(row: &InventoryRow) -> Rule {
        let activity = match row.reg_nature() {
            Some("permission") => Nature::Permission,
            Some(_) => Nature::Interdiction,
            None => Nature::Unknown,
        };

        let r#type = match row.reg_type_immo() {
            Some("arrêt") => "standing".to_string(),
            Some(_) | None => "parking".to_string(),
        };

        let reason = row.panneau_type().unwrap_or(&r#type).to_string();

        Rule {
            activity,
            r#type,
            reason,
            priority: row.objet_position_seq,
            max_stay: row.reg_tmp_duree,
            payment: false,
            authority: row.arrondissement.clone(),
        }
    }

    /// Splits a rule under an "except class" clause. A permission yields two
    /// rules (the original, plus a twin with `max_stay` cleared and `payment`
    /// toggled); an interdiction flips to a permission in place; anything
    /// else is returned unchanged.
    pub fn exempt(&self) -> Vec<Rule> {
        match self.activity {
            Nature::Permission => {
                let mut other = self.clone();
                other.max_stay = None;
                other.payment = !self.payment;
                vec![other, self.clone()]
            }
            Nature::Interdiction => {
                let mut flipped = self.clone();
                flipped.activity = Nature::Permission;
                vec![flipped]
            }
            Nature::Unknown => vec![self.clone()],
        }
    }

    /// Folds `other` into `self`. An empty side is absorbed wholesale;
    /// otherwise activity/type must agree or the merge is rejected.
    pub fn update(&self, other: &Rule) -> Result<Rule, CoreError> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.activity != other.activity || self.r#type != other.r#type {
            return Err(CoreError::ConflictingRules(
                format!("{:?}/{}", self.activity, self.r#type),
                format!("{:?}/{}", other.activity, other.r#type),
            ));
        }

        let mut merged = self.clone();
        if merged.max_stay.is_none() && other.max_stay.is_some() {
            merged.max_stay = other.max_stay;
        }
        Ok(merged)
    }

    /// Renders this rule's CurbLR fragment. `reverse` flips the "no "
    /// prefix, used when the owning regulation's user classes are all
    /// exceptions.
    pub fn to_curblr(&self, reverse: bool) -> RuleCurbLR {
        let is_interdiction = self.activity == Nature::Interdiction;
        let prefix_no = is_interdiction ^ reverse;

        let mut activity = if prefix_no {
            "no ".to_string()
        } else {
            String::new()
        };
        activity.push_str(&self.r#type);

        let priority_category = if !self.reason.is_empty() {
            self.reason.clone()
        } else {
            activity.clone()
        };

        RuleCurbLR {
            activity,
            priority_category,
            max_stay: self.max_stay,
            authority: self.authority.clone().map(|name| Authority {
                name,
                url: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(nature: Option<&str>, type_immo: Option<&str>) -> InventoryRow {
        InventoryRow {
            globalid: "g".into(),
            globalid_panneau: "p".into(),
            id_rp_panneau: None,
            id_objet_ref_ext: None,
            objet_type: None,
            objet_position_seq: Some(2),
            reg_nature: nature.map(str::to_string),
            reg_type_immo: type_immo.map(str::to_string),
            reg_fleche: None,
            reg_tmp_except: None,
            reg_tmp_ecole: None,
            reg_tmp_heure_debut: None,
            reg_tmp_heure_fin: None,
            reg_tmp_jours: None,
            reg_tmp_duree: Some(30),
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
            arrondissement: Some("Plateau".into()),
            autre_texte: None,
        }
    }

    #[test]
    fn normalises_type_aliases() {
        assert_eq!(Rule::from_row(&row(None, Some("stationnement"))).r#type, "parking");
        assert_eq!(Rule::from_row(&row(None, Some("arrêt"))).r#type, "standing");
        assert_eq!(Rule::from_row(&row(None, None)).r#type, "parking");
    }

    #[test]
    fn exempt_splits_permission() {
        let mut r = Rule::from_row(&row(Some("permission"), None));
        r.max_stay = Some(60);
        let split = r.exempt();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].max_stay, None);
        assert!(split[0].payment);
        assert_eq!(split[1].max_stay, Some(60));
    }

    #[test]
    fn exempt_flips_interdiction() {
        let r = Rule::from_row(&row(Some("interdiction"), None));
        let split = r.exempt();
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].activity, Nature::Permission);
    }

    #[test]
    fn to_curblr_prefixes_no_for_interdiction() {
        let r = Rule::from_row(&row(Some("interdiction"), None));
        let curb = r.to_curblr(false);
        assert_eq!(curb.activity, "no parking");
        let curb_rev = r.to_curblr(true);
        assert_eq!(curb_rev.activity, "parking");
    }

    #[test]
    fn update_rejects_conflicting_type() {
        let a = Rule::from_row(&row(Some("interdiction"), Some("stationnement")));
        let b = Rule::from_row(&row(Some("interdiction"), Some("arrêt")));
        assert!(a.update(&b).is_err());
    }
}
