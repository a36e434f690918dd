//! Vehicle category / permit set a regulation applies to, and its exemption flag.
//!
//! Grounded on `cygne/core/user_class.py`.

use crate::curblr::UserClassCurbLR;
use crate::row::InventoryRow;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserClass {
    pub is_except: bool,
    pub category: Vec<String>,
    pub permit: Vec<String>,
}

impl UserClass {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.permit.is_empty()
    }

    /// Builds the UserClass list for one row: the primary class, plus a
    /// separate `is_except` handicap class when the row's handicap flag is set.
    pub fn from_row(row: &InventoryRow) -> Vec<UserClass> {
        let category = row
            .reg_veh_type()
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        let permit: Vec<String> = row
            .reg_veh_srrr()
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let mut classes = vec![UserClass {
            is_except: row.is_veh_except(),
            category,
            permit,
        }];

        if row.is_handicap() {
            classes.push(UserClass {
                is_except: true,
                category: vec!["handicap".to_string()],
                permit: Vec::new(),
            });
        }

        classes
    }

    pub fn to_curblr(&self) -> Option<UserClassCurbLR> {
        if self.is_empty() {
            return None;
        }
        Some(UserClassCurbLR {
            classes: self.category.clone(),
            subclasses: self.permit.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row_with(handicap: bool, except: bool) -> InventoryRow {
        InventoryRow {
            globalid: "g".into(),
            globalid_panneau: "p".into(),
            id_rp_panneau: None,
            id_objet_ref_ext: None,
            objet_type: None,
            objet_position_seq: None,
            reg_nature: None,
            reg_type_immo: None,
            reg_fleche: None,
            reg_tmp_except: None,
            reg_tmp_ecole: None,
            reg_tmp_heure_debut: None,
            reg_tmp_heure_fin: None,
            reg_tmp_jours: None,
            reg_tmp_duree: None,
            reg_veh_except: except.then(|| "oui".to_string()),
            reg_veh_type: Some("residentiel".into()),
            reg_veh_srrr: None,
            reg_handicap: handicap.then(|| "oui".to_string()),
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
    fn handicap_adds_a_second_class() {
        let classes = UserClass::from_row(&row_with(true, false));
        assert_eq!(classes.len(), 2);
        assert!(classes[1].is_except);
        assert_eq!(classes[1].category, vec!["handicap"]);
    }

    #[test]
    fn no_handicap_is_single_class() {
        let classes = UserClass::from_row(&row_with(false, true));
        assert_eq!(classes.len(), 1);
        assert!(classes[0].is_except);
    }
}
