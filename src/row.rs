//! Flat record shapes consumed at the I/O boundary.
//!
//! [`InventoryRow`] mirrors one denormalised CSV record: a sign (or
//! sub-placard) joined to its support, its single regulation row, and its
//! temporal period row, the way `signe/preprocessing/inventory.py` joins the
//! four source tables before handing rows to the core. No domain
//! interpretation happens here — every `Option<String>` is parsed by the
//! component that owns its semantics.

use serde::Deserialize;

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// One flat inventory record, deserialized directly from the CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRow {
    pub globalid: String,
    pub globalid_panneau: String,
    pub id_rp_panneau: Option<String>,
    #[serde(rename = "IdObjetRefExt")]
    pub id_objet_ref_ext: Option<String>,
    #[serde(rename = "ObjetType")]
    pub objet_type: Option<String>,
    #[serde(rename = "ObjetPositionSeq")]
    pub objet_position_seq: Option<i64>,

    #[serde(rename = "RegNature")]
    pub reg_nature: Option<String>,
    #[serde(rename = "RegTypeImmo")]
    pub reg_type_immo: Option<String>,
    #[serde(rename = "RegFleche")]
    pub reg_fleche: Option<String>,

    #[serde(rename = "RegTmpExcept")]
    pub reg_tmp_except: Option<String>,
    #[serde(rename = "RegTmpEcole")]
    pub reg_tmp_ecole: Option<String>,
    #[serde(rename = "RegTmpHeureDebut")]
    pub reg_tmp_heure_debut: Option<String>,
    #[serde(rename = "RegTmpHeureFin")]
    pub reg_tmp_heure_fin: Option<String>,
    #[serde(rename = "RegTmpJours")]
    pub reg_tmp_jours: Option<String>,
    #[serde(rename = "RegTmpDuree")]
    pub reg_tmp_duree: Option<i64>,
    #[serde(rename = "RegVehExcept")]
    pub reg_veh_except: Option<String>,
    #[serde(rename = "RegVehType")]
    pub reg_veh_type: Option<String>,
    #[serde(rename = "RegVehSRRR")]
    pub reg_veh_srrr: Option<String>,
    #[serde(rename = "RegHandicap")]
    pub reg_handicap: Option<String>,

    pub panneau_mois: Option<String>,
    pub panneau_an_jour_debut: Option<i64>,
    pub panneau_an_jour_fin: Option<i64>,
    pub panneau_type: Option<String>,
    pub panneau_nb_periodes: Option<i64>,

    pub cote_rue_id: i64,
    #[serde(rename = "IdTroncon")]
    pub id_troncon: Option<i64>,
    pub geometry_x: f64,
    pub geometry_y: f64,
    pub arrondissement: Option<String>,
    #[serde(rename = "AutreTexte")]
    pub autre_texte: Option<String>,
}

impl InventoryRow {
    pub fn reg_nature(&self) -> Option<&str> {
        non_empty(&self.reg_nature)
    }
    pub fn reg_type_immo(&self) -> Option<&str> {
        non_empty(&self.reg_type_immo)
    }
    pub fn reg_fleche(&self) -> Option<&str> {
        non_empty(&self.reg_fleche)
    }
    pub fn is_except(&self) -> bool {
        non_empty(&self.reg_tmp_except) == Some("oui")
    }
    pub fn is_school(&self) -> bool {
        non_empty(&self.reg_tmp_ecole).is_some()
    }
    pub fn reg_tmp_heure_debut(&self) -> Option<&str> {
        non_empty(&self.reg_tmp_heure_debut)
    }
    pub fn reg_tmp_heure_fin(&self) -> Option<&str> {
        non_empty(&self.reg_tmp_heure_fin)
    }
    pub fn reg_tmp_jours(&self) -> Option<&str> {
        non_empty(&self.reg_tmp_jours)
    }
    pub fn panneau_mois(&self) -> Option<&str> {
        non_empty(&self.panneau_mois)
    }
    pub fn is_veh_except(&self) -> bool {
        non_empty(&self.reg_veh_except) == Some("oui")
    }
    pub fn reg_veh_type(&self) -> Option<&str> {
        non_empty(&self.reg_veh_type)
    }
    pub fn reg_veh_srrr(&self) -> Option<&str> {
        non_empty(&self.reg_veh_srrr)
    }
    pub fn is_handicap(&self) -> bool {
        non_empty(&self.reg_handicap) == Some("oui")
    }
    pub fn panneau_type(&self) -> Option<&str> {
        non_empty(&self.panneau_type)
    }
    pub fn autre_texte(&self) -> Option<&str> {
        non_empty(&self.autre_texte)
    }
    pub fn is_sub_placard(&self) -> bool {
        non_empty(&self.objet_type) == Some("panonceau")
    }
    pub fn street_id(&self) -> Option<i64> {
        self.id_troncon.filter(|id| *id >= 0)
    }
}

/// One road-network polyline record, read from the road network GeoJSON.
#[derive(Debug, Clone)]
pub struct RoadFeatureRow {
    pub street_id: i64,
    pub sens_cir: i64,
    pub geometry: geo_types::LineString<f64>,
}
