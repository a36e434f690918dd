//! Exercises the CSV deserialization contract the CLI adapter relies on:
//! well-formed rows are read, and a row that fails to deserialize (missing a
//! required numeric field) is reported as an error rather than panicking or
//! silently corrupting neighbouring rows.

use curblr_signalec::row::InventoryRow;

const HEADER: &str = "globalid,globalid_panneau,id_rp_panneau,IdObjetRefExt,ObjetType,ObjetPositionSeq,RegNature,RegTypeImmo,RegFleche,RegTmpExcept,RegTmpEcole,RegTmpHeureDebut,RegTmpHeureFin,RegTmpJours,RegTmpDuree,RegVehExcept,RegVehType,RegVehSRRR,RegHandicap,panneau_mois,panneau_an_jour_debut,panneau_an_jour_fin,panneau_type,panneau_nb_periodes,cote_rue_id,IdTroncon,geometry_x,geometry_y,arrondissement,AutreTexte";

fn row_csv(cote_rue_id: &str, geometry_x: &str, geometry_y: &str) -> String {
    format!(
        "s1,p1,,,,1,interdiction,stationnement,,,,,,,,,,,,,,,,,{cote_rue_id},1,{geometry_x},{geometry_y},Plateau,"
    )
}

#[test]
fn reads_well_formed_rows_and_reports_malformed_ones() {
    let mut csv_text = format!("{HEADER}\n");
    csv_text.push_str(&row_csv("1", "10.0", "20.0"));
    csv_text.push('\n');
    // cote_rue_id is required and numeric; "not-a-number" must fail to parse.
    csv_text.push_str(&row_csv("not-a-number", "10.0", "20.0"));
    csv_text.push('\n');
    csv_text.push_str(&row_csv("11", "30.0", "40.0"));
    csv_text.push('\n');

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut ok_rows = Vec::new();
    let mut errors = Vec::new();
    for record in reader.deserialize::<InventoryRow>() {
        match record {
            Ok(row) => ok_rows.push(row),
            Err(e) => errors.push(e),
        }
    }

    assert_eq!(ok_rows.len(), 2);
    assert_eq!(errors.len(), 1);
    assert_eq!(ok_rows[0].cote_rue_id, 1);
    assert_eq!(ok_rows[1].cote_rue_id, 11);
}
