//! The consolidation engine: ingestion, enrichment, segmenting and feature
//! materialisation.
//!
//! Grounded on `cygne/preprocessing/inventory.py` and `signe/core/inventory.py`.
//! This module owns the only mapping from `unique_id` to [`Panel`] in the
//! crate; nothing else constructs or mutates that map.

use crate::curblr::{self, Document, Feature, FeatureProperties, GeometryLineString};
use crate::enums::{SideOfStreet, TrafficDir};
use crate::error::CoreError;
use crate::panel::Panel;
use crate::regulation::Regulation;
use crate::road_network::RoadNetwork;
use crate::row::InventoryRow;
use crate::segment::{build_segments, ChainEntry, Interval};
use std::collections::{BTreeSet, HashMap};

pub struct Engine {
    panels: HashMap<String, Panel>,
}

struct SegmentGroup {
    street_id: Option<i64>,
    side: SideOfStreet,
    reversed: bool,
    road_length: f64,
    road_geometry: Option<geo_types::LineString<f64>>,
    asset_type: Option<String>,
    regulation: Regulation,
    entries: Vec<(String, f64)>,
    intervals: Vec<Interval>,
}

impl Engine {
    /// Ingests flat rows: groups by support id, folds sub-placards into
    /// their parent sign via `extend_regulation`, then folds duplicate rows
    /// sharing a `unique_id` via `Panel::merge`, and finally drops any
    /// panel that is a structural duplicate of one already kept.
    pub fn from_rows(rows: &[InventoryRow]) -> Result<Engine, CoreError> {
        let mut by_support: HashMap<&str, Vec<&InventoryRow>> = HashMap::new();
        for row in rows {
            by_support.entry(row.globalid.as_str()).or_default().push(row);
        }

        let mut grouped: HashMap<String, Vec<Panel>> = HashMap::new();

        for support_rows in by_support.values() {
            let (primaries, placards): (Vec<&&InventoryRow>, Vec<&&InventoryRow>) =
                support_rows.iter().partition(|r| !r.is_sub_placard());

            for primary_row in &primaries {
                let mut panel = match Panel::from_row(primary_row) {
                    Ok(p) => p,
                    Err(e) => {
                        log::warn!("skipping malformed sign {}: {e}", primary_row.globalid_panneau);
                        continue;
                    }
                };

                for placard_row in placards
                    .iter()
                    .filter(|p| p.id_objet_ref_ext.as_deref() == primary_row.id_rp_panneau.as_deref())
                {
                    let sub_regulations = match Regulation::from_row(placard_row) {
                        Ok(regs) => regs,
                        Err(e) => {
                            log::warn!(
                                "skipping malformed sub-placard for sign {}: {e}",
                                primary_row.globalid_panneau
                            );
                            continue;
                        }
                    };
                    for reg in &sub_regulations {
                        panel.extend_regulation(reg);
                    }
                }

                grouped.entry(panel.unique_id.clone()).or_default().push(panel);
            }
        }

        let mut panels: HashMap<String, Panel> = HashMap::new();
        for (unique_id, mut group) in grouped {
            let mut merged = group.remove(0);
            for mut other in group {
                merged.merge(&mut other)?;
            }
            panels.insert(unique_id, merged);
        }

        let mut seen_signatures: HashMap<String, String> = HashMap::new();
        let mut deduped: HashMap<String, Panel> = HashMap::new();
        for (id, panel) in panels {
            let sig = panel.signature();
            if let Some(existing_id) = seen_signatures.get(&sig) {
                log::info!(
                    "panel {id} is a structural duplicate of {existing_id}, dropping"
                );
                continue;
            }
            seen_signatures.insert(sig, id.clone());
            deduped.insert(id, panel);
        }

        Ok(Engine { panels: deduped })
    }

    pub fn panels(&self) -> &HashMap<String, Panel> {
        &self.panels
    }

    /// Resolves each Panel's street, falling back to the nearest road by
    /// spatial index when the row's street id is absent or unknown, and
    /// records the traffic direction, road geometry and linear reference.
    pub fn enrich(&mut self, roads: &RoadNetwork) {
        for panel in self.panels.values_mut() {
            let record = match panel.location.street_id.and_then(|id| roads.get(id)) {
                Some(record) => record,
                None => match roads.nearest(panel.location.point) {
                    Some(record) => {
                        log::warn!(
                            "panel {}: unknown street id {:?}, inferred nearest street {}",
                            panel.unique_id,
                            panel.location.street_id,
                            record.street_id
                        );
                        record
                    }
                    None => {
                        log::warn!(
                            "panel {}: no road network available to enrich against",
                            panel.unique_id
                        );
                        continue;
                    }
                },
            };

            panel.location.street_id = Some(record.street_id);
            panel.location.traffic_dir = record.traffic_dir;
            panel.location.road_geometry = Some(record.geometry.clone());
            panel.location.road_length = record.length;
            panel.linear_reference_from_geom(&record.geometry);
        }
    }

    /// Returns the ids of panels whose arrow transition violated the chain
    /// state machine (double-open / orphan-close), without building geometry.
    pub fn check_chains(&self) -> Vec<String> {
        let (_, problems) = self.build_groups();
        problems
    }

    /// Groups panels by `(street_id, side)`, normalises direction, builds
    /// arrow-chain segments per distinct regulation, and returns the
    /// resulting groups alongside the accumulated chain-order problems.
    fn build_groups(&self) -> (Vec<SegmentGroup>, Vec<String>) {
        let mut by_street_side: HashMap<(Option<i64>, SideOfStreet), Vec<&Panel>> = HashMap::new();
        for panel in self.panels.values() {
            by_street_side
                .entry((panel.location.street_id, panel.location.side_of_street))
                .or_default()
                .push(panel);
        }

        let mut groups = Vec::new();
        let mut all_problems = Vec::new();

        for ((street_id, side), mut panels) in by_street_side {
            panels.sort_by(|a, b| {
                a.location
                    .linear_reference
                    .partial_cmp(&b.location.linear_reference)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let road_length = panels
                .first()
                .map(|p| p.location.road_length)
                .unwrap_or(0.0)
                .max(0.0);
            let road_geometry = panels.first().and_then(|p| p.location.road_geometry.clone());
            let asset_type = panels.first().and_then(|p| p.location.asset_type.clone());

            let reversed = panels.first().map_or(false, |p| {
                matches!(p.location.traffic_dir, TrafficDir::ReverseDir)
                    || (matches!(p.location.traffic_dir, TrafficDir::BothDir) && side == SideOfStreet::Left)
            });

            let mut ordered = panels.clone();
            if reversed {
                ordered.reverse();
            }

            // panel id -> working abscissa in the (possibly reversed) reading direction
            let working: Vec<(&Panel, f64)> = ordered
                .iter()
                .map(|p| {
                    let s = p.location.linear_reference;
                    let w = if reversed { road_length - s } else { s };
                    (*p, w)
                })
                .collect();

            let mut by_signature: HashMap<String, (Regulation, Vec<(String, f64)>)> = HashMap::new();
            for (panel, w) in &working {
                for reg in &panel.regulation {
                    let sig = regulation_signature(reg);
                    let entry = by_signature
                        .entry(sig)
                        .or_insert_with(|| (reg.clone(), Vec::new()));
                    entry.1.push((panel.unique_id.clone(), *w));
                }
            }

            for (_, (regulation, mut entries)) in by_signature {
                entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

                // Reversal flips which end of the physical regulation window a
                // START/END sign marks, since the window is read in the opposite
                // order; NO_ARROW is symmetric and stays put.
                let arrow_lookup: HashMap<&str, _> = working
                    .iter()
                    .map(|(p, _)| {
                        let arrow = if reversed {
                            match p.arrow {
                                crate::enums::Arrow::Start => crate::enums::Arrow::End,
                                crate::enums::Arrow::End => crate::enums::Arrow::Start,
                                crate::enums::Arrow::NoArrow => crate::enums::Arrow::NoArrow,
                            }
                        } else {
                            p.arrow
                        };
                        (p.unique_id.as_str(), arrow)
                    })
                    .collect();

                let chain: Vec<ChainEntry> = entries
                    .iter()
                    .map(|(id, w)| ChainEntry {
                        panel_id: id.as_str(),
                        abscissa: *w,
                        arrow: arrow_lookup[id.as_str()],
                    })
                    .collect();

                let (intervals, problems) = build_segments(&chain);
                all_problems.extend(problems);

                groups.push(SegmentGroup {
                    street_id,
                    side,
                    reversed,
                    road_length,
                    road_geometry: road_geometry.clone(),
                    asset_type: asset_type.clone(),
                    regulation,
                    entries,
                    intervals,
                });
            }
        }

        (groups, all_problems)
    }

    /// Cuts each segment's geometry, attaches provenance, and renders the
    /// CurbLR document.
    pub fn to_curblr(&self) -> Document {
        let (groups, _problems) = self.build_groups();

        let mut rendered: Vec<(Option<i64>, SideOfStreet, String, f64, Feature)> = Vec::new();
        let mut observed: BTreeSet<String> = BTreeSet::new();

        for group in &groups {
            let sig = regulation_signature(&group.regulation);
            let curblr_reg = group.regulation.to_curblr();
            observed.insert(curblr_reg.rule.activity.clone());
            observed.insert(curblr_reg.rule.priority_category.clone());

            let Some(geometry) = &group.road_geometry else {
                continue;
            };

            for interval in &group.intervals {
                let working_end = if interval.end.is_infinite() {
                    group.road_length
                } else {
                    interval.end
                };
                let working_start = interval.start;

                let (final_start, final_end) = if group.reversed {
                    (
                        group.road_length - working_end,
                        group.road_length - working_start,
                    )
                } else {
                    (working_start, working_end)
                };

                let Some(cut) = crate::linear_ref::cut(geometry, final_start, final_end) else {
                    log::warn!(
                        "empty geometry cut for street {:?} side {:?} [{},{}]",
                        group.street_id,
                        group.side,
                        final_start,
                        final_end
                    );
                    continue;
                };

                let derived_from: Vec<String> = group
                    .entries
                    .iter()
                    .filter(|(_, w)| *w >= working_start && *w <= working_end)
                    .map(|(id, _)| id.clone())
                    .collect();

                let location = curblr::LocationCurbLR {
                    shst_ref_id: group.street_id.map(|id| id.to_string()).unwrap_or_default(),
                    shst_location_start: final_start,
                    shst_location_end: final_end,
                    side_of_street: group.side.as_curblr_str(),
                    object_id: -1,
                    derived_from,
                    asset_type: group.asset_type.clone(),
                };

                let feature = Feature {
                    kind: "Feature".to_string(),
                    properties: FeatureProperties {
                        location,
                        regulations: vec![group.regulation.to_curblr()],
                    },
                    geometry: GeometryLineString::from(&cut),
                };

                rendered.push((group.street_id, group.side, sig.clone(), final_start, feature));
            }
        }

        rendered.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
                .then(a.3.partial_cmp(&b.3).unwrap_or(std::cmp::Ordering::Equal))
        });

        let features: Vec<Feature> = rendered
            .into_iter()
            .enumerate()
            .map(|(i, (_, _, _, _, mut feature))| {
                feature.properties.location.object_id = i as i64;
                feature
            })
            .collect();

        Document {
            manifest: curblr::Manifest::with_priority_hierarchy(observed),
            kind: "FeatureCollection".to_string(),
            crs: curblr::Crs::default(),
            features,
        }
    }
}

fn regulation_signature(reg: &Regulation) -> String {
    let mut periods = reg.periods.clone();
    periods.sort_by(|a, b| format!("{a:?}").cmp(&format!("{b:?}")));
    let mut classes = reg.user_class.clone();
    classes.sort_by(|a, b| format!("{a:?}").cmp(&format!("{b:?}")));
    format!("{:?}|{:?}|{:?}", reg.rule, periods, classes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(globalid_panneau: &str, cote_rue_id: i64, x: f64, y: f64, fleche: Option<&str>) -> InventoryRow {
        InventoryRow {
            globalid: format!("support-{globalid_panneau}"),
            globalid_panneau: globalid_panneau.to_string(),
            id_rp_panneau: None,
            id_objet_ref_ext: None,
            objet_type: None,
            objet_position_seq: Some(1),
            reg_nature: Some("interdiction".into()),
            reg_type_immo: Some("stationnement".into()),
            reg_fleche: fleche.map(str::to_string),
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
            cote_rue_id,
            id_troncon: Some(1),
            geometry_x: x,
            geometry_y: y,
            arrondissement: Some("Plateau".into()),
            autre_texte: None,
        }
    }

    fn straight_road(street_id: i64, sens_cir: i64, length: f64) -> RoadNetwork {
        RoadNetwork::from_rows(vec![crate::row::RoadFeatureRow {
            street_id,
            sens_cir,
            geometry: geo_types::LineString::from(vec![(0.0, 0.0), (length, 0.0)]),
        }])
    }

    #[test]
    fn s5_start_no_arrow_end_yields_two_segments() {
        let rows = vec![
            row("a", 1, 10.0, 0.0, Some("vers rue")),
            row("b", 1, 40.0, 0.0, None),
            row("c", 1, 80.0, 0.0, Some("vers trottoir")),
        ];
        let mut engine = Engine::from_rows(&rows).unwrap();
        engine.enrich(&straight_road(1, 1, 100.0));
        assert!(engine.check_chains().is_empty());

        let doc = engine.to_curblr();
        let mut starts: Vec<f64> = doc
            .features
            .iter()
            .map(|f| f.properties.location.shst_location_start)
            .collect();
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(starts, vec![10.0, 40.0]);
        let mut ends: Vec<f64> = doc
            .features
            .iter()
            .map(|f| f.properties.location.shst_location_end)
            .collect();
        ends.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(ends, vec![40.0, 80.0]);
    }

    #[test]
    fn s6_reversed_road_round_trips_abscissas() {
        let rows = vec![
            row("a", 1, 30.0, 0.0, Some("vers rue")),
            row("b", 1, 70.0, 0.0, Some("vers trottoir")),
        ];
        let mut engine = Engine::from_rows(&rows).unwrap();
        engine.enrich(&straight_road(1, -1, 100.0));
        assert!(engine.check_chains().is_empty());

        let doc = engine.to_curblr();
        assert_eq!(doc.features.len(), 1);
        assert_eq!(doc.features[0].properties.location.shst_location_start, 30.0);
        assert_eq!(doc.features[0].properties.location.shst_location_end, 70.0);
    }

    #[test]
    fn s7_double_start_is_reported_and_opens_once() {
        let rows = vec![
            row("a", 1, 10.0, 0.0, Some("vers rue")),
            row("b", 1, 20.0, 0.0, Some("vers rue")),
            row("c", 1, 30.0, 0.0, Some("vers trottoir")),
        ];
        let mut engine = Engine::from_rows(&rows).unwrap();
        engine.enrich(&straight_road(1, 1, 100.0));

        let problems = engine.check_chains();
        assert_eq!(problems, vec!["b".to_string()]);

        let doc = engine.to_curblr();
        assert_eq!(doc.features.len(), 1);
        assert_eq!(doc.features[0].properties.location.shst_location_start, 10.0);
        assert_eq!(doc.features[0].properties.location.shst_location_end, 30.0);
    }

    #[test]
    fn manifest_priority_hierarchy_covers_every_emitted_activity() {
        let rows = vec![
            row("a", 1, 10.0, 0.0, Some("vers rue")),
            row("b", 1, 50.0, 0.0, Some("vers trottoir")),
        ];
        let mut engine = Engine::from_rows(&rows).unwrap();
        engine.enrich(&straight_road(1, 1, 100.0));
        let doc = engine.to_curblr();

        for feature in &doc.features {
            for regulation in &feature.properties.regulations {
                assert!(doc.manifest.priority_hierarchy.contains(&regulation.rule.activity));
                assert!(doc
                    .manifest
                    .priority_hierarchy
                    .contains(&regulation.rule.priority_category));
            }
        }
    }

    #[test]
    fn duplicate_rows_under_one_sign_merge_periods() {
        let mut row_a = row("a", 1, 10.0, 0.0, None);
        row_a.reg_tmp_heure_debut = Some("09:00:00".into());
        row_a.reg_tmp_heure_fin = Some("12:00:00".into());
        row_a.reg_tmp_jours = Some("lundi".into());

        let mut row_b = row_a.clone();
        row_b.reg_tmp_jours = Some("mardi".into());

        let engine = Engine::from_rows(&[row_a, row_b]).unwrap();
        let panel = engine.panels().get("a").unwrap();
        assert_eq!(panel.regulation.len(), 1);
        assert_eq!(panel.regulation[0].periods.len(), 2);
    }
}
