//! A sign's position on a street: side, linear reference, and a back-pointer
//! to the road geometry it was enriched against.
//!
//! Grounded on `cygne/core/location.py`. Identity (equality/dedup) is the
//! tuple `(point, side, street_id)`; the road-network fields below are
//! mutable enrichment written by [`crate::inventory::Engine::enrich`].
//!
//! `geo_types::Point<f64>` has no `Eq`/`Hash` impl (floats aren't totally
//! ordered), so equality here is implemented by hand rather than derived —
//! see the crate-level note on structural hashing in `DESIGN.md`.

use crate::enums::{SideOfStreet, TrafficDir};
use geo_types::{LineString, Point};

#[derive(Debug, Clone)]
pub struct Location {
    pub point: Point<f64>,
    pub side_of_street: SideOfStreet,
    pub street_id: Option<i64>,
    pub asset_type: Option<String>,

    pub linear_reference: f64,
    pub traffic_dir: TrafficDir,
    pub road_geometry: Option<LineString<f64>>,
    pub road_length: f64,
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.point.x() == other.point.x()
            && self.point.y() == other.point.y()
            && self.side_of_street == other.side_of_street
            && self.street_id == other.street_id
    }
}

impl Location {
    pub fn new(point: Point<f64>, side_of_street: SideOfStreet, street_id: Option<i64>) -> Self {
        Location {
            point,
            side_of_street,
            street_id,
            asset_type: None,
            linear_reference: -1.0,
            traffic_dir: TrafficDir::Unset,
            road_geometry: None,
            road_length: -1.0,
        }
    }

    /// A stable, order-independent signature for dedup purposes, since the
    /// geometry/point fields aren't `Hash`.
    pub fn signature(&self) -> String {
        format!(
            "{:.6},{:.6}|{:?}|{:?}",
            self.point.x(),
            self.point.y(),
            self.side_of_street,
            self.street_id
        )
    }
}
