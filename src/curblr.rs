//! Typed CurbLR output document.
//!
//! Mirrors the JSON shapes of `cygne/core/curblr.py` (`MANIFEST`, `DAYS`,
//! `CRS`) as `#[derive(Serialize)]` structs, with `skip_serializing_if` on
//! every CurbLR-optional field so the rendered JSON omits absent keys
//! instead of emitting `null` — the same contract the teacher follows for
//! optional routing fields in `route/costing/auto.rs`.

use chrono::SecondsFormat;
use serde::Serialize;
use std::collections::BTreeSet;

/// Long-form day codes CurbLR expects, indexed 0 (Monday) .. 6 (Sunday).
pub const DAYS: [&str; 7] = ["mo", "tu", "we", "th", "fr", "sa", "su"];

const CURBLR_VERSION: &str = "1.1.0";
const TIME_ZONE: &str = "America/Montréal";
const CURRENCY: &str = "CAD";
const AUTHORITY_NAME: &str = "Agence de mobilité durable";
const AUTHORITY_URL: &str = "https://www.agencemobilitedurable.ca/";
const CREATED_DATE: &str = "2024-08-20T13:54:24-04:00";

#[derive(Debug, Serialize)]
pub struct Authority {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    #[serde(rename = "createdDate")]
    pub created_date: String,
    #[serde(rename = "lastUpdatedDate")]
    pub last_updated_date: String,
    #[serde(rename = "curblrVersion")]
    pub curblr_version: String,
    #[serde(rename = "priorityHierarchy")]
    pub priority_hierarchy: Vec<String>,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
    pub currency: String,
    pub authority: Authority,
}

impl Manifest {
    /// Builds the manifest with constant fields populated and `priorityHierarchy`
    /// set from the observed activity/priority-category strings, deduplicated
    /// via a `BTreeSet` for deterministic output.
    pub fn with_priority_hierarchy(observed: BTreeSet<String>) -> Self {
        Manifest {
            created_date: CREATED_DATE.to_string(),
            last_updated_date: chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            curblr_version: CURBLR_VERSION.to_string(),
            priority_hierarchy: observed.into_iter().collect(),
            time_zone: TIME_ZONE.to_string(),
            currency: CURRENCY.to_string(),
            authority: Authority {
                name: AUTHORITY_NAME.to_string(),
                url: AUTHORITY_URL.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CrsProperties {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Crs {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: CrsProperties,
}

impl Default for Crs {
    fn default() -> Self {
        Crs {
            kind: "name".to_string(),
            properties: CrsProperties {
                name: "urn:ogc:def:crs:EPSG::32188".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EffectiveDate {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct DaysOfWeek {
    pub days: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct TimeOfDay {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, Default)]
pub struct TimeSpanCurbLR {
    #[serde(rename = "effectiveDates", skip_serializing_if = "Vec::is_empty")]
    pub effective_dates: Vec<EffectiveDate>,
    #[serde(rename = "daysOfWeek", skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<DaysOfWeek>,
    #[serde(rename = "timesOfDay", skip_serializing_if = "Vec::is_empty")]
    pub times_of_day: Vec<TimeOfDay>,
}

#[derive(Debug, Serialize)]
pub struct RuleCurbLR {
    pub activity: String,
    #[serde(rename = "priorityCategory")]
    pub priority_category: String,
    #[serde(rename = "maxStay", skip_serializing_if = "Option::is_none")]
    pub max_stay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<Authority>,
}

#[derive(Debug, Serialize)]
pub struct UserClassCurbLR {
    pub classes: Vec<String>,
    pub subclasses: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegulationCurbLR {
    pub rule: RuleCurbLR,
    #[serde(rename = "userClasses", skip_serializing_if = "Option::is_none")]
    pub user_classes: Option<Vec<UserClassCurbLR>>,
    #[serde(rename = "timeSpans", skip_serializing_if = "Option::is_none")]
    pub time_spans: Option<Vec<TimeSpanCurbLR>>,
}

#[derive(Debug, Serialize)]
pub struct LocationCurbLR {
    #[serde(rename = "shstRefId")]
    pub shst_ref_id: String,
    #[serde(rename = "shstLocationStart")]
    pub shst_location_start: f64,
    #[serde(rename = "shstLocationEnd")]
    pub shst_location_end: f64,
    #[serde(rename = "sideOfStreet")]
    pub side_of_street: &'static str,
    #[serde(rename = "objectId")]
    pub object_id: i64,
    #[serde(rename = "derivedFrom")]
    pub derived_from: Vec<String>,
    #[serde(rename = "assetType", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeatureProperties {
    pub location: LocationCurbLR,
    pub regulations: Vec<RegulationCurbLR>,
}

#[derive(Debug, Serialize)]
pub struct GeometryLineString {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl From<&geo_types::LineString<f64>> for GeometryLineString {
    fn from(line: &geo_types::LineString<f64>) -> Self {
        GeometryLineString {
            kind: "LineString".to_string(),
            coordinates: line.coords().map(|c| [c.x, c.y]).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: GeometryLineString,
}

#[derive(Debug, Serialize)]
pub struct Document {
    pub manifest: Manifest,
    #[serde(rename = "type")]
    pub kind: String,
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl Document {
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}
