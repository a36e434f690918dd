//! Small closed vocabularies shared across the regulation model.

use serde::{Deserialize, Serialize};

/// Which way a regulation extends from a sign along the curb's reference direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arrow {
    Start,
    NoArrow,
    End,
}

/// Whether a rule permits or forbids the activity it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nature {
    Interdiction,
    Permission,
    #[default]
    Unknown,
}

/// Side of the street a [`crate::location::Location`] sits on, derived from the
/// inventory's `cote_rue_id` parity rule (odd ⇒ right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SideOfStreet {
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "left")]
    Left,
}

impl SideOfStreet {
    /// Montreal's open-data `cote_rue_id` is a street-segment-relative code;
    /// the low digit's parity tells left from right.
    pub fn from_cote_rue_id(cote_rue_id: i64) -> Self {
        if cote_rue_id.rem_euclid(10) == 1 {
            SideOfStreet::Right
        } else {
            SideOfStreet::Left
        }
    }

    pub fn as_curblr_str(self) -> &'static str {
        match self {
            SideOfStreet::Right => "right",
            SideOfStreet::Left => "left",
        }
    }
}

/// Direction of a road's digitalisation relative to the curb-chain reading
/// direction, as recorded by `SENS_CIR` in the road network table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrafficDir {
    DigitalizationDir,
    ReverseDir,
    BothDir,
    #[default]
    Unset,
}

impl TrafficDir {
    /// Maps the road table's `SENS_CIR` integer code (1 / -1 / 0) to a [`TrafficDir`].
    pub fn from_sens_cir(code: i64) -> Self {
        match code {
            1 => TrafficDir::DigitalizationDir,
            -1 => TrafficDir::ReverseDir,
            0 => TrafficDir::BothDir,
            _ => TrafficDir::Unset,
        }
    }
}
