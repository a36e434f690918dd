#![forbid(unsafe_code)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Flat record shapes read at the I/O boundary: [`row::InventoryRow`] and
/// [`row::RoadFeatureRow`].
pub mod row;

/// Calendar primitives underlying [`period`]: day/month parsing and
/// month-run date-range expansion.
pub mod calendar;
/// The error taxonomy shared by every layer.
pub mod error;

/// Small closed vocabularies: [`enums::Arrow`], [`enums::Nature`],
/// [`enums::SideOfStreet`], [`enums::TrafficDir`].
pub mod enums;
/// A regulation's temporal applicability.
pub mod period;
/// Activity, type and stay limits a regulation enforces.
pub mod rule;
/// The vehicle category / permit set a regulation applies to.
pub mod user_class;

/// Composition of a [`rule::Rule`] with its [`user_class::UserClass`]es and
/// [`period::Period`]s.
pub mod regulation;

/// A sign's position on a street, and the road-network fields it is
/// enriched with.
pub mod location;
/// One sign: arrow, regulations, and location.
pub mod panel;

/// Point-onto-polyline projection and sub-linestring cutting.
pub mod linear_ref;
/// The arrow-chain state machine that turns an ordered panel sequence into
/// half-open regulation intervals.
pub mod segment;

/// The indexed road table Panels are enriched against.
pub mod road_network;

/// The consolidation engine: ingestion, enrichment, segmenting, and
/// [`curblr::Document`] rendering.
pub mod inventory;

/// Typed CurbLR output document.
pub mod curblr;

pub use error::CoreError;
pub use inventory::Engine;
