//! `signalec-to-curblr`: reads an inventory CSV and a road-network GeoJSON,
//! runs the consolidation engine, and writes a CurbLR document.
//!
//! Grounded on the CLI shape the core exposes regardless of adapter: parse
//! args, init logging, read rows, `Engine::from_rows` → `enrich` →
//! `check_chains` (logged) → `to_curblr` → write.

use clap::Parser;
use curblr_signalec::inventory::Engine;
use curblr_signalec::road_network::RoadNetwork;
use curblr_signalec::row::{InventoryRow, RoadFeatureRow};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "signalec-to-curblr", about = "Consolidates a signalec sign inventory into a CurbLR document")]
struct RunConfig {
    /// Path to the denormalised inventory CSV export.
    #[arg(long)]
    inventory: PathBuf,
    /// Path to the road network GeoJSON (`ID_TRC`, `SENS_CIR` properties).
    #[arg(long)]
    roads: PathBuf,
    /// Path the CurbLR document is written to.
    #[arg(long)]
    output: PathBuf,
    /// Raises the log level to `debug`.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum AdapterError {
    #[error("could not open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read inventory row: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not parse road network GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("road network file is not a GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("could not write CurbLR document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not consolidate inventory: {0}")]
    Core(#[from] curblr_signalec::CoreError),
}

fn read_inventory(path: &PathBuf) -> Result<Vec<InventoryRow>, AdapterError> {
    let file = File::open(path).map_err(|source| AdapterError::Io {
        path: path.clone(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize::<InventoryRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => log::warn!("skipping unreadable inventory row: {e}"),
        }
    }
    Ok(rows)
}

fn read_road_network(path: &PathBuf) -> Result<RoadNetwork, AdapterError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AdapterError::Io {
        path: path.clone(),
        source,
    })?;
    let geojson = raw.parse::<geojson::GeoJson>()?;

    let geojson::GeoJson::FeatureCollection(collection) = geojson else {
        return Err(AdapterError::NotAFeatureCollection);
    };

    let mut rows = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(value) = feature.geometry.as_ref().map(|g| g.value.clone()) else {
            log::warn!("road feature without geometry, skipping");
            continue;
        };
        let geometry: geo_types::Geometry<f64> = match value.try_into() {
            Ok(g) => g,
            Err(e) => {
                log::warn!("unreadable road geometry, skipping: {e}");
                continue;
            }
        };
        let geo_types::Geometry::LineString(line) = geometry else {
            log::warn!("road feature geometry is not a LineString, skipping");
            continue;
        };

        let street_id = feature
            .property("ID_TRC")
            .and_then(|v| v.as_i64())
            .unwrap_or(-1);
        let sens_cir = feature
            .property("SENS_CIR")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        if street_id < 0 {
            log::warn!("road feature without a valid ID_TRC, skipping");
            continue;
        }

        rows.push(RoadFeatureRow {
            street_id,
            sens_cir,
            geometry: line,
        });
    }

    Ok(RoadNetwork::from_rows(rows))
}

fn run(config: &RunConfig) -> Result<(), AdapterError> {
    let rows = read_inventory(&config.inventory)?;
    log::info!("read {} inventory rows", rows.len());

    let roads = read_road_network(&config.roads)?;
    log::info!("read {} road network records", roads.len());

    let mut engine = Engine::from_rows(&rows)?;
    log::info!("built {} panels", engine.panels().len());

    engine.enrich(&roads);

    let problems = engine.check_chains();
    if !problems.is_empty() {
        log::warn!("{} panels had arrow-chain problems: {:?}", problems.len(), problems);
    }

    let document = engine.to_curblr();
    log::info!("rendered {} CurbLR features", document.features.len());

    let output = File::create(&config.output).map_err(|source| AdapterError::Io {
        path: config.output.clone(),
        source,
    })?;
    document.to_writer(BufWriter::new(output))?;

    Ok(())
}

fn main() -> ExitCode {
    let config = RunConfig::parse();

    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
