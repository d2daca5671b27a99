//! Traitement d'une ferme: génération, stockage et rapport

use anyhow::Result;
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use farm_geometry::ResolvedGeometry;

use crate::config::{Config, DataSource};
use crate::generator;
use crate::index::SpectralIndex;
use crate::store::Store;

/// Période traitée par défaut
pub const DEFAULT_START: &str = "2024-01-01";
pub const DEFAULT_END: &str = "2024-12-31";

/// Parse une date `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!("Invalid date format: '{}'. Expected YYYY-MM-DD", value)
    })
}

/// Demande de traitement validée
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub indices: Vec<SpectralIndex>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Résumé de la géométrie utilisée pour le traitement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmInfo {
    pub geometry_source: &'static str,
    pub boundary_points: usize,
    pub area_estimate: Option<f64>,
}

impl FarmInfo {
    pub fn from_geometry(geometry: &ResolvedGeometry) -> Self {
        Self {
            geometry_source: geometry.source.as_str(),
            boundary_points: geometry.ring().len(),
            area_estimate: geometry.area_hectares,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_info: Option<FarmInfo>,
}

/// Génère et enregistre les séries de la ferme configurée
pub fn process_farm<R: Rng>(
    rng: &mut R,
    config: &Config,
    store: &Store,
    geometry: &ResolvedGeometry,
    request: &ProcessRequest,
) -> Result<ProcessReport> {
    let variables: Vec<&str> = request.indices.iter().map(|i| i.name()).collect();
    info!(
        farm_id = %config.farm_id,
        data_source = config.data_source.as_str(),
        geometry_source = %geometry.source,
        variables = ?variables,
        "Processing farm"
    );

    let observations = match config.data_source {
        DataSource::Synthetic => generator::generate(
            rng,
            &config.farm_id,
            &request.indices,
            request.start,
            request.end,
        ),
    };

    if observations.is_empty() {
        return Ok(ProcessReport {
            status: "no_data",
            message: "No data generated".to_string(),
            results_count: None,
            note: None,
            farm_info: None,
        });
    }

    let saved = store.save(&observations)?;
    info!(count = saved, "Generated and saved synthetic data points");

    Ok(ProcessReport {
        status: "success",
        message: format!("Generated {} synthetic data points for {}", saved, config.farm_name),
        results_count: Some(saved),
        note: Some("Synthetic data: no remote-sensing backend configured".to_string()),
        farm_info: Some(FarmInfo::from_geometry(geometry)),
    })
}
