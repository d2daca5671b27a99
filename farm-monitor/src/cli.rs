//! Définition et implémentation des commandes CLI
//!
//! - `serve`: service HTTP (commande par défaut)
//! - `geometry`: contour retenu en GeoJSON ou KML
//! - `process`: génération + stockage + résumé, sans serveur

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use tracing::info;

use farm_monitor::export::{geojson, kml};
use farm_monitor::process::{self, ProcessRequest, DEFAULT_END, DEFAULT_START};
use farm_monitor::{server, summary, Config, SpectralIndex, Store};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum GeometryFormat {
    #[default]
    Geojson,
    Kml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Listen address (default: env API_HOST / 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default: env API_PORT / 5000)
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database path (default: env DATABASE_PATH)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Resolve the farm boundary and print or write it
    Geometry {
        /// Boundary KML file (default: env BOUNDARY_PATH / data/megamendung.kml)
        #[arg(short, long)]
        boundary: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = GeometryFormat::Geojson)]
        format: GeometryFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate, store and summarise index series for the configured farm
    Process {
        /// First acquisition date (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_START)]
        start: String,

        /// Last acquisition date (YYYY-MM-DD)
        #[arg(long, default_value = DEFAULT_END)]
        end: String,

        /// Comma-separated index names
        #[arg(long, value_delimiter = ',', default_value = "NDVI,EVI")]
        variables: Vec<String>,

        /// Boundary KML file
        #[arg(short, long)]
        boundary: Option<PathBuf>,

        /// SQLite database path
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

/// Exécute la commande serve
pub async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> Result<()> {
    if let Some(host) = host {
        config.api_host = host;
    }
    if let Some(port) = port {
        config.api_port = port;
    }
    if let Some(database) = database {
        config.database_path = database;
    }

    println!("=== {} ===", config.farm_name);
    println!("Listening: http://{}", config.bind_address());
    println!("Database: {}", config.database_path.display());
    println!("Data source: {}", config.data_source.as_str());

    server::serve(config).await
}

/// Exécute la commande geometry
pub fn cmd_geometry(
    mut config: Config,
    boundary: Option<PathBuf>,
    format: GeometryFormat,
    output: Option<&Path>,
) -> Result<()> {
    if boundary.is_some() {
        config.boundary_path = boundary;
    }

    let loaded = farm_monitor::load_boundary(&config)?;
    info!(
        path = %loaded.path.display(),
        source = %loaded.geometry.source,
        checksum = %loaded.checksum,
        "Boundary resolved"
    );

    match (format, output) {
        (GeometryFormat::Geojson, Some(path)) => {
            geojson::export_to_geojson(&loaded.geometry, path)?
        }
        (GeometryFormat::Geojson, None) => {
            println!("{}", serde_json::to_string_pretty(&geojson::to_json(&loaded.geometry))?)
        }
        (GeometryFormat::Kml, Some(path)) => {
            std::fs::write(path, kml::to_kml(&loaded.geometry, &config.farm_name))
                .context(format!("Failed to write file: {}", path.display()))?
        }
        (GeometryFormat::Kml, None) => {
            print!("{}", kml::to_kml(&loaded.geometry, &config.farm_name))
        }
    }

    if let Some(path) = output {
        println!("Written: {}", path.display());
    }
    Ok(())
}

/// Exécute la commande process
pub fn cmd_process(
    mut config: Config,
    start: &str,
    end: &str,
    variables: &[String],
    boundary: Option<PathBuf>,
    database: Option<PathBuf>,
) -> Result<()> {
    if boundary.is_some() {
        config.boundary_path = boundary;
    }
    if let Some(database) = database {
        config.database_path = database;
    }

    let request = ProcessRequest {
        indices: SpectralIndex::parse_list(variables)?,
        start: process::parse_date(start)?,
        end: process::parse_date(end)?,
    };

    let loaded = farm_monitor::load_boundary(&config)?;
    let geometry = &loaded.geometry;
    println!("Boundary: {}", loaded.path.display());
    println!("Geometry source: {}", geometry.source);
    println!("Boundary points: {}", geometry.ring().len());
    if let Some(area) = geometry.area_hectares {
        println!("Estimated farm area: ~{:.1} hectares", area);
    }
    if geometry.is_fallback() {
        println!("Warning: no usable geometry in the boundary file, fallback area used");
    }

    let store = Store::open(&config.database_path)?;
    let mut rng = rand::thread_rng();
    let report = process::process_farm(&mut rng, &config, &store, geometry, &request)?;

    println!("\n=== Processing result ===");
    println!("Status: {}", report.status);
    println!("{}", report.message);
    if report.status != "success" {
        return Ok(());
    }

    let series = store.farm_data(&config.farm_id, None)?;
    let digest = summary::summarize(&series);
    println!("\nFarm ID: {}", digest.farm_id);
    for (name, stats) in &digest.variables {
        println!("\n{} ({} data points):", name, stats.count);
        if let Some(first) = series.data.get(name).and_then(|r| r.first()) {
            println!("  First: {} = {:.3}", first.date, first.value);
        }
        println!("  Last:  {} = {:.3}", stats.latest.date, stats.latest.value);
        println!("  Mean:  {:.3}", stats.mean);
        println!("  Range: {:.3} - {:.3}", stats.min, stats.max);
    }

    Ok(())
}
