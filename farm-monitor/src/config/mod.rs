//! Configuration du service

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Fichier de contour attendu sous `data/`
pub const DEFAULT_BOUNDARY_FILE: &str = "megamendung.kml";

/// Origine des valeurs d'indices
///
/// Seule la génération synthétique est disponible; la valeur est portée par
/// la configuration et transmise au traitement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    #[default]
    Synthetic,
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "synthetic" | "mock" => Ok(DataSource::Synthetic),
            _ => Err(format!("Unsupported data source: {}. Use: synthetic", s)),
        }
    }
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Synthetic => "synthetic",
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone)]
pub struct Config {
    /// Fichier SQLite des séries temporelles
    pub database_path: PathBuf,

    pub api_host: String,
    pub api_port: u16,

    /// Chemin explicite du contour (sinon recherche dans `data/`)
    pub boundary_path: Option<PathBuf>,

    pub farm_id: String,
    pub farm_name: String,
    pub farm_location: String,

    pub data_source: DataSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/farm_monitoring.db"),
            api_host: "0.0.0.0".into(),
            api_port: 5000,
            boundary_path: None,
            farm_id: "double_u_farm_megamendung".into(),
            farm_name: "Double U Farm Megamendung".into(),
            farm_location: "Megamendung, West Java, Indonesia".into(),
            data_source: DataSource::Synthetic,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            api_host: std::env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: parse_var("API_PORT", defaults.api_port),
            boundary_path: std::env::var("BOUNDARY_PATH").ok().map(PathBuf::from),
            farm_id: std::env::var("FARM_ID").unwrap_or(defaults.farm_id),
            farm_name: std::env::var("FARM_NAME").unwrap_or(defaults.farm_name),
            farm_location: std::env::var("FARM_LOCATION").unwrap_or(defaults.farm_location),
            data_source: parse_var("DATA_SOURCE", defaults.data_source),
        }
    }

    /// Chemins candidats pour le document de contour, dans l'ordre d'essai
    pub fn boundary_candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.boundary_path {
            return vec![path.clone()];
        }

        let mut candidates = vec![
            PathBuf::from("data").join(DEFAULT_BOUNDARY_FILE),
            PathBuf::from(".").join("data").join(DEFAULT_BOUNDARY_FILE),
        ];
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join("data").join(DEFAULT_BOUNDARY_FILE));
            }
        }
        candidates
    }

    /// Adresse d'écoute `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Lit et parse une variable d'environnement, avec valeur par défaut
fn parse_var<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_value(key, std::env::var(key).ok(), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            warn!(key = key, value = %raw, error = %e, "Invalid value, using default");
            default
        }
    }
}
