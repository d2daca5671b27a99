//! Stockage SQLite des séries temporelles
//!
//! Une ligne par (ferme, date, indice); une nouvelle valeur pour le même
//! triplet remplace l'ancienne.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::{debug, info};

use crate::generator::Observation;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS satellite_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    farm_id TEXT NOT NULL,
    date DATE NOT NULL,
    variable_name TEXT NOT NULL,
    value REAL NOT NULL,
    cloud_cover REAL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(farm_id, date, variable_name)
);
"#;

/// Une valeur datée d'une série
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub date: String,
    pub value: f64,
}

/// Séries d'une ferme, par indice (ordre alphabétique des indices)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FarmSeries {
    pub farm_id: String,
    pub data: BTreeMap<String, Vec<Reading>>,
}

/// Accès au fichier SQLite; une connexion par opération
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Ouvre (ou crée) la base et son schéma
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create data directory {}", dir.display()))?;
        }

        let store = Self {
            path: path.to_path_buf(),
        };
        store
            .connect()?
            .execute_batch(SCHEMA)
            .context("Failed to create satellite_data table")?;

        info!(path = %path.display(), "Database initialized");
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("Cannot open database {}", self.path.display()))
    }

    /// Enregistre les observations dans une transaction (INSERT OR REPLACE)
    pub fn save(&self, observations: &[Observation]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO satellite_data \
                 (farm_id, date, variable_name, value, cloud_cover) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for o in observations {
                stmt.execute(params![
                    o.farm_id,
                    o.date.format("%Y-%m-%d").to_string(),
                    o.variable_name,
                    o.value,
                    o.cloud_cover
                ])?;
            }
        }
        tx.commit().context("Failed to commit observations")?;

        debug!(count = observations.len(), "Observations saved");
        Ok(observations.len())
    }

    /// Séries d'une ferme, optionnellement restreintes à un indice, triées par date
    pub fn farm_data(&self, farm_id: &str, variable: Option<&str>) -> Result<FarmSeries> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT date, variable_name, value FROM satellite_data \
             WHERE farm_id = ?1 AND (?2 IS NULL OR variable_name = ?2) \
             ORDER BY date, variable_name",
        )?;

        let rows = stmt.query_map(params![farm_id, variable], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut series = FarmSeries {
            farm_id: farm_id.to_string(),
            data: BTreeMap::new(),
        };
        for row in rows {
            let (date, variable_name, value) = row?;
            series
                .data
                .entry(variable_name)
                .or_insert_with(Vec::new)
                .push(Reading { date, value });
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_store(name: &str) -> Store {
        let path = std::env::temp_dir()
            .join("farm_monitor_store")
            .join(format!("{}.db", name));
        std::fs::remove_file(&path).ok();
        Store::open(&path).unwrap()
    }

    fn obs(date: &str, variable: &str, value: f64) -> Observation {
        Observation {
            farm_id: "farm".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            variable_name: variable.to_string(),
            value,
            cloud_cover: 10.0,
        }
    }

    #[test]
    fn test_save_and_read_back_grouped() {
        let store = temp_store("grouped");
        store
            .save(&[
                obs("2024-01-17", "NDVI", 0.7),
                obs("2024-01-01", "NDVI", 0.6),
                obs("2024-01-01", "EVI", 0.4),
            ])
            .unwrap();

        let series = store.farm_data("farm", None).unwrap();
        assert_eq!(series.data.len(), 2);
        let ndvi = &series.data["NDVI"];
        assert_eq!(ndvi[0].date, "2024-01-01");
        assert_eq!(ndvi[1].value, 0.7);
    }

    #[test]
    fn test_same_key_is_replaced() {
        let store = temp_store("replace");
        store.save(&[obs("2024-01-01", "NDVI", 0.6)]).unwrap();
        store.save(&[obs("2024-01-01", "NDVI", 0.8)]).unwrap();

        let series = store.farm_data("farm", Some("NDVI")).unwrap();
        assert_eq!(series.data["NDVI"], vec![Reading { date: "2024-01-01".into(), value: 0.8 }]);
    }

    #[test]
    fn test_variable_filter_and_unknown_farm() {
        let store = temp_store("filter");
        store
            .save(&[obs("2024-01-01", "NDVI", 0.6), obs("2024-01-01", "EVI", 0.4)])
            .unwrap();

        let evi = store.farm_data("farm", Some("EVI")).unwrap();
        assert_eq!(evi.data.keys().collect::<Vec<_>>(), vec!["EVI"]);

        let other = store.farm_data("elsewhere", None).unwrap();
        assert!(other.data.is_empty());
        assert_eq!(other.farm_id, "elsewhere");
    }
}
