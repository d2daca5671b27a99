//! Statistiques sur les séries d'une ferme

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::{FarmSeries, Reading};

/// Statistiques d'un indice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    pub count: usize,
    pub latest: Reading,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub trend: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmSummary {
    pub farm_id: String,
    pub variables: BTreeMap<String, VariableSummary>,
    pub total_readings: usize,
}

/// Résume chaque série non vide
pub fn summarize(series: &FarmSeries) -> FarmSummary {
    let mut variables = BTreeMap::new();
    let mut total_readings = 0;

    for (name, readings) in &series.data {
        if let Some(summary) = summarize_readings(readings) {
            total_readings += summary.count;
            variables.insert(name.clone(), summary);
        }
    }

    FarmSummary {
        farm_id: series.farm_id.clone(),
        variables,
        total_readings,
    }
}

fn summarize_readings(readings: &[Reading]) -> Option<VariableSummary> {
    let latest = readings.last()?.clone();
    let count = readings.len();

    let (min, max, sum) = readings.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), r| (min.min(r.value), max.max(r.value), sum + r.value),
    );

    Some(VariableSummary {
        count,
        latest,
        mean: sum / count as f64,
        min,
        max,
        // Pas encore de détection de tendance
        trend: "stable",
    })
}

/// Dernière valeur de chaque série non vide
pub fn latest_readings(series: &FarmSeries) -> BTreeMap<String, Reading> {
    series
        .data
        .iter()
        .filter_map(|(name, readings)| Some((name.clone(), readings.last()?.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> FarmSeries {
        let mut data = BTreeMap::new();
        data.insert(
            "NDVI".to_string(),
            vec![
                Reading { date: "2024-01-01".into(), value: 0.6 },
                Reading { date: "2024-01-17".into(), value: 0.8 },
                Reading { date: "2024-02-02".into(), value: 0.7 },
            ],
        );
        data.insert("EVI".to_string(), Vec::new());
        FarmSeries {
            farm_id: "farm".into(),
            data,
        }
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&series());
        assert_eq!(summary.total_readings, 3);
        assert!(!summary.variables.contains_key("EVI"));

        let ndvi = &summary.variables["NDVI"];
        assert_eq!(ndvi.count, 3);
        assert_eq!(ndvi.latest.date, "2024-02-02");
        assert!((ndvi.mean - 0.7).abs() < 1e-12);
        assert_eq!(ndvi.min, 0.6);
        assert_eq!(ndvi.max, 0.8);
        assert_eq!(ndvi.trend, "stable");
    }

    #[test]
    fn test_latest_readings_skips_empty_series() {
        let latest = latest_readings(&series());
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["NDVI"].value, 0.7);
    }
}
