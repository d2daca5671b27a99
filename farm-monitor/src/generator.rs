//! Génération de séries synthétiques d'indices de végétation
//!
//! Une acquisition tous les 16 jours (revisite Sentinel-2). Chaque valeur
//! combine la moyenne de l'indice, une composante saisonnière annuelle et
//! deux bruits gaussiens (mesure, météo), bornée à [0.1, 0.95].

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::index::SpectralIndex;

/// Intervalle entre deux acquisitions (jours)
pub const REVISIT_DAYS: i64 = 16;

const NOISE_SIGMA: f64 = 0.03;
const WEATHER_SIGMA: f64 = 0.02;
const VALUE_BOUNDS: (f64, f64) = (0.1, 0.95);
const CLOUD_COVER_RANGE: (f64, f64) = (5.0, 40.0);

/// Une valeur d'indice pour une ferme et une date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub farm_id: String,
    pub date: NaiveDate,
    pub variable_name: String,
    pub value: f64,
    pub cloud_cover: f64,
}

/// Dates d'acquisition de `start` à `end` inclus
pub fn acquisition_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(REVISIT_DAYS);
    }
    dates
}

/// Génère les observations de chaque indice pour chaque date d'acquisition
pub fn generate<R: Rng>(
    rng: &mut R,
    farm_id: &str,
    indices: &[SpectralIndex],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Observation> {
    let dates = acquisition_dates(start, end);
    let mut observations = Vec::with_capacity(dates.len() * indices.len());

    for date in dates {
        let days_from_start = (date - start).num_days() as f64;
        let phase = std::f64::consts::TAU * days_from_start / 365.0;

        for index in indices {
            let profile = index.profile();
            let seasonal = profile.amplitude * phase.sin();
            let noise = gaussian(rng, NOISE_SIGMA);
            let weather = gaussian(rng, WEATHER_SIGMA);

            let value = (profile.base + seasonal + noise + weather)
                .clamp(VALUE_BOUNDS.0, VALUE_BOUNDS.1);
            let cloud_cover = rng.gen_range(CLOUD_COVER_RANGE.0..CLOUD_COVER_RANGE.1);

            observations.push(Observation {
                farm_id: farm_id.to_string(),
                date,
                variable_name: index.name().to_string(),
                value,
                cloud_cover,
            });
        }
    }

    observations
}

/// Tirage N(0, sigma) par Box-Muller
fn gaussian<R: Rng>(rng: &mut R, sigma: f64) -> f64 {
    // u1 dans ]0, 1] pour éviter ln(0)
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_acquisition_dates_every_16_days() {
        let dates = acquisition_dates(date("2024-01-01"), date("2024-02-02"));
        assert_eq!(
            dates,
            vec![date("2024-01-01"), date("2024-01-17"), date("2024-02-02")]
        );
    }

    #[test]
    fn test_full_year_has_23_acquisitions() {
        assert_eq!(acquisition_dates(date("2024-01-01"), date("2024-12-31")).len(), 23);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let obs = generate(
            &mut rng,
            "farm",
            SpectralIndex::all(),
            date("2024-06-01"),
            date("2024-01-01"),
        );
        assert!(obs.is_empty());
    }

    #[test]
    fn test_values_are_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let obs = generate(
            &mut rng,
            "farm",
            SpectralIndex::all(),
            date("2020-01-01"),
            date("2024-12-31"),
        );
        assert!(!obs.is_empty());
        for o in &obs {
            assert!((0.1..=0.95).contains(&o.value), "value {}", o.value);
            assert!((5.0..40.0).contains(&o.cloud_cover));
        }
    }

    #[test]
    fn test_one_observation_per_index_and_date() {
        let mut rng = StdRng::seed_from_u64(7);
        let obs = generate(
            &mut rng,
            "farm",
            &[SpectralIndex::Ndvi, SpectralIndex::Evi],
            date("2024-01-01"),
            date("2024-01-31"),
        );
        let names: Vec<_> = obs.iter().map(|o| o.variable_name.as_str()).collect();
        assert_eq!(names, vec!["NDVI", "EVI", "NDVI", "EVI"]);
    }

    #[test]
    fn test_ndvi_stays_above_evi_on_average() {
        let mut rng = StdRng::seed_from_u64(3);
        let obs = generate(
            &mut rng,
            "farm",
            SpectralIndex::all(),
            date("2024-01-01"),
            date("2024-12-31"),
        );
        let mean = |name: &str| {
            let values: Vec<f64> = obs
                .iter()
                .filter(|o| o.variable_name == name)
                .map(|o| o.value)
                .collect();
            values.iter().sum::<f64>() / values.len() as f64
        };
        assert!(mean("NDVI") > mean("EVI") + 0.2);
    }

    #[test]
    fn test_same_seed_same_series() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate(
                &mut rng,
                "farm",
                SpectralIndex::all(),
                date("2024-01-01"),
                date("2024-03-01"),
            )
        };
        assert_eq!(run(9), run(9));
    }
}
