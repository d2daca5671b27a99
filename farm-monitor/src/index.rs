//! Indices de végétation disponibles (ensemble fermé)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Nom d'indice non reconnu
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown index: {0}. Available: NDVI, EVI")]
pub struct UnknownIndex(pub String);

/// Réflectances de surface utilisées par les indices (bandes Sentinel-2 B2/B4/B8)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflectance {
    pub blue: f64,
    pub red: f64,
    pub nir: f64,
}

/// Profil des séries synthétiques d'un indice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalProfile {
    /// Valeur moyenne sur l'année
    pub base: f64,
    /// Amplitude de la composante saisonnière
    pub amplitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpectralIndex {
    Ndvi,
    Evi,
}

impl SpectralIndex {
    pub fn all() -> &'static [SpectralIndex] {
        &[SpectralIndex::Ndvi, SpectralIndex::Evi]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Evi => "EVI",
        }
    }

    /// Calcule l'indice pour un pixel
    pub fn compute(&self, r: Reflectance) -> f64 {
        match self {
            SpectralIndex::Ndvi => ndvi(r),
            SpectralIndex::Evi => evi(r),
        }
    }

    pub fn profile(&self) -> SeasonalProfile {
        match self {
            SpectralIndex::Ndvi => SeasonalProfile {
                base: 0.75,
                amplitude: 0.10,
            },
            SpectralIndex::Evi => SeasonalProfile {
                base: 0.45,
                amplitude: 0.08,
            },
        }
    }

    /// Parse une liste de noms, en conservant l'ordre et sans doublons
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<SpectralIndex>, UnknownIndex> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let index: SpectralIndex = name.as_ref().parse()?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        Ok(indices)
    }
}

impl FromStr for SpectralIndex {
    type Err = UnknownIndex;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NDVI" => Ok(SpectralIndex::Ndvi),
            "EVI" => Ok(SpectralIndex::Evi),
            _ => Err(UnknownIndex(s.to_string())),
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// (NIR - RED) / (NIR + RED)
fn ndvi(r: Reflectance) -> f64 {
    (r.nir - r.red) / (r.nir + r.red)
}

/// 2.5 * (NIR - RED) / (NIR + 6 RED - 7.5 BLUE + 1)
fn evi(r: Reflectance) -> f64 {
    2.5 * (r.nir - r.red) / (r.nir + 6.0 * r.red - 7.5 * r.blue + 1.0)
}
