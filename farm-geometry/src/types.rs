//! Types de données pour le crate farm-geometry

use std::fmt;
use std::path::PathBuf;

use geo::{Coord, LineString, Polygon};

/// Paire (longitude, latitude) validée: `x` = longitude, `y` = latitude
pub type CoordinatePair = Coord<f64>;

/// Anneau fermé candidat extrait d'un Placemark
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCandidate {
    /// Nom du Placemark ou `Placemark_<i>`
    pub name: String,

    /// Points de l'anneau, fermé (premier == dernier)
    pub points: Vec<CoordinatePair>,
}

impl ShapeCandidate {
    /// Nombre de points de l'anneau fermé (critère de sélection)
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Vrai si l'anneau est fermé; toujours le cas en sortie d'extraction
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 4 && self.points.first() == self.points.last()
    }
}

/// Points isolés (Placemarks de type Point), dans l'ordre de rencontre
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCluster {
    pub points: Vec<CoordinatePair>,
}

impl PointCluster {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Résultat de l'extraction d'un document
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Candidats dans l'ordre de rencontre
    pub shapes: Vec<ShapeCandidate>,

    /// Points isolés, utilisés seulement sans candidat
    pub points: PointCluster,
}

/// Branche de la politique de sélection qui a produit la géométrie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    SinglePolygon,
    LargestPolygon,
    BoundingArea,
    Fallback,
}

impl GeometrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometrySource::SinglePolygon => "single_polygon",
            GeometrySource::LargestPolygon => "largest_polygon",
            GeometrySource::BoundingArea => "bounding_area",
            GeometrySource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polygone canonique retenu, avec sa provenance
///
/// L'anneau extérieur est fermé et compte au moins 4 points. Pas de trous.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGeometry {
    pub polygon: Polygon<f64>,

    pub source: GeometrySource,

    /// Nom du Placemark retenu (single/largest)
    pub name: Option<String>,

    /// Nombre de candidats (largest) ou de points (bounding_area)
    pub candidate_count: Option<usize>,

    /// Surface approximative, voir [`crate::area`]
    pub area_hectares: Option<f64>,
}

impl ResolvedGeometry {
    pub(crate) fn from_ring(points: Vec<CoordinatePair>, source: GeometrySource) -> Self {
        Self {
            polygon: Polygon::new(LineString::new(points), Vec::new()),
            source,
            name: None,
            candidate_count: None,
            area_hectares: None,
        }
    }

    /// Anneau extérieur (fermé)
    pub fn ring(&self) -> &[CoordinatePair] {
        &self.polygon.exterior().0
    }

    /// Vrai si la géométrie vient du rectangle de repli (confiance dégradée)
    pub fn is_fallback(&self) -> bool {
        self.source == GeometrySource::Fallback
    }
}

/// Document de contour chargé depuis le disque
#[derive(Debug, Clone)]
pub struct LoadedBoundary {
    /// Chemin effectivement lu
    pub path: PathBuf,

    /// Checksum blake3 (hex) du contenu brut
    pub checksum: String,

    pub geometry: ResolvedGeometry,
}
