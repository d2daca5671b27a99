//! # farm-geometry
//!
//! Extraction d'un polygone de ferme unique depuis un fichier KML de contour.
//!
//! ## Pipeline
//!
//! - Parsing des tokens `lon,lat[,alt]` (tokens invalides écartés)
//! - Extraction des Polygon et des Point de chaque Placemark
//! - Sélection: polygone unique, plus grand polygone, emprise des points, ou repli
//! - Estimation grossière de la surface (hectares)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_geometry::{load, locate};
//! use std::path::PathBuf;
//!
//! let path = locate(&[PathBuf::from("data/megamendung.kml")])?;
//! let boundary = load(&path)?;
//! println!("Source: {}", boundary.geometry.source);
//! println!("Points: {}", boundary.geometry.ring().len());
//! ```

pub mod area;
pub mod error;
pub mod parser;
pub mod resolve;
pub mod types;

pub use error::GeometryError;
pub use types::{
    CoordinatePair, GeometrySource, LoadedBoundary, PointCluster, ResolvedGeometry,
    ShapeCandidate,
};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Retourne le premier chemin candidat existant
///
/// # Errors
///
/// `DocumentNotFound` avec la liste des chemins essayés si aucun n'existe.
pub fn locate(candidates: &[PathBuf]) -> Result<PathBuf, GeometryError> {
    for candidate in candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Boundary document found");
            return Ok(candidate.clone());
        }
    }

    Err(GeometryError::DocumentNotFound {
        searched: candidates.to_vec(),
    })
}

/// Charge et résout un document de contour.
///
/// # Arguments
///
/// * `path` - Chemin vers le fichier KML
///
/// # Returns
///
/// Un `LoadedBoundary` avec la géométrie retenue (surface renseignée), le
/// chemin lu et le checksum blake3 du contenu.
///
/// # Errors
///
/// `DocumentNotFound` si le fichier n'existe pas, `MalformedDocument` si le
/// contenu n'est pas de l'UTF-8 ou pas un XML valide.
pub fn load(path: &Path) -> Result<LoadedBoundary, GeometryError> {
    if !path.is_file() {
        return Err(GeometryError::DocumentNotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    let bytes = std::fs::read(path)?;
    let checksum = hex::encode(blake3::hash(&bytes).as_bytes());

    let origin = path.display().to_string();
    let geometry = area::with_area(resolve_bytes(&bytes, &origin)?);

    info!(
        path = %origin,
        source = %geometry.source,
        points = geometry.ring().len(),
        area_ha = ?geometry.area_hectares,
        "Boundary geometry loaded"
    );

    Ok(LoadedBoundary {
        path: path.to_path_buf(),
        checksum,
        geometry,
    })
}

/// Résout un document brut (UTF-8 obligatoire). Sans estimation de surface.
pub fn resolve_bytes(bytes: &[u8], origin: &str) -> Result<ResolvedGeometry, GeometryError> {
    let text = simdutf8::basic::from_utf8(bytes)
        .map_err(|_| GeometryError::malformed(origin, "document is not valid UTF-8"))?;
    resolve_document(text, origin)
}

/// Résout un document déjà décodé. Sans estimation de surface.
pub fn resolve_str(text: &str) -> Result<ResolvedGeometry, GeometryError> {
    resolve_document(text, "<memory>")
}

fn resolve_document(text: &str, origin: &str) -> Result<ResolvedGeometry, GeometryError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let document = parser::document::parse(text, origin)?;
    let extraction = parser::kml::extract(&document);
    debug!(
        shapes = extraction.shapes.len(),
        points = extraction.points.len(),
        "Document extracted"
    );
    Ok(resolve::resolve(extraction))
}
