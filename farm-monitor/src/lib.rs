//! # farm-monitor
//!
//! Séries temporelles d'indices de végétation pour une ferme, servies en HTTP.
//!
//! ## Features
//!
//! - Contour de la ferme résolu depuis un fichier KML (`farm-geometry`)
//! - Séries NDVI/EVI synthétiques (revisite 16 jours)
//! - Stockage SQLite, unicité (ferme, date, indice)
//! - Résumés statistiques et dernières valeurs
//! - Export GeoJSON/KML du contour
//!
//! ## Usage CLI
//!
//! ```bash
//! # Service HTTP
//! farm-monitor serve --port 5000
//!
//! # Contour retenu en GeoJSON
//! farm-monitor geometry --boundary ./data/megamendung.kml
//!
//! # Génération + stockage + résumé
//! farm-monitor process --start 2024-01-01 --end 2024-12-31 --variables NDVI,EVI
//! ```

pub mod config;
pub mod export;
pub mod generator;
pub mod index;
pub mod process;
pub mod server;
pub mod store;
pub mod summary;

pub use config::{Config, DataSource};
pub use index::SpectralIndex;
pub use store::Store;

use farm_geometry::{GeometryError, LoadedBoundary};

/// Localise puis charge le contour de la ferme configurée
pub fn load_boundary(config: &Config) -> Result<LoadedBoundary, GeometryError> {
    let path = farm_geometry::locate(&config.boundary_candidates())?;
    farm_geometry::load(&path)
}
