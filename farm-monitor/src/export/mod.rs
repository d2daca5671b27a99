//! Sérialisation de la géométrie retenue (GeoJSON, KML)

pub mod geojson;
pub mod kml;
