//! Parsers du document de contour (XML, Placemarks, coordonnées)

pub mod coords;
pub mod document;
pub mod kml;
