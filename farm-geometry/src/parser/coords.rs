//! Parser pour le texte des balises `<coordinates>`
//!
//! Format: tokens `lon,lat[,alt]` séparés par des blancs. L'altitude est
//! ignorée. Un token illisible est écarté sans interrompre le parsing.

use geo::Coord;
use tracing::trace;

use crate::types::CoordinatePair;

/// Raison pour laquelle un token est écarté (jamais fatal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSkip {
    /// Moins de 2 champs séparés par des virgules
    TooFewFields,
    /// Longitude ou latitude non numérique (ou non finie)
    NotNumeric,
    /// Longitude hors [-180, 180] ou latitude hors [-90, 90]
    OutOfRange,
}

/// Parse un token `lon,lat[,alt]`
#[inline]
pub fn parse_token(token: &str) -> Result<CoordinatePair, ParseSkip> {
    let mut parts = token.split(',');
    let (Some(lon_str), Some(lat_str)) = (parts.next(), parts.next()) else {
        return Err(ParseSkip::TooFewFields);
    };

    let lon = fast_parse_f64(lon_str).ok_or(ParseSkip::NotNumeric)?;
    let lat = fast_parse_f64(lat_str).ok_or(ParseSkip::NotNumeric)?;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(ParseSkip::NotNumeric);
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ParseSkip::OutOfRange);
    }

    Ok(Coord { x: lon, y: lat })
}

/// Parse un flux de tokens séparés par des blancs, en écartant les tokens invalides
pub fn parse_coordinates(text: &str) -> Vec<CoordinatePair> {
    text.split_whitespace()
        .filter_map(|token| match parse_token(token) {
            Ok(coord) => Some(coord),
            Err(reason) => {
                trace!(token = token, reason = ?reason, "Skipping coordinate token");
                None
            }
        })
        .collect()
}

/// Sérialise des coordonnées au format `lon,lat lon,lat ...`
pub fn format_coordinates(coords: &[CoordinatePair]) -> String {
    coords
        .iter()
        .map(|c| format!("{},{}", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse f64 via fast-float (rejette les caractères résiduels)
#[inline]
fn fast_parse_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    // Un seul signe '+' accepté, et jamais suivi d'un autre signe
    let s = match s.strip_prefix('+') {
        Some(rest) if rest.starts_with(&['+', '-'][..]) => return None,
        Some(rest) => rest,
        None => s,
    };
    if s.is_empty() {
        return None;
    }
    fast_float::parse(s).ok()
}
