//! Estimation grossière de la surface d'un contour
//!
//! Surface de l'emprise (bounding box) et non du polygone, avec une
//! approximation plane: 1 degré = 111 km dans les deux axes. Suffisant pour
//! vérifier un ordre de grandeur, pas pour un calcul géodésique.

use crate::types::ResolvedGeometry;

/// Mètres par degré (approximation à l'équateur)
pub const METERS_PER_DEGREE: f64 = 111_000.0;

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Surface approximative en hectares, `None` si l'anneau a 3 points ou moins
pub fn estimate_hectares(geometry: &ResolvedGeometry) -> Option<f64> {
    let ring = geometry.ring();
    if ring.len() <= 3 {
        return None;
    }

    // Le point de fermeture est exclu
    let open = &ring[..ring.len() - 1];

    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for c in open {
        min_lon = min_lon.min(c.x);
        max_lon = max_lon.max(c.x);
        min_lat = min_lat.min(c.y);
        max_lat = max_lat.max(c.y);
    }

    let area_deg2 = (max_lon - min_lon) * (max_lat - min_lat);
    let area_m2 = area_deg2 * METERS_PER_DEGREE.powi(2);
    Some(area_m2 / SQUARE_METERS_PER_HECTARE)
}

/// Retourne la géométrie avec `area_hectares` renseigné
pub fn with_area(mut geometry: ResolvedGeometry) -> ResolvedGeometry {
    geometry.area_hectares = estimate_hectares(&geometry);
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeometrySource;
    use geo::{Coord, LineString, Polygon};

    fn geometry(ring: Vec<(f64, f64)>) -> ResolvedGeometry {
        let coords: Vec<Coord> = ring.into_iter().map(|(x, y)| Coord { x, y }).collect();
        ResolvedGeometry {
            polygon: Polygon::new(LineString::new(coords), Vec::new()),
            source: GeometrySource::SinglePolygon,
            name: None,
            candidate_count: None,
            area_hectares: None,
        }
    }

    #[test]
    fn test_bounding_box_area() {
        let g = geometry(vec![
            (106.910, -6.702),
            (106.915, -6.702),
            (106.915, -6.698),
            (106.910, -6.698),
            (106.910, -6.702),
        ]);
        let area = estimate_hectares(&g).unwrap();
        // (0.005 * 111000) * (0.004 * 111000) / 10000
        assert!((area - 24.642).abs() < 1e-6, "area = {}", area);
    }

    #[test]
    fn test_concave_ring_uses_bounds_not_shape() {
        let g = geometry(vec![
            (0.0, 0.0),
            (0.01, 0.0),
            (0.0001, 0.0001),
            (0.0, 0.01),
            (0.0, 0.0),
        ]);
        let expected = 0.01 * 0.01 * METERS_PER_DEGREE.powi(2) / 10_000.0;
        assert!((estimate_hectares(&g).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_short_ring_has_no_area() {
        let g = geometry(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(g.ring().len(), 3);
        assert_eq!(estimate_hectares(&g), None);
    }

    #[test]
    fn test_with_area_sets_field() {
        let g = with_area(geometry(vec![(0.0, 0.0), (0.001, 0.0), (0.001, 0.001), (0.0, 0.0)]));
        assert!(g.area_hectares.is_some());
    }
}
