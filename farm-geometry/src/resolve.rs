//! Politique de sélection du polygone canonique
//!
//! Quatre cas, dans l'ordre:
//! 1. aucun candidat, des points isolés: emprise des points + marge
//! 2. un seul candidat: repris tel quel
//! 3. plusieurs candidats: le plus grand en nombre de points (premier en cas d'égalité)
//! 4. rien d'exploitable: rectangle de repli

use geo::{BoundingRect, Coord, MultiPoint, Point};
use tracing::{info, warn};

use crate::types::{
    CoordinatePair, Extraction, GeometrySource, PointCluster, ResolvedGeometry, ShapeCandidate,
};

/// Marge (degrés) ajoutée autour de l'emprise des points isolés
pub const BOUNDING_PADDING_DEG: f64 = 0.001;

/// Rectangle de repli autour du site de référence (Megamendung)
pub const FALLBACK_RING: [(f64, f64); 5] = [
    (106.9120, -6.7010),
    (106.9150, -6.7010),
    (106.9150, -6.6980),
    (106.9120, -6.6980),
    (106.9120, -6.7010),
];

/// Applique la politique de sélection à une extraction
pub fn resolve(extraction: Extraction) -> ResolvedGeometry {
    let Extraction { mut shapes, points } = extraction;

    match shapes.len() {
        0 if !points.is_empty() => bounding_area(&points),
        0 => fallback(),
        1 => {
            let shape = shapes.remove(0);
            info!(name = %shape.name, points = shape.point_count(), "Single polygon found");
            let mut geometry =
                ResolvedGeometry::from_ring(shape.points, GeometrySource::SinglePolygon);
            geometry.name = Some(shape.name);
            geometry
        }
        total => {
            let shape = shapes.swap_remove(largest_index(&shapes));
            info!(
                name = %shape.name,
                points = shape.point_count(),
                total_polygons = total,
                "Using largest polygon"
            );
            let mut geometry =
                ResolvedGeometry::from_ring(shape.points, GeometrySource::LargestPolygon);
            geometry.name = Some(shape.name);
            geometry.candidate_count = Some(total);
            geometry
        }
    }
}

/// Index du candidat ayant le plus de points, le premier rencontré en cas d'égalité
fn largest_index(shapes: &[ShapeCandidate]) -> usize {
    let mut best = 0;
    for (i, shape) in shapes.iter().enumerate().skip(1) {
        if shape.point_count() > shapes[best].point_count() {
            best = i;
        }
    }
    best
}

fn bounding_area(cluster: &PointCluster) -> ResolvedGeometry {
    let multi_point: MultiPoint<f64> = cluster.points.iter().map(|c| Point::from(*c)).collect();

    let Some(rect) = multi_point.bounding_rect() else {
        return fallback();
    };

    let (min_x, min_y) = (rect.min().x - BOUNDING_PADDING_DEG, rect.min().y - BOUNDING_PADDING_DEG);
    let (max_x, max_y) = (rect.max().x + BOUNDING_PADDING_DEG, rect.max().y + BOUNDING_PADDING_DEG);

    info!(points = cluster.len(), "No polygon found, using bounding area of points");

    let ring = vec![
        Coord { x: min_x, y: min_y },
        Coord { x: max_x, y: min_y },
        Coord { x: max_x, y: max_y },
        Coord { x: min_x, y: max_y },
        Coord { x: min_x, y: min_y },
    ];

    let mut geometry = ResolvedGeometry::from_ring(ring, GeometrySource::BoundingArea);
    geometry.candidate_count = Some(cluster.len());
    geometry
}

/// Rectangle de repli, ne peut pas échouer
pub fn fallback() -> ResolvedGeometry {
    warn!("No valid geometry found, using fallback area");
    let ring: Vec<CoordinatePair> = FALLBACK_RING
        .iter()
        .map(|&(x, y)| Coord { x, y })
        .collect();
    ResolvedGeometry::from_ring(ring, GeometrySource::Fallback)
}
