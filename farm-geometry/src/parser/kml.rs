//! Extraction des candidats (Polygon) et des points isolés d'un document KML

use tracing::{debug, warn};

use crate::parser::coords::{parse_coordinates, parse_token};
use crate::parser::document::{Document, Element};
use crate::types::{CoordinatePair, Extraction, PointCluster, ShapeCandidate};

/// Nombre minimal de points valides avant fermeture de l'anneau
const MIN_RING_POINTS: usize = 3;

/// Parcourt les Placemarks du document et collecte candidats et points
///
/// Les candidats sont produits dans l'ordre de rencontre. Les points ne sont
/// collectés que si aucun candidat n'a été trouvé.
pub fn extract(document: &Document) -> Extraction {
    let placemarks = document.root().find_all("Placemark");
    debug!(placemarks = placemarks.len(), "Scanning placemarks");

    let mut shapes = Vec::new();

    for (index, placemark) in placemarks.iter().enumerate() {
        let name = placemark_name(*placemark, index);

        for polygon in placemark.find_all("Polygon") {
            let Some(text) = outer_coordinates(polygon) else {
                continue;
            };

            let mut points = parse_coordinates(text);
            if points.len() < MIN_RING_POINTS {
                debug!(name = %name, points = points.len(), "Polygon has too few valid points");
                continue;
            }

            close_ring(&mut points);
            if points.len() < MIN_RING_POINTS + 1 {
                warn!(name = %name, points = points.len(), "Degenerate ring discarded");
                continue;
            }

            debug!(name = %name, points = points.len(), "Polygon candidate");
            shapes.push(ShapeCandidate {
                name: name.clone(),
                points,
            });
        }
    }

    let points = if shapes.is_empty() {
        collect_points(&placemarks)
    } else {
        PointCluster::default()
    };

    Extraction { shapes, points }
}

/// Nom du Placemark: premier `<name>` non vide, sinon `Placemark_<index>`
fn placemark_name(placemark: Element<'_>, index: usize) -> String {
    placemark
        .find_all("name")
        .into_iter()
        .find_map(Element::trimmed_text)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Placemark_{}", index))
}

/// Texte de l'anneau extérieur; les `innerBoundaryIs` sont ignorés
fn outer_coordinates<'a>(polygon: Element<'a>) -> Option<&'a str> {
    polygon
        .find("outerBoundaryIs")
        .and_then(|outer| outer.find("coordinates"))
        .or_else(|| polygon.find("coordinates"))
        .and_then(Element::trimmed_text)
}

/// Ajoute le premier point en fin d'anneau s'il n'est pas déjà fermé
fn close_ring(points: &mut Vec<CoordinatePair>) {
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last {
            points.push(first);
        }
    }
}

/// Premier token valide de chaque `<Point>`
fn collect_points(placemarks: &[Element<'_>]) -> PointCluster {
    let points = placemarks
        .iter()
        .flat_map(|placemark| placemark.find_all("Point"))
        .filter_map(|point| point.find("coordinates"))
        .filter_map(Element::trimmed_text)
        .filter_map(|text| text.split_whitespace().find_map(|t| parse_token(t).ok()))
        .collect::<Vec<_>>();

    if !points.is_empty() {
        debug!(points = points.len(), "Standalone points collected");
    }

    PointCluster { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::document;

    fn extract_str(xml: &str) -> Extraction {
        extract(&document::parse(xml, "test").unwrap())
    }

    #[test]
    fn test_polygon_is_auto_closed() {
        let xml = r#"<kml><Placemark><name>Field</name><Polygon><outerBoundaryIs><LinearRing>
            <coordinates>0,0,0 1,0,0 1,1,0</coordinates>
            </LinearRing></outerBoundaryIs></Polygon></Placemark></kml>"#;
        let extraction = extract_str(xml);
        assert_eq!(extraction.shapes.len(), 1);
        let shape = &extraction.shapes[0];
        assert_eq!(shape.name, "Field");
        assert_eq!(shape.points.len(), 4);
        assert_eq!(shape.points.first(), shape.points.last());
        assert!(shape.is_closed());
    }

    #[test]
    fn test_already_closed_ring_is_not_duplicated() {
        let xml = "<kml><Placemark><Polygon><coordinates>0,0 1,0 1,1 0,1 0,0</coordinates></Polygon></Placemark></kml>";
        let extraction = extract_str(xml);
        assert_eq!(extraction.shapes[0].points.len(), 5);
    }

    #[test]
    fn test_missing_name_uses_placemark_index() {
        let xml = r#"<kml><Document>
            <Placemark><name>First</name><Point><coordinates>0,0</coordinates></Point></Placemark>
            <Placemark><Polygon><coordinates>0,0 1,0 1,1</coordinates></Polygon></Placemark>
            </Document></kml>"#;
        let extraction = extract_str(xml);
        assert_eq!(extraction.shapes.len(), 1);
        assert_eq!(extraction.shapes[0].name, "Placemark_1");
        // Des candidats existent: les points ne sont pas collectés
        assert!(extraction.points.is_empty());
    }

    #[test]
    fn test_polygon_with_too_few_valid_points_is_dropped() {
        let xml = "<kml><Placemark><Polygon><coordinates>0,0 abc,def 1,1</coordinates></Polygon></Placemark></kml>";
        let extraction = extract_str(xml);
        assert!(extraction.shapes.is_empty());
    }

    #[test]
    fn test_degenerate_ring_is_dropped() {
        // 3 points dont le dernier ferme déjà l'anneau
        let xml = "<kml><Placemark><Polygon><coordinates>0,0 1,1 0,0</coordinates></Polygon></Placemark></kml>";
        assert!(extract_str(xml).shapes.is_empty());
    }

    #[test]
    fn test_inner_boundary_is_ignored() {
        let xml = r#"<kml><Placemark><Polygon>
            <innerBoundaryIs><LinearRing><coordinates>0.2,0.2 0.4,0.2 0.4,0.4</coordinates></LinearRing></innerBoundaryIs>
            <outerBoundaryIs><LinearRing><coordinates>0,0 2,0 2,2 0,2</coordinates></LinearRing></outerBoundaryIs>
            </Polygon></Placemark></kml>"#;
        let extraction = extract_str(xml);
        assert_eq!(extraction.shapes[0].points.len(), 5);
        assert_eq!(extraction.shapes[0].points[1].x, 2.0);
    }

    #[test]
    fn test_points_are_collected_without_polygons() {
        let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Folder>
            <Placemark><Point><coordinates>106.91,-6.70,0</coordinates></Point></Placemark>
            <Placemark><Point><coordinates>bad,token</coordinates></Point></Placemark>
            <Placemark><Point><coordinates> 106.92,-6.69 </coordinates></Point></Placemark>
            </Folder></kml>"#;
        let extraction = extract_str(xml);
        assert!(extraction.shapes.is_empty());
        assert_eq!(extraction.points.len(), 2);
    }

    #[test]
    fn test_every_polygon_of_a_multigeometry_is_a_candidate() {
        let xml = r#"<kml><Placemark><name>Plots</name><MultiGeometry>
            <Polygon><coordinates>0,0 1,0 1,1</coordinates></Polygon>
            <Polygon><coordinates>5,5 6,5 6,6 5,6</coordinates></Polygon>
            </MultiGeometry></Placemark></kml>"#;
        let extraction = extract_str(xml);
        assert_eq!(extraction.shapes.len(), 2);
        assert!(extraction.shapes.iter().all(|s| s.name == "Plots"));
    }
}
