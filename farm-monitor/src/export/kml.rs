//! Géométrie retenue sous forme de document KML minimal
//!
//! Le document produit se relit avec `farm_geometry` et redonne le même anneau.

use farm_geometry::parser::coords::format_coordinates;
use farm_geometry::ResolvedGeometry;

/// Construit un document KML à un seul Placemark
pub fn to_kml(resolved: &ResolvedGeometry, fallback_name: &str) -> String {
    let name = resolved.name.as_deref().unwrap_or(fallback_name);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>{}</name>
      <description>source: {}</description>
      <Polygon>
        <outerBoundaryIs>
          <LinearRing>
            <coordinates>{}</coordinates>
          </LinearRing>
        </outerBoundaryIs>
      </Polygon>
    </Placemark>
  </Document>
</kml>
"#,
        escape_xml(name),
        resolved.source,
        format_coordinates(resolved.ring())
    )
}

/// Échappe le texte d'un élément XML
fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_geometry::GeometrySource;

    #[test]
    fn test_kml_round_trip() {
        let original = farm_geometry::resolve_str(
            "<kml><Placemark><name>A &amp; B</name><Polygon><coordinates>106.91,-6.70 106.915,-6.70 106.915,-6.695</coordinates></Polygon></Placemark></kml>",
        )
        .unwrap();

        let kml = to_kml(&original, "Farm");
        assert!(kml.contains("<name>A &amp; B</name>"));

        let reread = farm_geometry::resolve_str(&kml).unwrap();
        assert_eq!(reread.source, GeometrySource::SinglePolygon);
        assert_eq!(reread.name.as_deref(), Some("A & B"));
        assert_eq!(reread.ring(), original.ring());
    }

    #[test]
    fn test_unnamed_geometry_uses_fallback_name() {
        let g = farm_geometry::resolve::fallback();
        assert!(to_kml(&g, "Double U Farm").contains("<name>Double U Farm</name>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
