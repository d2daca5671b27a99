//! Géométrie retenue au format GeoJSON enrichi
//!
//! `{"type":"Polygon","coordinates":[[...]],"source":...}` plus, selon la
//! provenance, `name`, `total_polygons`, `point_count` et `area_ha`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ::geojson::{Geometry, JsonObject, JsonValue, Value};

use farm_geometry::{GeometrySource, ResolvedGeometry};

/// Construit l'objet JSON de la géométrie
pub fn to_json(resolved: &ResolvedGeometry) -> JsonObject {
    let geometry = Geometry::new(Value::from(&resolved.polygon));
    let mut object = JsonObject::from(&geometry);

    object.insert("source".into(), JsonValue::from(resolved.source.as_str()));

    if let Some(name) = &resolved.name {
        object.insert("name".into(), JsonValue::from(name.as_str()));
    }

    if let Some(count) = resolved.candidate_count {
        let key = match resolved.source {
            GeometrySource::BoundingArea => "point_count",
            _ => "total_polygons",
        };
        object.insert(key.into(), JsonValue::from(count));
    }

    if let Some(area) = resolved.area_hectares {
        object.insert("area_ha".into(), JsonValue::from(area));
    }

    object
}

/// Écrit la géométrie en GeoJSON dans un fichier
pub fn export_to_geojson(resolved: &ResolvedGeometry, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &to_json(resolved))?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(xml: &str) -> ResolvedGeometry {
        farm_geometry::area::with_area(farm_geometry::resolve_str(xml).unwrap())
    }

    #[test]
    fn test_single_polygon_json() {
        let g = resolved(
            "<kml><Placemark><name>Boundary</name><Polygon><coordinates>0,0 0.001,0 0.001,0.001 0,0.001</coordinates></Polygon></Placemark></kml>",
        );
        let json = to_json(&g);
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["source"], "single_polygon");
        assert_eq!(json["name"], "Boundary");
        assert!(json.get("total_polygons").is_none());
        assert!(json["area_ha"].as_f64().unwrap() > 0.0);

        let ring = json["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[1][0], 0.001);
    }

    #[test]
    fn test_bounding_area_reports_point_count() {
        let g = resolved(
            "<kml><Placemark><Point><coordinates>1,1</coordinates></Point></Placemark></kml>",
        );
        let json = to_json(&g);
        assert_eq!(json["source"], "bounding_area");
        assert_eq!(json["point_count"], 1);
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_export_to_geojson() {
        let g = resolved("<kml/>");
        let output_path = std::env::temp_dir().join("farm_monitor_fallback.geojson");

        export_to_geojson(&g, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let parsed: JsonValue = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["source"], "fallback");
        assert_eq!(parsed["coordinates"][0][0][0], 106.912);

        std::fs::remove_file(output_path).ok();
    }
}
