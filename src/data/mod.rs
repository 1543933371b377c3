use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use geojson::{Feature, GeoJson, Geometry, Value};
use tracing::debug;

use crate::map::geometry::{Polygon, Ring};
use crate::map::FeatureGrid;

/// Grid cell size in degrees for the country lookup index.
const GRID_CELL_DEGREES: f64 = 5.0;

/// One country feature: 3-letter code, optional display name, polygons.
#[derive(Debug, Clone)]
pub struct Country {
    pub code: String,
    pub name: Option<String>,
    pub polygons: Vec<Polygon>,
}

/// Static world geometry, immutable after load.
pub struct World {
    countries: Vec<Country>,
    grid: FeatureGrid,
}

impl World {
    pub fn from_countries(countries: Vec<Country>) -> Self {
        let mut grid = FeatureGrid::new(GRID_CELL_DEGREES);
        for (idx, country) in countries.iter().enumerate() {
            for polygon in &country.polygons {
                grid.insert(&polygon.bounds, idx as u16);
            }
        }
        Self { countries, grid }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Index of the country containing the point, if any.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<u16> {
        for &idx in self.grid.candidates(lon, lat) {
            let country = &self.countries[idx as usize];
            if country.polygons.iter().any(|p| p.contains(lon, lat)) {
                return Some(idx);
            }
        }
        None
    }
}

/// Load the world feature collection. Each feature is keyed by its `A3`
/// country code property; features without one are skipped.
pub fn load_world(path: &Path) -> Result<World> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read world geometry {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("parse world geometry {}", path.display()))?;

    let GeoJson::FeatureCollection(fc) = geojson else {
        bail!("world geometry {} is not a feature collection", path.display());
    };

    let mut countries = Vec::new();
    for feature in fc.features {
        let Some(code) = country_code(&feature) else {
            debug!("skipping feature without an A3 code");
            continue;
        };
        let Some(geometry) = &feature.geometry else {
            debug!(code = %code, "skipping feature without geometry");
            continue;
        };
        let polygons = extract_polygons(geometry);
        if polygons.is_empty() {
            debug!(code = %code, "skipping feature without polygon geometry");
            continue;
        }
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        countries.push(Country {
            code,
            name,
            polygons,
        });
    }

    ensure!(
        !countries.is_empty(),
        "no usable country features in {}",
        path.display()
    );
    Ok(World::from_countries(countries))
}

fn country_code(feature: &Feature) -> Option<String> {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get("A3"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn extract_polygons(geometry: &Geometry) -> Vec<Polygon> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);
    polygons
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            if let Some(polygon) = rings_to_polygon(rings) {
                out.push(polygon);
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(polygon) = rings_to_polygon(rings) {
                    out.push(polygon);
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let mut iter = rings.iter().map(|ring| to_ring(ring));
    let exterior = iter.next()?;
    if exterior.len() < 3 {
        return None;
    }
    let holes = iter.filter(|hole| hole.len() >= 3).collect();
    Some(Polygon::new(exterior, holes))
}

fn to_ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_COUNTRIES: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {"A3": "USA", "name": "United States"},
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[-120, 30], [-80, 30], [-80, 50], [-120, 50], [-120, 30]]]
          }
        },
        {
          "type": "Feature",
          "properties": {"A3": "FRA", "name": "France"},
          "geometry": {
            "type": "MultiPolygon",
            "coordinates": [
              [[[-2, 43], [8, 43], [8, 51], [-2, 51], [-2, 43]]],
              [[[8.5, 41.3], [9.6, 41.3], [9.6, 43.1], [8.5, 43.1], [8.5, 41.3]]]
            ]
          }
        },
        {
          "type": "Feature",
          "properties": {"name": "no code"},
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
          }
        }
      ]
    }"#;

    fn write_world(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_world_keys_features_by_a3() {
        let file = write_world(TWO_COUNTRIES);
        let world = load_world(file.path()).unwrap();
        assert_eq!(world.len(), 2);
        assert_eq!(world.countries()[0].code, "USA");
        assert_eq!(world.countries()[0].name.as_deref(), Some("United States"));
        assert_eq!(world.countries()[1].code, "FRA");
        assert_eq!(world.countries()[1].polygons.len(), 2);
    }

    #[test]
    fn test_locate_finds_the_containing_country() {
        let file = write_world(TWO_COUNTRIES);
        let world = load_world(file.path()).unwrap();
        assert_eq!(world.locate(-100.0, 40.0), Some(0));
        assert_eq!(world.locate(2.3, 48.9), Some(1));
        // Corsica lives in the second polygon of the same feature
        assert_eq!(world.locate(9.0, 42.0), Some(1));
        assert_eq!(world.locate(0.0, -40.0), None);
    }

    #[test]
    fn test_unreadable_or_empty_worlds_error() {
        assert!(load_world(Path::new("/definitely/not/here.geojson")).is_err());

        let not_json = write_world("not geojson at all");
        assert!(load_world(not_json.path()).is_err());

        let empty = write_world(r#"{"type": "FeatureCollection", "features": []}"#);
        assert!(load_world(empty.path()).is_err());
    }
}
