//! GeoJSON export of a grid: region outline, center, region corners and one polygon per
//! zone carrying its metrics. Coordinates are `[lon, lat]`.

use crate::error::SkywindError;
use crate::store::error::StoreError;
use crate::store::region_store::RegionStore;
use crate::types::compass::compass_label_16;
use crate::types::ids::GridId;
use crate::types::lat_lon::{Corners, LatLon};
use serde_json::{json, Map, Value};

fn polygon_feature(name: String, corners: &Corners, properties: Map<String, Value>) -> Value {
    let mut properties = properties;
    properties.insert("name".to_string(), Value::String(name));
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [corners.closed_ring()],
        },
    })
}

fn point_feature(name: &str, point: LatLon) -> Value {
    json!({
        "type": "Feature",
        "properties": { "name": name },
        "geometry": {
            "type": "Point",
            "coordinates": point.lon_lat(),
        },
    })
}

/// Builds the `FeatureCollection` of `grid`.
pub fn grid_feature_collection(store: &RegionStore, grid: GridId) -> Result<Value, SkywindError> {
    let record = store.grid(grid)?;
    let region = store.region(record.region)?;
    let center = store.points().coordinate(region.center)?;
    let corner_ids = record
        .corners
        .or(region.corners)
        .ok_or_else(|| StoreError::MissingCorners(grid.to_string()))?;
    let corners = store.resolve_corners(corner_ids)?;

    let mut features = Vec::with_capacity(6 + record.zones.len());

    let mut region_properties = Map::new();
    region_properties.insert("region_id".to_string(), json!(region.id.get()));
    region_properties.insert("side_km".to_string(), json!(region.side_km));
    region_properties.insert(
        "metrics".to_string(),
        serde_json::to_value(&region.metrics)?,
    );
    features.push(polygon_feature(
        "Region Polygon".to_string(),
        &corners,
        region_properties,
    ));
    features.push(point_feature("center point", center));
    for (label, point) in ["A", "B", "C", "D"].iter().zip(corners.as_array()) {
        features.push(point_feature(&format!("Point {}", label), point));
    }

    let n = record.zones_per_edge.max(1);
    for zone in store.grid_zones(grid)? {
        let row = (zone.index - 1) / n + 1;
        let column = (zone.index - 1) % n + 1;
        let mut properties = Map::new();
        properties.insert("zone_id".to_string(), json!(zone.id.get()));
        properties.insert("zone_index".to_string(), json!(zone.index));
        properties.insert("status".to_string(), json!(zone.status().to_string()));
        if let Some(direction) = zone.metrics.wind_direction {
            properties.insert("wind_compass".to_string(), json!(compass_label_16(direction)));
        }
        properties.insert("metrics".to_string(), serde_json::to_value(&zone.metrics)?);
        features.push(polygon_feature(
            format!("Zone[{},{}]", row, column),
            &store.resolve_corners(zone.corners)?,
            properties,
        ));
    }

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::consistency::DEFAULT_TOLERANCE;
    use crate::geometry::zone_grid::GridGeometry;

    #[test]
    fn test_feature_collection_layout() -> Result<(), SkywindError> {
        let mut store = RegionStore::new();
        let geometry = GridGeometry::compute(LatLon(46.7712, 23.6236), 20.0, 3);
        let computed = store.apply_grid_geometry(&geometry, DEFAULT_TOLERANCE)?;
        let first = &mut store.zone_mut(computed.zones[0].id)?.metrics;
        first.wind_direction = Some(20.0);
        first.avg_wind_speed = Some(5.0);

        let collection = grid_feature_collection(&store, computed.grid)?;
        assert_eq!(collection["type"], "FeatureCollection");
        let features = collection["features"].as_array().unwrap();
        assert_eq!(features.len(), 1 + 1 + 4 + 9);

        assert_eq!(features[0]["properties"]["name"], "Region Polygon");
        let ring = features[0]["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        // [lon, lat]
        assert_eq!(ring[0][0], computed.corners.a.lon());

        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[6]["properties"]["name"], "Zone[1,1]");
        assert_eq!(features[6]["properties"]["wind_compass"], "NNE");
        assert_eq!(features[6]["properties"]["status"], "partially computed");
        assert_eq!(features[14]["properties"]["name"], "Zone[3,3]");
        assert!(features[14]["properties"]["metrics"]["potential"].is_null());
        Ok(())
    }
}
