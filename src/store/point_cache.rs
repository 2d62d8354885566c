//! Interning of corner coordinates.

use crate::store::error::StoreError;
use crate::types::ids::PointId;
use crate::types::lat_lon::LatLon;
use crate::types::point::{Point, PointKey};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Maps each rounded coordinate to exactly one [`Point`].
///
/// Lookup and insertion happen under one `&mut self` borrow, so callers that share the
/// cache behind a lock get an atomic get-or-create. Points are never deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCache {
    points: Vec<Point>,
    by_key: HashMap<PointKey, PointId>,
}

impl PointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the point for `coordinate` rounded to 9 decimals, creating it on first use.
    ///
    /// # Examples
    ///
    /// ```
    /// use skywind::{LatLon, PointCache};
    ///
    /// let mut cache = PointCache::new();
    /// let first = cache.get_or_create(LatLon(46.1234567891, 23.5));
    /// let second = cache.get_or_create(LatLon(46.1234567894, 23.5));
    /// assert_eq!(first.id, second.id);
    /// assert_eq!(first.lat, 46.123456789);
    /// ```
    pub fn get_or_create(&mut self, coordinate: LatLon) -> Point {
        let key = PointKey::from_coordinate(coordinate);
        match self.by_key.entry(key) {
            Entry::Occupied(entry) => self.points[entry.get().0 as usize],
            Entry::Vacant(entry) => {
                let rounded = key.coordinate();
                let point = Point {
                    id: PointId(self.points.len() as u64),
                    lat: rounded.0,
                    lon: rounded.1,
                };
                entry.insert(point.id);
                self.points.push(point);
                point
            }
        }
    }

    pub fn get(&self, id: PointId) -> Result<&Point, StoreError> {
        self.points
            .get(id.0 as usize)
            .ok_or(StoreError::UnknownPoint(id))
    }

    pub fn coordinate(&self, id: PointId) -> Result<LatLon, StoreError> {
        self.get(id).map(Point::coordinate)
    }

    /// Existing point for `coordinate`, without creating one.
    pub fn find(&self, coordinate: LatLon) -> Option<&Point> {
        self.by_key
            .get(&PointKey::from_coordinate(coordinate))
            .and_then(|id| self.points.get(id.0 as usize))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[test]
    fn test_same_rounded_coordinate_is_one_point() {
        let mut cache = PointCache::new();
        let a = cache.get_or_create(LatLon(46.7712, 23.6236));
        let b = cache.get_or_create(LatLon(46.7712000000004, 23.6236));
        let c = cache.get_or_create(LatLon(46.771201, 23.6236));
        assert_eq!(a, b);
        assert_ne!(a.id, c.id);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(a.id).unwrap().coordinate(), a.coordinate());
    }

    #[test]
    fn test_unknown_point() {
        let cache = PointCache::new();
        assert!(matches!(
            cache.get(PointId(3)),
            Err(StoreError::UnknownPoint(PointId(3)))
        ));
        assert!(cache.find(LatLon(0.0, 0.0)).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_yields_single_point() {
        let cache = Arc::new(Mutex::new(PointCache::new()));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.lock().await.get_or_create(LatLon(10.5, -3.25))
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(cache.lock().await.len(), 1);
    }
}
