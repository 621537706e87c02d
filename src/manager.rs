//! Orchestration over the repositories: proximity results annotated with
//! computed distances, purge deletes, and the geo tool facade.

use serde::Serialize;
use tracing::info;

use crate::accessibility::AccessibilityNotificationDao;
use crate::altitude::AltitudeService;
use crate::error::Result;
use crate::geo::{self, UnitOfMeasurement};
use crate::models::{Coordinates, Trail};
use crate::trails::TrailDao;
use crate::Datasource;

/// A proximity hit: the trail, its closest point to the probe and the
/// distance to it, rounded to whole meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailDistance {
    pub distance_m: i64,
    pub coordinates: Coordinates,
    pub trail: Trail,
}

pub struct TrailManager {
    trails: TrailDao,
    notifications: AccessibilityNotificationDao,
}

impl TrailManager {
    pub fn new(datasource: &Datasource) -> Self {
        TrailManager {
            trails: TrailDao::new(datasource),
            notifications: AccessibilityNotificationDao::new(datasource),
        }
    }

    pub fn trails(&self) -> &TrailDao {
        &self.trails
    }

    /// Radial search around `point`. `any_point` switches between matching
    /// trail start positions and matching any point of the geometry; either
    /// way each hit is annotated with the closest coordinate and its
    /// distance.
    pub fn get_by_geo(
        &self,
        point: &Coordinates,
        distance: f64,
        unit: UnitOfMeasurement,
        any_point: bool,
        limit: i64,
    ) -> Result<Vec<TrailDistance>> {
        let meters = unit.to_meters(distance);
        let trails = if any_point {
            self.trails
                .find_near_any_point(point.longitude, point.latitude, meters, limit)?
        } else {
            self.trails
                .find_near_start_by_distance(point.longitude, point.latitude, meters, limit)?
        };
        Ok(trails
            .into_iter()
            .map(|trail| {
                let coordinates = if any_point {
                    closest_coordinate(point, &trail)
                } else {
                    trail.start_pos.coordinates.clone()
                };
                TrailDistance {
                    distance_m: geo::distance_meters(point, &coordinates).round() as i64,
                    coordinates,
                    trail,
                }
            })
            .collect())
    }

    /// Deletes a trail; a purge also drops every accessibility notification
    /// still referencing its code.
    pub fn delete(&self, code: &str, purge: bool) -> Result<bool> {
        if purge {
            let mut dropped = 0;
            while self.notifications.delete_by_code(code)?.is_some() {
                dropped += 1;
            }
            info!(code, dropped, "purged accessibility notifications");
        }
        self.trails.delete(code)
    }
}

/// The geometry point of `trail` closest to `point`; trails read without
/// geometry fall back to their start position.
fn closest_coordinate(point: &Coordinates, trail: &Trail) -> Coordinates {
    trail
        .coordinates
        .iter()
        .map(|c| &c.coordinates)
        .min_by(|a, b| {
            geo::distance_meters(point, a)
                .total_cmp(&geo::distance_meters(point, b))
        })
        .cloned()
        .unwrap_or_else(|| trail.start_pos.coordinates.clone())
}

/// Facade for the coordinate utilities exposed upward.
pub struct GeoToolManager<A: AltitudeService> {
    altitude_service: A,
}

impl<A: AltitudeService> GeoToolManager<A> {
    pub fn new(altitude_service: A) -> Self {
        GeoToolManager { altitude_service }
    }

    /// Pure pass-through to the elevation provider; its failures surface
    /// directly.
    pub fn altitude(&self, latitude: f64, longitude: f64) -> Result<f64> {
        self.altitude_service.altitude(latitude, longitude)
    }

    /// Sum of great-circle legs along the given order of points.
    pub fn total_distance(&self, points: &[Coordinates]) -> f64 {
        geo::total_distance(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{
        GeoLineString, Position, StatsTrailMetadata, TrailClassification, TrailCoordinates,
    };
    use chrono::Utc;

    struct FixedAltitude(f64);

    impl AltitudeService for FixedAltitude {
        fn altitude(&self, _latitude: f64, _longitude: f64) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct BrokenAltitude;

    impl AltitudeService for BrokenAltitude {
        fn altitude(&self, _latitude: f64, _longitude: f64) -> Result<f64> {
            Err(Error::Elevation("provider down".to_string()))
        }
    }

    fn position(lat: f64, lon: f64) -> Position {
        Position {
            name: "p".to_string(),
            tags: Vec::new(),
            coordinates: Coordinates::new(lat, lon),
        }
    }

    fn trail_with_points(points: &[(f64, f64)]) -> Trail {
        let coordinates: Vec<TrailCoordinates> = points
            .iter()
            .map(|(lat, lon)| TrailCoordinates {
                coordinates: Coordinates::new(*lat, *lon),
                distance_from_trail_start: 0.0,
            })
            .collect();
        Trail {
            name: "t".to_string(),
            description: String::new(),
            code: "T1".to_string(),
            start_pos: position(44.0, 11.0),
            final_pos: position(44.1, 11.1),
            locations: Vec::new(),
            geo_line: GeoLineString::from_trail_coordinates(&coordinates),
            coordinates,
            classification: TrailClassification::T,
            country: "IT".to_string(),
            last_update: Utc::now(),
            maintaining_section: "s".to_string(),
            stats_metadata: StatsTrailMetadata::default(),
            media: Vec::new(),
        }
    }

    #[test]
    fn altitude_passes_through_the_provider() {
        let manager = GeoToolManager::new(FixedAltitude(780.5));
        assert_eq!(manager.altitude(44.0, 11.0).unwrap(), 780.5);
    }

    #[test]
    fn provider_failures_surface_unchanged() {
        let manager = GeoToolManager::new(BrokenAltitude);
        assert!(matches!(
            manager.altitude(44.0, 11.0).unwrap_err(),
            Error::Elevation(_)
        ));
    }

    #[test]
    fn total_distance_of_degenerate_paths_is_zero() {
        let manager = GeoToolManager::new(FixedAltitude(0.0));
        assert_eq!(manager.total_distance(&[]), 0.0);
        assert_eq!(manager.total_distance(&[Coordinates::new(1.0, 2.0)]), 0.0);
    }

    #[test]
    fn closest_coordinate_picks_the_nearest_path_point() {
        let trail = trail_with_points(&[(44.0, 11.0), (44.5, 11.5), (45.0, 12.0)]);
        let probe = Coordinates::new(44.49, 11.51);
        let closest = closest_coordinate(&probe, &trail);
        assert_eq!(closest, Coordinates::new(44.5, 11.5));
    }

    #[test]
    fn closest_coordinate_falls_back_to_the_start_position() {
        let trail = trail_with_points(&[]);
        let probe = Coordinates::new(10.0, 10.0);
        assert_eq!(
            closest_coordinate(&probe, &trail),
            trail.start_pos.coordinates
        );
    }
}
