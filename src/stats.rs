//! Trail statistics computed from the geometry at import time.

use crate::geo;
use crate::models::{StatsTrailMetadata, TrailCoordinates};

/// Average hiker speed used for the ETA estimate, meters per hour.
const AVERAGE_SPEED_M_PER_H: f64 = 3500.0;
/// Ascent rate used for the ETA estimate, meters of rise per hour.
const ASCENT_SPEED_M_PER_H: f64 = 300.0;

/// Computes the full stats block for a trail geometry. Trails with fewer
/// than two points get all-zero stats.
pub fn calculate(coordinates: &[TrailCoordinates]) -> StatsTrailMetadata {
    StatsTrailMetadata {
        tot_rise: total_rise(coordinates),
        tot_fall: total_fall(coordinates),
        eta: eta_minutes(coordinates),
        length: trail_length(coordinates),
        highest_place: highest_place(coordinates),
        lowest_place: lowest_place(coordinates),
    }
}

pub fn trail_length(coordinates: &[TrailCoordinates]) -> f64 {
    let points: Vec<_> = coordinates.iter().map(|c| c.coordinates.clone()).collect();
    geo::total_distance(&points)
}

/// Sum of positive altitude deltas. Legs missing an altitude on either end
/// contribute nothing.
pub fn total_rise(coordinates: &[TrailCoordinates]) -> f64 {
    altitude_deltas(coordinates).filter(|d| *d > 0.0).sum()
}

/// Sum of negative altitude deltas, reported as a positive quantity.
pub fn total_fall(coordinates: &[TrailCoordinates]) -> f64 {
    -altitude_deltas(coordinates).filter(|d| *d < 0.0).sum::<f64>()
}

pub fn highest_place(coordinates: &[TrailCoordinates]) -> f64 {
    let highest = altitudes(coordinates).fold(f64::NAN, f64::max);
    if highest.is_nan() {
        0.0
    } else {
        highest
    }
}

pub fn lowest_place(coordinates: &[TrailCoordinates]) -> f64 {
    let lowest = altitudes(coordinates).fold(f64::NAN, f64::min);
    if lowest.is_nan() {
        0.0
    } else {
        lowest
    }
}

/// Walking-time estimate in minutes: horizontal time at average hiking speed
/// plus the time spent on the total ascent.
pub fn eta_minutes(coordinates: &[TrailCoordinates]) -> f64 {
    let horizontal = trail_length(coordinates) / AVERAGE_SPEED_M_PER_H;
    let vertical = total_rise(coordinates) / ASCENT_SPEED_M_PER_H;
    (horizontal + vertical) * 60.0
}

fn altitudes(coordinates: &[TrailCoordinates]) -> impl Iterator<Item = f64> + '_ {
    coordinates.iter().filter_map(|c| c.coordinates.altitude)
}

fn altitude_deltas(coordinates: &[TrailCoordinates]) -> impl Iterator<Item = f64> + '_ {
    coordinates.windows(2).filter_map(|pair| {
        match (pair[0].coordinates.altitude, pair[1].coordinates.altitude) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn point(lat: f64, lon: f64, altitude: f64) -> TrailCoordinates {
        TrailCoordinates {
            coordinates: Coordinates::with_altitude(lat, lon, altitude),
            distance_from_trail_start: 0.0,
        }
    }

    #[test]
    fn rise_and_fall_split_the_profile() {
        let path = [
            point(44.0, 11.0, 100.0),
            point(44.01, 11.0, 350.0),
            point(44.02, 11.0, 250.0),
            point(44.03, 11.0, 400.0),
        ];
        assert_eq!(total_rise(&path), 400.0);
        assert_eq!(total_fall(&path), 100.0);
        assert_eq!(highest_place(&path), 400.0);
        assert_eq!(lowest_place(&path), 100.0);
    }

    #[test]
    fn legs_without_altitude_are_skipped() {
        let mut path = vec![point(44.0, 11.0, 100.0), point(44.01, 11.0, 300.0)];
        path.push(TrailCoordinates {
            coordinates: Coordinates::new(44.02, 11.0),
            distance_from_trail_start: 0.0,
        });
        assert_eq!(total_rise(&path), 200.0);
        assert_eq!(total_fall(&path), 0.0);
    }

    #[test]
    fn empty_geometry_has_zero_stats() {
        let stats = calculate(&[]);
        assert_eq!(stats, StatsTrailMetadata::default());
    }

    #[test]
    fn eta_accounts_for_length_and_ascent() {
        // ~1.11 km flat leg plus 300 m of rise: 300 m of ascent alone adds
        // an hour at the configured ascent speed.
        let path = [point(0.0, 0.0, 0.0), point(0.01, 0.0, 300.0)];
        let eta = eta_minutes(&path);
        let horizontal_minutes = trail_length(&path) / 3500.0 * 60.0;
        assert!((eta - (horizontal_minutes + 60.0)).abs() < 1e-6);
    }

    #[test]
    fn length_follows_the_haversine_sum() {
        let path = [point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0)];
        assert!((trail_length(&path) - 111_195.0).abs() < 100.0);
    }
}
