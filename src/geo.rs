//! Spherical-earth distance helpers shared by the stats calculator and the
//! proximity managers.

use crate::models::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in meters between two WGS84 points (haversine).
pub fn distance_meters(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c * 1000.0
}

/// Sum of consecutive great-circle distances along an ordered path.
/// Zero or one point yields 0.
pub fn total_distance(points: &[Coordinates]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_meters(&pair[0], &pair[1]))
        .sum()
}

/// Radial distance unit accepted by the proximity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfMeasurement {
    Km,
    M,
}

impl UnitOfMeasurement {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            UnitOfMeasurement::Km => value * 1000.0,
            UnitOfMeasurement::M => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_at_identity() {
        let p = Coordinates::new(44.49, 11.34);
        assert_eq!(distance_meters(&p, &p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinates::new(44.49, 11.34);
        let b = Coordinates::new(43.77, 11.25);
        assert!((distance_meters(&a, &b) - distance_meters(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_meridian_is_about_111_km() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let d = distance_meters(&a, &b);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn bologna_florence_is_about_81_km() {
        let bologna = Coordinates::new(44.4949, 11.3426);
        let florence = Coordinates::new(43.7696, 11.2558);
        let d = distance_meters(&bologna, &florence);
        assert!((d / 1000.0 - 81.0).abs() < 2.0, "got {} km", d / 1000.0);
    }

    #[test]
    fn total_distance_is_additive() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        let c = Coordinates::new(0.0, 2.0);
        let total = total_distance(&[a.clone(), b.clone(), c.clone()]);
        let parts = distance_meters(&a, &b) + distance_meters(&b, &c);
        assert!((total - parts).abs() < 1e-9);
    }

    #[test]
    fn equally_spaced_meridian_points_double_the_leg() {
        let points = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(1.0, 0.0),
            Coordinates::new(2.0, 0.0),
        ];
        let leg = distance_meters(&points[0], &points[1]);
        assert!((total_distance(&points) - 2.0 * leg).abs() < 1.0);
    }

    #[test]
    fn short_and_empty_paths_have_no_length() {
        assert_eq!(total_distance(&[]), 0.0);
        assert_eq!(total_distance(&[Coordinates::new(1.0, 1.0)]), 0.0);
    }

    #[test]
    fn kilometers_convert_to_meters() {
        assert_eq!(UnitOfMeasurement::Km.to_meters(2.5), 2500.0);
        assert_eq!(UnitOfMeasurement::M.to_meters(400.0), 400.0);
    }
}
