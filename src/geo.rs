//! Great-circle distance and walking-time conversion used to build the
//! transfer graph.

/// Mean earth radius in meters, per the WGS-84 reference.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Two stops within this distance of one another are linked by a transfer edge.
pub const TRANSFER_RADIUS_METERS: f64 = 1_500.0;

/// Assumed walking speed, in meters per second, used to derive transfer durations.
pub const WALKING_SPEED_MPS: f64 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Haversine great-circle distance to `other`, in meters.
    pub fn haversine_meters(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_METERS * c
    }
}

/// Converts a walking distance to a whole number of seconds, truncating
/// towards zero as the original engine does.
pub fn walk_seconds(meters: f64) -> u32 {
    (meters / WALKING_SPEED_MPS).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let a = Coordinate::new(40.7128, -74.0060);
        assert_eq!(a.haversine_meters(&a), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(40.7306, -73.9352);
        assert_eq!(a.haversine_meters(&b), b.haversine_meters(&a));
    }

    #[test]
    fn known_distance_is_within_tolerance() {
        // Roughly the distance between Times Square and the UN headquarters.
        let times_square = Coordinate::new(40.7580, -73.9855);
        let un_hq = Coordinate::new(40.7489, -73.9680);
        let d = times_square.haversine_meters(&un_hq);
        assert!((d - 1850.0).abs() < 150.0, "distance was {d}");
    }

    #[test]
    fn walk_seconds_truncates() {
        assert_eq!(walk_seconds(1.4), 1);
        assert_eq!(walk_seconds(2.7), 1);
        assert_eq!(walk_seconds(0.0), 0);
    }
}
