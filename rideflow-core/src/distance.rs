use rideflow_shared::Location;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in km rounded to one decimal
pub fn haversine_km(from: &Location, to: &Location) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_tenth(EARTH_RADIUS_KM * c)
}

/// Distance between two optional legs. Zero until both are known.
pub fn distance_between(from: Option<&Location>, to: Option<&Location>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => haversine_km(from, to),
        _ => 0.0,
    }
}

fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charminar() -> Location {
        Location::new(17.3850, 78.4867, "Charminar")
    }

    fn hitech_city() -> Location {
        Location::new(17.4483, 78.3915, "Hitech City")
    }

    #[test]
    fn test_charminar_to_hitech_city() {
        let km = haversine_km(&charminar(), &hitech_city());
        assert!((12.1..=13.5).contains(&km), "got {km}");
        assert_eq!(km, 12.3);
    }

    #[test]
    fn test_symmetric() {
        let points = [
            charminar(),
            hitech_city(),
            Location::new(-33.8688, 151.2093, "Sydney"),
            Location::new(51.5074, -0.1278, "London"),
            Location::new(0.0, 179.9, "Date line"),
        ];

        for a in &points {
            for b in &points {
                assert_eq!(haversine_km(a, b), haversine_km(b, a));
            }
        }
    }

    #[test]
    fn test_same_point_is_zero() {
        let a = charminar();
        assert_eq!(haversine_km(&a, &a), 0.0);
    }

    #[test]
    fn test_missing_leg_is_zero() {
        let a = charminar();
        assert_eq!(distance_between(Some(&a), None), 0.0);
        assert_eq!(distance_between(None, Some(&a)), 0.0);
        assert_eq!(distance_between(None, None), 0.0);
        assert_eq!(distance_between(Some(&a), Some(&hitech_city())), 12.3);
    }

    #[test]
    fn test_rounded_to_one_decimal() {
        let km = haversine_km(&Location::new(0.0, 0.0, "a"), &Location::new(0.0, 1.0, "b"));
        // 1 degree of longitude on the equator is ~111.19 km
        assert_eq!(km, 111.2);
    }
}
