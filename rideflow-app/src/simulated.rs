//! Stand-ins for the device position API, the geocoder and place search.
//! They answer from a fixed directory of Hyderabad landmarks after a short delay.

use async_trait::async_trait;
use rideflow_core::{
    haversine_km, Coordinates, Geocoder, LookupError, Permission, PlaceSearch, PositionFailure,
    PositionProvider,
};
use rideflow_shared::Location;
use std::time::Duration;

const DIRECTORY: &[(&str, f64, f64)] = &[
    ("Charminar, Hyderabad", 17.3850, 78.4867),
    ("Hitech City, Hyderabad", 17.4483, 78.3915),
    ("Secunderabad Railway Station", 17.4399, 78.4983),
    ("Rajiv Gandhi International Airport", 17.2403, 78.4294),
    ("Banjara Hills, Hyderabad", 17.4126, 78.4482),
    ("Gachibowli Stadium", 17.4435, 78.3489),
    ("Hussain Sagar Lake", 17.4239, 78.4738),
    ("Golconda Fort", 17.3833, 78.4011),
];

/// Geocoder matches snap to a landmark within this radius
const SNAP_RADIUS_KM: f64 = 1.0;

fn directory() -> impl Iterator<Item = Location> {
    DIRECTORY
        .iter()
        .map(|(name, lat, lon)| Location::new(*lat, *lon, *name))
}

pub struct SimulatedDevice {
    position: Coordinates,
    permission: Permission,
    delay: Duration,
}

impl SimulatedDevice {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Coordinates { latitude, longitude },
            permission: Permission::Granted,
            delay: Duration::from_millis(300),
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PositionProvider for SimulatedDevice {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinates, PositionFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(self.position)
    }
}

/// Reverse geocoding against the landmark directory
#[derive(Default)]
pub struct SimulatedGeocoder;

#[async_trait]
impl Geocoder for SimulatedGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, LookupError> {
        let here = Location::new(coordinates.latitude, coordinates.longitude, "");
        directory()
            .map(|place| (haversine_km(&here, &place), place))
            .filter(|(km, _)| *km <= SNAP_RADIUS_KM)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, place)| place.address)
            .ok_or_else(|| LookupError("no known place nearby".to_string()))
    }
}

pub struct SimulatedPlaceSearch {
    delay: Duration,
}

impl SimulatedPlaceSearch {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PlaceSearch for SimulatedPlaceSearch {
    async fn search(&self, query: &str) -> Result<Vec<Location>, LookupError> {
        tokio::time::sleep(self.delay).await;
        let query = query.to_lowercase();
        Ok(directory()
            .filter(|place| place.address.to_lowercase().contains(&query))
            .collect())
    }
}
