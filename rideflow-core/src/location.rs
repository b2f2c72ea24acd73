//! Pickup / drop location capture.
//!
//! A [`LocationSelector`] produces a [`Location`] either from the device position
//! (permission, fix, reverse geocode) or from a text search. Candidates from either
//! path, recent places or favourites are finalized with [`LocationSelector::choose`].

use async_trait::async_trait;
use rideflow_shared::Location;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Device error codes as reported by the platform position API
pub const CODE_PERMISSION_DENIED: u16 = 1;
pub const CODE_POSITION_UNAVAILABLE: u16 = 2;
pub const CODE_TIMEOUT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw failure from the device position API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionFailure {
    pub code: u16,
    pub message: String,
}

/// Failure from an address lookup collaborator (geocoder or place search)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LookupError(pub String);

#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    async fn current_position(&self) -> Result<Coordinates, PositionFailure>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Human readable address for a coordinate pair
    async fn reverse(&self, coordinates: Coordinates) -> Result<String, LookupError>;
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Location>, LookupError>;
}

/// Location acquisition errors. All are recoverable: the caller may retry
/// the same path or switch to the other one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("Position request timed out: {0}")]
    Timeout(String),

    #[error("Place search failed: {0}")]
    SearchFailed(String),
}

impl From<PositionFailure> for LocationError {
    fn from(failure: PositionFailure) -> Self {
        match failure.code {
            CODE_PERMISSION_DENIED => LocationError::PermissionDenied,
            CODE_TIMEOUT => LocationError::Timeout(failure.message),
            CODE_POSITION_UNAVAILABLE => LocationError::PositionUnavailable(failure.message),
            _ => LocationError::PositionUnavailable(failure.message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectorSettings {
    /// Hard bound on a single position fetch
    pub position_timeout: Duration,
    pub min_query_chars: usize,
    pub max_candidates: usize,
    pub recent_limit: usize,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            position_timeout: Duration::from_secs(10),
            min_query_chars: 2,
            max_candidates: 5,
            recent_limit: 5,
        }
    }
}

pub struct LocationSelector {
    positions: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlaceSearch>,
    settings: SelectorSettings,
    recent: VecDeque<Location>,
    favorites: Vec<Location>,
}

impl LocationSelector {
    pub fn new(
        positions: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlaceSearch>,
        settings: SelectorSettings,
    ) -> Self {
        Self {
            positions,
            geocoder,
            places,
            settings,
            recent: VecDeque::new(),
            favorites: Vec::new(),
        }
    }

    pub fn with_favorites(mut self, favorites: Vec<Location>) -> Self {
        self.favorites = favorites;
        self
    }

    /// Current device position as a location.
    ///
    /// A single attempt: permission denial stops immediately and nothing is retried.
    /// Reverse geocoding failures fall back to a "lat, lon" address instead of failing.
    pub async fn locate_device(&self) -> Result<Location, LocationError> {
        if self.positions.request_permission().await == Permission::Denied {
            info!("Location permission denied");
            return Err(LocationError::PermissionDenied);
        }

        let coordinates = match tokio::time::timeout(
            self.settings.position_timeout,
            self.positions.current_position(),
        )
        .await
        {
            Ok(Ok(coordinates)) => coordinates,
            Ok(Err(failure)) => {
                warn!("Position fetch failed (code {}): {}", failure.code, failure.message);
                return Err(failure.into());
            }
            Err(_) => {
                warn!("Position fetch exceeded {:?}", self.settings.position_timeout);
                return Err(LocationError::Timeout(format!(
                    "no position fix within {}s",
                    self.settings.position_timeout.as_secs()
                )));
            }
        };

        let fallback = Location::from_coordinates(coordinates.latitude, coordinates.longitude);
        if !fallback.has_valid_coordinates() {
            return Err(LocationError::PositionUnavailable(format!(
                "invalid coordinates {}",
                fallback.address
            )));
        }

        match self.geocoder.reverse(coordinates).await {
            Ok(address) if !address.trim().is_empty() => Ok(Location::new(
                coordinates.latitude,
                coordinates.longitude,
                address.trim(),
            )),
            Ok(_) => {
                debug!("Reverse geocoding returned an empty address, using coordinates");
                Ok(fallback)
            }
            Err(e) => {
                warn!("Reverse geocoding failed, using coordinates: {}", e);
                Ok(fallback)
            }
        }
    }

    /// Candidate locations for a text query. Too-short queries give no candidates.
    pub async fn search(&self, query: &str) -> Result<Vec<Location>, LocationError> {
        let query = query.trim();
        if query.chars().count() < self.settings.min_query_chars {
            return Ok(Vec::new());
        }

        let mut candidates = self
            .places
            .search(query)
            .await
            .map_err(|e| LocationError::SearchFailed(e.0))?;
        candidates.truncate(self.settings.max_candidates);

        debug!("Search '{}' returned {} candidates", query, candidates.len());
        Ok(candidates)
    }

    /// Finalize a candidate and remember it as a recent place
    pub fn choose(&mut self, location: Location) -> Location {
        self.recent.retain(|r| r.address != location.address);
        self.recent.push_front(location.clone());
        self.recent.truncate(self.settings.recent_limit);
        location
    }

    /// Most recent first
    pub fn recent(&self) -> impl Iterator<Item = &Location> {
        self.recent.iter()
    }

    pub fn favorites(&self) -> &[Location] {
        &self.favorites
    }
}
