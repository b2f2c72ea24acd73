use crate::error::SetupError;
use rideflow_booking::{BookingFlow, HttpBookingGateway, SimulatedBookingGateway};
use rideflow_catalog::VehicleCatalog;
use rideflow_core::{
    BookingGateway, Geocoder, KeyValueStore, LocationSelector, PlaceSearch, PositionProvider,
    SelectorSettings,
};
use rideflow_store::app_config::{
    Config, GatewayConfig, GatewayMode, LocationConfig, StorageBackend, StorageConfig,
};
use rideflow_store::{FileKeyValueStore, MemoryKeyValueStore, RedisKeyValueStore, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a booking session needs, built once at start-up
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub catalog: Arc<VehicleCatalog>,
    pub gateway: Arc<dyn BookingGateway>,
    pub selector_settings: SelectorSettings,
    /// Latency of the simulated collaborators
    pub simulated_delay: Duration,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Result<Self, SetupError> {
        let storage = build_storage(&config.storage)?;
        let session = SessionStore::restore(storage).await;

        Ok(Self {
            session: Arc::new(session),
            catalog: Arc::new(VehicleCatalog::standard()),
            gateway: build_gateway(&config.gateway)?,
            selector_settings: selector_settings(&config.location),
            simulated_delay: config.gateway.simulated_delay(),
        })
    }

    /// A fresh funnel sharing this state's session
    pub fn booking_flow(&self) -> BookingFlow {
        BookingFlow::new(self.session.clone(), self.catalog.clone(), self.gateway.clone())
    }

    pub fn location_selector(
        &self,
        positions: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlaceSearch>,
    ) -> LocationSelector {
        LocationSelector::new(positions, geocoder, places, self.selector_settings.clone())
    }
}

pub fn build_storage(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, SetupError> {
    let storage: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        StorageBackend::File => Arc::new(FileKeyValueStore::new(&config.path)),
        StorageBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or(SetupError::MissingSetting("storage.redis_url"))?;
            let store = RedisKeyValueStore::new(url, &config.key_prefix)
                .map_err(|e| SetupError::Storage(e.to_string()))?;
            Arc::new(store)
        }
    };

    info!("Session storage backend: {:?}", config.backend);
    Ok(storage)
}

pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn BookingGateway>, SetupError> {
    let gateway: Arc<dyn BookingGateway> = match config.mode {
        GatewayMode::Simulated => Arc::new(SimulatedBookingGateway::new(config.simulated_delay())),
        GatewayMode::Http => {
            let base_url = config
                .base_url
                .as_deref()
                .ok_or(SetupError::MissingSetting("gateway.base_url"))?;
            Arc::new(HttpBookingGateway::new(base_url))
        }
    };

    info!("Booking gateway: {:?}", config.mode);
    Ok(gateway)
}

pub fn selector_settings(config: &LocationConfig) -> SelectorSettings {
    SelectorSettings {
        position_timeout: config.position_timeout(),
        min_query_chars: config.min_query_chars,
        max_candidates: config.max_candidates,
        recent_limit: config.recent_limit,
    }
}
