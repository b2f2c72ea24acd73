use async_trait::async_trait;
use rideflow_core::{BookingGateway, GatewayError};
use rideflow_shared::Booking;
use std::time::Duration;
use tracing::{error, info};

/// Accepts every booking after a fixed delay. Stands in for a backend that
/// does not exist yet.
pub struct SimulatedBookingGateway {
    delay: Duration,
}

impl SimulatedBookingGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl BookingGateway for SimulatedBookingGateway {
    async fn submit_booking(&self, booking: &Booking) -> Result<(), GatewayError> {
        tokio::time::sleep(self.delay).await;
        info!("Simulated backend accepted booking {}", booking.id);
        Ok(())
    }
}

/// Posts bookings as JSON to `{base_url}/bookings`
pub struct HttpBookingGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingGateway {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/bookings", self.base_url)
    }
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn submit_booking(&self, booking: &Booking) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(booking)
            .send()
            .await
            .map_err(|e| {
                error!("Booking {} could not reach backend: {}", booking.id, e);
                GatewayError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Backend rejected booking {} with {}", booking.id, status);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!("Backend accepted booking {}", booking.id);
        Ok(())
    }
}
