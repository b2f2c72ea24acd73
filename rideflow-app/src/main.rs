use rideflow_app::{demo, simulated::SimulatedDevice, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rideflow_app=debug,rideflow_store=info,rideflow_booking=info,rideflow_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rideflow_store::app_config::Config::load()?;
    tracing::info!("Starting Rideflow ({:?} storage)", config.storage.backend);

    let state = AppState::from_config(&config).await?;

    // Device parked next to Charminar
    let device = Arc::new(SimulatedDevice::at(17.3851, 78.4866));
    let booking = demo::run(&state, device).await?;

    let bookings = state.session.bookings().await;
    tracing::info!("Session holds {} booking(s); latest {}", bookings.len(), booking.id);
    Ok(())
}
