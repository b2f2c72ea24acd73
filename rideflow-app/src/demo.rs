//! Scripted customer session: sign in, pick the customer role, book a ride.

use crate::simulated::{SimulatedGeocoder, SimulatedPlaceSearch};
use crate::state::AppState;
use anyhow::{anyhow, Context};
use rideflow_catalog::FareEngine;
use rideflow_core::{PositionProvider, Role};
use rideflow_shared::Booking;
use rideflow_store::ProfileUpdate;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEMO_PHONE: &str = "+919876543210";
pub const DEMO_DROP_QUERY: &str = "hitech";
pub const DEMO_VEHICLE: &str = "mini";

pub async fn run(state: &AppState, device: Arc<dyn PositionProvider>) -> anyhow::Result<Booking> {
    let session = &state.session;

    if !session.is_authenticated().await {
        // OTP verification is simulated: any phone gets a token
        session.set_phone(Some(DEMO_PHONE.to_string())).await;
        session.set_token(Some(format!("demo-{}", Uuid::new_v4()))).await;
    }
    if !session.is_profile_complete().await {
        session.set_profile(ProfileUpdate::name("Guest Rider")).await;
    }

    let destination = session.destination_for(Role::Customer).await;
    if destination.is_onboarding() {
        info!("Customer onboarding required ({:?})", destination);
        session.verify_role(Role::Customer).await;
    }
    info!("Landing on {:?}", session.destination_for(Role::Customer).await);

    let mut selector = state.location_selector(
        device,
        Arc::new(SimulatedGeocoder),
        Arc::new(SimulatedPlaceSearch::new(state.simulated_delay)),
    );

    let pickup = match selector.locate_device().await {
        Ok(location) => location,
        Err(e) => {
            warn!("Device location unavailable ({}), searching instead", e);
            selector
                .search("charminar")
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("no pickup candidates"))?
        }
    };
    let pickup = selector.choose(pickup);

    let drop = selector
        .search(DEMO_DROP_QUERY)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no drop candidates for '{}'", DEMO_DROP_QUERY))?;
    let drop = selector.choose(drop);

    let mut flow = state.booking_flow();
    flow.set_pickup(pickup)?;
    flow.set_drop(drop)?;

    let distance_km = flow.draft().distance_km.unwrap_or(0.0);
    for (class, price) in FareEngine::new().quote_catalog(flow.catalog(), distance_km) {
        info!("{:<6} {:>5}  ({}, {})", class.name, price, class.capacity, class.eta_label);
    }

    flow.select_vehicle(DEMO_VEHICLE).await?;
    flow.proceed_to_confirm()?;
    let booking = flow.submit().await.context("submitting booking")?;

    info!(
        "Booked {} from {} to {} for {} ({} km)",
        booking.vehicle_name,
        booking.pickup_address,
        booking.drop_address.as_deref().unwrap_or("-"),
        booking.price,
        booking.distance_km.unwrap_or(0.0)
    );
    Ok(booking)
}
