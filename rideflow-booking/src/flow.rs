use crate::models::{BookingDraft, BookingStep, BookingSummary};
use rideflow_catalog::{FareEngine, VehicleCatalog};
use rideflow_core::{distance_between, BookingGateway, GatewayError};
use rideflow_shared::{Booking, BookingType, Location};
use rideflow_store::SessionStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Linear booking funnel: Pickup → Drop → Vehicle → Confirm → Submitted.
///
/// Going back only moves the step pointer; data entered on later steps is kept.
/// A [`Booking`] is created only by a successful [`BookingFlow::submit`].
pub struct BookingFlow {
    session: Arc<SessionStore>,
    catalog: Arc<VehicleCatalog>,
    fares: FareEngine,
    gateway: Arc<dyn BookingGateway>,
    booking_type: BookingType,
    step: BookingStep,
    draft: BookingDraft,
    fare_override: Option<u32>,
}

impl BookingFlow {
    pub fn new(
        session: Arc<SessionStore>,
        catalog: Arc<VehicleCatalog>,
        gateway: Arc<dyn BookingGateway>,
    ) -> Self {
        Self {
            session,
            catalog,
            fares: FareEngine::new(),
            gateway,
            booking_type: BookingType::Ride,
            step: BookingStep::Pickup,
            draft: BookingDraft::default(),
            fare_override: None,
        }
    }

    pub fn with_booking_type(mut self, booking_type: BookingType) -> Self {
        self.booking_type = booking_type;
        self
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    pub fn set_pickup(&mut self, location: Location) -> Result<(), FlowError> {
        self.expect_step(BookingStep::Pickup)?;
        validate(&location)?;

        debug!("Pickup set to {}", location.address);
        self.draft.pickup = Some(location);
        self.refresh_quote();
        self.step = BookingStep::Drop;
        Ok(())
    }

    pub fn set_drop(&mut self, location: Location) -> Result<(), FlowError> {
        self.expect_step(BookingStep::Drop)?;
        validate(&location)?;

        debug!("Drop set to {}", location.address);
        self.draft.drop = Some(location);
        self.refresh_quote();
        self.step = BookingStep::Vehicle;
        Ok(())
    }

    /// Pick a vehicle class and quote it. The latest selection wins.
    pub async fn select_vehicle(&mut self, class_id: &str) -> Result<u32, FlowError> {
        self.select(class_id, None).await
    }

    /// Pick a vehicle class at an agreed fare instead of the computed one
    pub async fn select_vehicle_with_fare(
        &mut self,
        class_id: &str,
        price: u32,
    ) -> Result<u32, FlowError> {
        self.select(class_id, Some(price)).await
    }

    async fn select(&mut self, class_id: &str, fare_override: Option<u32>) -> Result<u32, FlowError> {
        self.expect_step(BookingStep::Vehicle)?;
        let class = self
            .catalog
            .get(class_id)
            .ok_or_else(|| FlowError::UnknownVehicleClass(class_id.to_string()))?;

        let distance_km = self.draft.distance_km.unwrap_or(0.0);
        let price = self.fares.quote(class, distance_km, fare_override);

        self.draft.vehicle_class_id = Some(class.id.clone());
        self.draft.quoted_price = Some(price);
        self.fare_override = fare_override;
        self.session.select_vehicle_class(Some(class.id.clone())).await;

        info!("Quoted {} for {} over {} km", price, class.name, distance_km);
        Ok(price)
    }

    pub fn proceed_to_confirm(&mut self) -> Result<(), FlowError> {
        self.expect_step(BookingStep::Vehicle)?;
        self.require_complete()?;
        self.step = BookingStep::Confirm;
        Ok(())
    }

    /// Move to the previous step without dropping any entered data
    pub fn back(&mut self) -> Result<BookingStep, FlowError> {
        if self.step.is_terminal() {
            return Err(FlowError::Finished(self.step));
        }

        let previous = self.step.previous().ok_or(FlowError::NoPreviousStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// Everything needed to book, once pickup, drop and vehicle are all chosen
    pub fn summary(&self) -> Option<BookingSummary> {
        let pickup = self.draft.pickup.clone()?;
        let drop = self.draft.drop.clone()?;
        let class = self.catalog.get(self.draft.vehicle_class_id.as_deref()?)?;

        Some(BookingSummary {
            pickup,
            drop,
            vehicle_class_id: class.id.clone(),
            vehicle_name: class.name.clone(),
            eta_label: class.eta_label.clone(),
            distance_km: self.draft.distance_km.unwrap_or(0.0),
            price: self.draft.quoted_price?,
        })
    }

    /// Create the booking. On a gateway failure the flow stays on Confirm with the
    /// draft intact so the user can retry.
    pub async fn submit(&mut self) -> Result<Booking, FlowError> {
        self.expect_step(BookingStep::Confirm)?;
        self.require_complete()?;
        let summary = self.summary().ok_or(FlowError::MissingVehicle)?;

        let booking = Booking::new(
            self.booking_type,
            summary.vehicle_name,
            summary.pickup.address,
            Some(summary.drop.address),
            summary.price,
            Some(summary.distance_km),
        );

        if let Err(e) = self.gateway.submit_booking(&booking).await {
            warn!("Booking submission failed, staying on confirm: {}", e);
            return Err(e.into());
        }

        self.session.append_booking(booking.clone()).await;
        self.session.select_vehicle_class(None).await;
        self.draft = BookingDraft::default();
        self.fare_override = None;
        self.step = BookingStep::Submitted(booking.id);

        info!("Booking {} submitted", booking.id);
        Ok(booking)
    }

    /// Abandon the flow from any non-terminal step. Nothing is booked.
    pub async fn cancel(&mut self) -> Result<(), FlowError> {
        if self.step.is_terminal() {
            return Err(FlowError::Finished(self.step));
        }

        info!("Booking flow cancelled at {:?}", self.step);
        self.draft = BookingDraft::default();
        self.fare_override = None;
        self.step = BookingStep::Cancelled;
        self.session.select_vehicle_class(None).await;
        Ok(())
    }

    fn expect_step(&self, expected: BookingStep) -> Result<(), FlowError> {
        if self.step.is_terminal() {
            return Err(FlowError::Finished(self.step));
        }
        if self.step != expected {
            return Err(FlowError::InvalidStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn require_complete(&self) -> Result<(), FlowError> {
        if self.draft.pickup.is_none() {
            return Err(FlowError::MissingPickup);
        }
        if self.draft.drop.is_none() {
            return Err(FlowError::MissingDrop);
        }
        match self.draft.vehicle_class_id.as_deref() {
            Some(id) if !id.is_empty() && self.draft.quoted_price.is_some() => Ok(()),
            _ => Err(FlowError::MissingVehicle),
        }
    }

    /// Recompute distance once both legs exist, and re-quote any selected vehicle
    fn refresh_quote(&mut self) {
        if self.draft.pickup.is_none() || self.draft.drop.is_none() {
            return;
        }

        let distance_km = distance_between(self.draft.pickup.as_ref(), self.draft.drop.as_ref());
        self.draft.distance_km = Some(distance_km);
        debug!("Trip distance {} km", distance_km);

        let class = self
            .draft
            .vehicle_class_id
            .as_deref()
            .and_then(|id| self.catalog.get(id));
        if let Some(class) = class {
            self.draft.quoted_price = Some(self.fares.quote(class, distance_km, self.fare_override));
        }
    }
}

fn validate(location: &Location) -> Result<(), FlowError> {
    if !location.has_valid_coordinates() || location.address.trim().is_empty() {
        return Err(FlowError::InvalidLocation(location.address.clone()));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Expected step {expected:?} but flow is at {actual:?}")]
    InvalidStep {
        expected: BookingStep,
        actual: BookingStep,
    },

    #[error("Booking flow already finished ({0:?})")]
    Finished(BookingStep),

    #[error("Already at the first step")]
    NoPreviousStep,

    #[error("Invalid location: '{0}'")]
    InvalidLocation(String),

    #[error("Unknown vehicle class: {0}")]
    UnknownVehicleClass(String),

    #[error("Pickup location not set")]
    MissingPickup,

    #[error("Drop location not set")]
    MissingDrop,

    #[error("No vehicle class selected")]
    MissingVehicle,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
