use crate::vehicle::{VehicleCatalog, VehicleClass};

/// Distance-based fare calculation.
///
/// Fares are whole currency units: `round(base_price + price_per_km * distance_km)`,
/// unless the caller supplies an explicit override.
#[derive(Debug, Clone, Copy, Default)]
pub struct FareEngine;

impl FareEngine {
    pub fn new() -> Self {
        Self
    }

    /// Quote a fare for one vehicle class
    pub fn quote(&self, class: &VehicleClass, distance_km: f64, override_price: Option<u32>) -> u32 {
        if let Some(price) = override_price {
            return price;
        }

        // Unknown / bogus distances price as a base fare
        let distance_km = if distance_km.is_finite() && distance_km > 0.0 {
            distance_km
        } else {
            0.0
        };

        let fare = (class.base_price + class.price_per_km * distance_km).round();
        if fare <= 0.0 {
            0
        } else if fare >= u32::MAX as f64 {
            u32::MAX
        } else {
            fare as u32
        }
    }

    /// Quote every class in the catalog, in catalog order
    pub fn quote_catalog<'a>(
        &self,
        catalog: &'a VehicleCatalog,
        distance_km: f64,
    ) -> Vec<(&'a VehicleClass, u32)> {
        catalog
            .classes()
            .iter()
            .map(|class| (class, self.quote(class, distance_km, None)))
            .collect()
    }
}
