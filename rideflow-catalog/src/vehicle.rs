use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A bookable class of vehicle with its tariff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleClass {
    pub id: String,
    pub name: String,
    /// Display text, e.g. "4 seats"
    pub capacity: String,
    /// Display text, e.g. "3 min"
    pub eta_label: String,
    pub base_price: f64,
    pub price_per_km: f64,
    pub description: String,
    pub color_tag: String,
}

impl VehicleClass {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        capacity: &str,
        eta_label: &str,
        base_price: f64,
        price_per_km: f64,
        description: &str,
        color_tag: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            capacity: capacity.to_string(),
            eta_label: eta_label.to_string(),
            base_price,
            price_per_km,
            description: description.to_string(),
            color_tag: color_tag.to_string(),
        }
    }

    fn has_valid_tariff(&self) -> bool {
        self.base_price.is_finite()
            && self.price_per_km.is_finite()
            && self.base_price >= 0.0
            && self.price_per_km >= 0.0
    }
}

/// Immutable list of vehicle classes offered in the booking flow
#[derive(Debug, Clone)]
pub struct VehicleCatalog {
    classes: Vec<VehicleClass>,
}

impl VehicleCatalog {
    /// Rejects duplicate ids and negative or non-finite tariffs
    pub fn new(classes: Vec<VehicleClass>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(class.id.as_str()) {
                return Err(CatalogError::DuplicateId(class.id.clone()));
            }
            if !class.has_valid_tariff() {
                return Err(CatalogError::InvalidTariff(class.id.clone()));
            }
        }

        Ok(Self { classes })
    }

    /// The standard city fleet
    pub fn standard() -> Self {
        Self {
            classes: vec![
                VehicleClass::new("bike", "Bike", "1 seat", "2 min", 20.0, 6.0, "Beat the traffic on two wheels", "#F59E0B"),
                VehicleClass::new("auto", "Auto", "3 seats", "3 min", 30.0, 9.0, "Doorstep autorickshaw rides", "#10B981"),
                VehicleClass::new("mini", "Mini", "4 seats", "4 min", 50.0, 10.0, "Comfy hatchbacks at everyday prices", "#3B82F6"),
                VehicleClass::new("sedan", "Sedan", "4 seats", "5 min", 70.0, 13.0, "Spacious sedans with extra legroom", "#6366F1"),
                VehicleClass::new("suv", "SUV", "6 seats", "7 min", 100.0, 17.0, "Room for the whole family and luggage", "#111827"),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&VehicleClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn classes(&self) -> &[VehicleClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate vehicle class id: {0}")]
    DuplicateId(String),

    #[error("Vehicle class {0} has a negative or non-finite tariff")]
    InvalidTariff(String),
}
