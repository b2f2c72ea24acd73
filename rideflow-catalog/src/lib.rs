pub mod pricing;
pub mod vehicle;

pub use pricing::FareEngine;
pub use vehicle::{CatalogError, VehicleCatalog, VehicleClass};
