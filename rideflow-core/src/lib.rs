pub mod distance;
pub mod location;
pub mod repository;
pub mod role;

pub use distance::{distance_between, haversine_km, EARTH_RADIUS_KM};
pub use location::{
    Coordinates, Geocoder, LocationError, LocationSelector, LookupError, Permission,
    PlaceSearch, PositionFailure, PositionProvider, SelectorSettings,
};
pub use repository::{BookingGateway, GatewayError, KeyValueStore, StorageError};
pub use role::{route, Destination, Role, RoleVerification};
