use serde::{Deserialize, Serialize};
use std::fmt;

/// The part of the app a user signs in as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Customer,
    CityDriver,
    IntercityDriver,
    Logistics,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Customer,
        Role::CityDriver,
        Role::IntercityDriver,
        Role::Logistics,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Customer => "customer",
            Role::CityDriver => "cityDriver",
            Role::IntercityDriver => "intercityDriver",
            Role::Logistics => "logistics",
        };
        f.write_str(name)
    }
}

/// Per-role onboarding completion. Flags only go from false to true;
/// a fresh value (logout) resets all of them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleVerification {
    pub customer: bool,
    pub city_driver: bool,
    pub intercity_driver: bool,
    pub logistics: bool,
}

impl RoleVerification {
    pub fn is_verified(&self, role: Role) -> bool {
        match role {
            Role::Customer => self.customer,
            Role::CityDriver => self.city_driver,
            Role::IntercityDriver => self.intercity_driver,
            Role::Logistics => self.logistics,
        }
    }

    /// Mark a role verified. Returns `true` if the flag changed.
    pub fn verify(&mut self, role: Role) -> bool {
        let flag = match role {
            Role::Customer => &mut self.customer,
            Role::CityDriver => &mut self.city_driver,
            Role::IntercityDriver => &mut self.intercity_driver,
            Role::Logistics => &mut self.logistics,
        };
        let changed = !*flag;
        *flag = true;
        changed
    }

    pub fn any_verified(&self) -> bool {
        Role::ALL.iter().any(|role| self.is_verified(*role))
    }
}

/// Where a user lands after picking a role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    CustomerHome,
    CustomerOnboarding,
    CityDriverHome,
    CityDriverOnboarding,
    IntercityDriverHome,
    IntercityDriverOnboarding,
    LogisticsHome,
    LogisticsOnboarding,
}

impl Destination {
    pub fn role(&self) -> Role {
        match self {
            Destination::CustomerHome | Destination::CustomerOnboarding => Role::Customer,
            Destination::CityDriverHome | Destination::CityDriverOnboarding => Role::CityDriver,
            Destination::IntercityDriverHome | Destination::IntercityDriverOnboarding => {
                Role::IntercityDriver
            }
            Destination::LogisticsHome | Destination::LogisticsOnboarding => Role::Logistics,
        }
    }

    pub fn is_onboarding(&self) -> bool {
        matches!(
            self,
            Destination::CustomerOnboarding
                | Destination::CityDriverOnboarding
                | Destination::IntercityDriverOnboarding
                | Destination::LogisticsOnboarding
        )
    }
}

/// Verified roles go to their main app, everyone else to that role's onboarding
pub fn route(role: Role, verification: &RoleVerification) -> Destination {
    let verified = verification.is_verified(role);
    match (role, verified) {
        (Role::Customer, true) => Destination::CustomerHome,
        (Role::Customer, false) => Destination::CustomerOnboarding,
        (Role::CityDriver, true) => Destination::CityDriverHome,
        (Role::CityDriver, false) => Destination::CityDriverOnboarding,
        (Role::IntercityDriver, true) => Destination::IntercityDriverHome,
        (Role::IntercityDriver, false) => Destination::IntercityDriverOnboarding,
        (Role::Logistics, true) => Destination::LogisticsHome,
        (Role::Logistics, false) => Destination::LogisticsOnboarding,
    }
}
