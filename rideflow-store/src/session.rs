//! Session state: identity, profile, role verification and the booking list.
//!
//! Only the auth token and the profile are durable. Everything else lives for the
//! process lifetime. Durable writes are best-effort: failures are logged and the
//! in-memory state stays authoritative.

use rideflow_core::{route, Destination, KeyValueStore, Role, RoleVerification, StorageError};
use rideflow_shared::{Booking, BookingError, Masked};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_PROFILE_KEY: &str = "user_profile";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl Profile {
    /// A profile is complete once it has a non-blank name
    pub fn is_complete(&self) -> bool {
        self.name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }

    fn merge(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(gender) = update.gender {
            self.gender = Some(gender);
        }
    }
}

/// Partial profile change. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
}

impl ProfileUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            gender: None,
        }
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub phone: Option<Masked<String>>,
    pub profile: Profile,
    pub auth_token: Option<Masked<String>>,
    pub role_verified: RoleVerification,
    /// Vehicle class picked in an open booking flow
    pub selected_vehicle_class: Option<String>,
    pub bookings: Vec<Booking>,
}

impl Session {
    pub fn is_profile_complete(&self) -> bool {
        self.profile.is_complete()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }
}

struct State {
    session: Session,
    /// Bumped by every mutation that has to reach durable storage
    revision: u64,
}

/// Single source of truth for the signed-in user. Share it as `Arc<SessionStore>`.
pub struct SessionStore {
    state: RwLock<State>,
    storage: Arc<dyn KeyValueStore>,
    // Last revision written per durable key; holding the lock makes this the single writer
    writer: Mutex<HashMap<&'static str, u64>>,
}

impl SessionStore {
    /// Empty session on top of `storage`, ignoring anything already stored
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_session(storage, Session::default())
    }

    /// Session rebuilt from durable storage.
    ///
    /// Any read failure or corrupt value means "no prior session": the user starts
    /// signed out with an empty profile.
    pub async fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match load_durable(storage.as_ref()).await {
            Ok((token, profile)) => {
                info!(
                    "Restored session (token: {}, profile complete: {})",
                    token.is_some(),
                    profile.is_complete()
                );
                Session {
                    auth_token: token.map(Masked::new),
                    profile,
                    ..Session::default()
                }
            }
            Err(e) => {
                warn!("Could not restore session, starting fresh: {}", e);
                Session::default()
            }
        };

        Self::with_session(storage, session)
    }

    fn with_session(storage: Arc<dyn KeyValueStore>, session: Session) -> Self {
        Self {
            state: RwLock::new(State {
                session,
                revision: 0,
            }),
            storage,
            writer: Mutex::new(HashMap::new()),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub async fn set_phone(&self, phone: Option<String>) {
        self.state.write().await.session.phone = phone.map(Masked::new);
    }

    /// Store or erase the auth token
    pub async fn set_token(&self, token: Option<String>) {
        let revision = {
            let mut state = self.state.write().await;
            state.session.auth_token = token.clone().map(Masked::new);
            state.revision += 1;
            state.revision
        };

        self.persist(AUTH_TOKEN_KEY, revision, token).await;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_authenticated()
    }

    /// Merge `update` into the profile and persist the merged result
    pub async fn set_profile(&self, update: ProfileUpdate) {
        let (revision, profile) = {
            let mut state = self.state.write().await;
            state.session.profile.merge(update);
            state.revision += 1;
            (state.revision, state.session.profile.clone())
        };

        match serde_json::to_string(&profile) {
            Ok(json) => self.persist(USER_PROFILE_KEY, revision, Some(json)).await,
            Err(e) => warn!("Profile not persisted, serialization failed: {}", e),
        }
    }

    pub async fn profile(&self) -> Profile {
        self.state.read().await.session.profile.clone()
    }

    pub async fn is_profile_complete(&self) -> bool {
        self.state.read().await.session.is_profile_complete()
    }

    /// Mark a role as onboarded. Repeating it is a no-op.
    pub async fn verify_role(&self, role: Role) {
        let changed = self.state.write().await.session.role_verified.verify(role);
        if changed {
            info!("Role {} verified", role);
        }
    }

    pub async fn role_verification(&self) -> RoleVerification {
        self.state.read().await.session.role_verified
    }

    /// Where a user picking `role` right now should land
    pub async fn destination_for(&self, role: Role) -> Destination {
        let flags = self.role_verification().await;
        route(role, &flags)
    }

    pub async fn select_vehicle_class(&self, class_id: Option<String>) {
        self.state.write().await.session.selected_vehicle_class = class_id;
    }

    pub async fn selected_vehicle_class(&self) -> Option<String> {
        self.state.read().await.session.selected_vehicle_class.clone()
    }

    pub async fn append_booking(&self, booking: Booking) {
        info!("Booking {} recorded ({} {})", booking.id, booking.vehicle_name, booking.price);
        self.state.write().await.session.bookings.push(booking);
    }

    /// All bookings in creation order
    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.read().await.session.bookings.clone()
    }

    pub async fn booking(&self, id: Uuid) -> Option<Booking> {
        self.state
            .read()
            .await
            .session
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub async fn complete_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.update_booking(id, Booking::complete).await
    }

    pub async fn cancel_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.update_booking(id, Booking::cancel).await
    }

    async fn update_booking(
        &self,
        id: Uuid,
        transition: fn(&mut Booking) -> Result<(), BookingError>,
    ) -> Result<Booking, BookingError> {
        let mut state = self.state.write().await;
        let booking = state
            .session
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BookingError::NotFound(id))?;

        transition(booking)?;
        info!("Booking {} is now {:?}", booking.id, booking.status);
        Ok(booking.clone())
    }

    /// Sign out. Always succeeds: in-memory state is cleared first, durable
    /// clearing is best-effort.
    pub async fn logout(&self) {
        let revision = {
            let mut state = self.state.write().await;
            let session = &mut state.session;
            session.phone = None;
            session.profile = Profile::default();
            session.auth_token = None;
            session.role_verified = RoleVerification::default();
            session.selected_vehicle_class = None;
            state.revision += 1;
            state.revision
        };

        self.persist(AUTH_TOKEN_KEY, revision, None).await;
        self.persist(USER_PROFILE_KEY, revision, None).await;
        info!("Logged out");
    }

    /// Write `value` (or remove the key) unless a newer revision already reached storage
    async fn persist(&self, key: &'static str, revision: u64, value: Option<String>) {
        let mut applied = self.writer.lock().await;
        if applied.get(key).is_some_and(|last| *last >= revision) {
            debug!("Skipping stale write of {} (revision {})", key, revision);
            return;
        }
        // Record before writing: a failed newer write still outranks older ones
        applied.insert(key, revision);

        let result = match value {
            Some(value) => self.storage.set(key, &value).await,
            None => self.storage.remove(key).await,
        };

        if let Err(e) = result {
            warn!("Durable write of {} failed, keeping in-memory state: {}", key, e);
        }
    }
}

async fn load_durable(
    storage: &dyn KeyValueStore,
) -> Result<(Option<String>, Profile), StorageError> {
    let token = storage
        .get(AUTH_TOKEN_KEY)
        .await?
        .filter(|token| !token.is_empty());

    let profile = match storage.get(USER_PROFILE_KEY).await? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: USER_PROFILE_KEY.to_string(),
            reason: e.to_string(),
        })?,
        None => Profile::default(),
    };

    Ok((token, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FileKeyValueStore, MemoryKeyValueStore};
    use async_trait::async_trait;
    use rideflow_shared::{BookingStatus, BookingType};

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::read(key, "disk unavailable"))
        }

        async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::write(key, "disk full"))
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::write(key, "disk full"))
        }
    }

    fn memory() -> Arc<MemoryKeyValueStore> {
        Arc::new(MemoryKeyValueStore::new())
    }

    fn ride(price: u32) -> Booking {
        Booking::new(
            BookingType::Ride,
            "Mini".to_string(),
            "Charminar".to_string(),
            Some("Hitech City".to_string()),
            price,
            Some(12.3),
        )
    }

    #[tokio::test]
    async fn test_token_persisted_and_erased() {
        let storage = memory();
        let store = SessionStore::new(storage.clone());

        store.set_token(Some("tok_123".to_string())).await;
        assert!(store.is_authenticated().await);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(), Some("tok_123"));

        store.set_token(None).await;
        assert!(!store.is_authenticated().await);
        assert_eq!(storage.get(AUTH_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profile_merge_keeps_unmentioned_fields() {
        let storage = memory();
        let store = SessionStore::new(storage.clone());

        store.set_profile(ProfileUpdate::name("Asha").gender("female")).await;
        store.set_profile(ProfileUpdate::name("Asha Rao")).await;

        let profile = store.profile().await;
        assert_eq!(profile.name.as_deref(), Some("Asha Rao"));
        assert_eq!(profile.gender.as_deref(), Some("female"));

        let stored: Profile =
            serde_json::from_str(&storage.get(USER_PROFILE_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(stored, profile);
    }

    #[tokio::test]
    async fn test_blank_name_is_incomplete() {
        let store = SessionStore::new(memory());
        assert!(!store.is_profile_complete().await);

        store.set_profile(ProfileUpdate::name("  ")).await;
        assert!(!store.is_profile_complete().await);

        store.set_profile(ProfileUpdate::name(" Ravi ")).await;
        assert!(store.is_profile_complete().await);
    }

    #[tokio::test]
    async fn test_verify_role_twice() {
        let store = SessionStore::new(memory());
        store.verify_role(Role::Customer).await;
        store.verify_role(Role::Customer).await;

        assert!(store.role_verification().await.is_verified(Role::Customer));
        assert_eq!(store.destination_for(Role::Customer).await, Destination::CustomerHome);
        assert_eq!(
            store.destination_for(Role::Logistics).await,
            Destination::LogisticsOnboarding
        );
    }

    #[tokio::test]
    async fn test_verification_does_not_survive_logout() {
        let store = SessionStore::new(memory());
        store.verify_role(Role::Customer).await;
        store.logout().await;

        assert_eq!(
            store.destination_for(Role::Customer).await,
            Destination::CustomerOnboarding
        );
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let storage = memory();
        let store = SessionStore::new(storage.clone());
        store.set_phone(Some("+919876543210".to_string())).await;
        store.set_token(Some("tok".to_string())).await;
        store.set_profile(ProfileUpdate::name("Asha")).await;
        store.select_vehicle_class(Some("sedan".to_string())).await;
        for role in Role::ALL {
            store.verify_role(role).await;
        }

        store.logout().await;

        let session = store.snapshot().await;
        assert!(session.phone.is_none());
        assert!(!session.is_authenticated());
        assert!(!session.is_profile_complete());
        assert_eq!(session.role_verified, RoleVerification::default());
        assert!(session.selected_vehicle_class.is_none());
        assert_eq!(storage.get(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(storage.get(USER_PROFILE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_broken_storage_is_not_fatal() {
        let store = SessionStore::new(Arc::new(BrokenStore));

        store.set_token(Some("tok".to_string())).await;
        store.set_profile(ProfileUpdate::name("Asha")).await;
        store.verify_role(Role::CityDriver).await;
        assert!(store.is_authenticated().await);
        assert!(store.is_profile_complete().await);

        store.logout().await;
        assert!(!store.is_authenticated().await);
        assert!(!store.is_profile_complete().await);
        assert!(!store.role_verification().await.any_verified());
    }

    #[tokio::test]
    async fn test_restore_token_and_profile_only() {
        let storage = memory();
        {
            let store = SessionStore::new(storage.clone());
            store.set_token(Some("tok".to_string())).await;
            store.set_profile(ProfileUpdate::name("Asha")).await;
            store.verify_role(Role::Customer).await;
            store.append_booking(ride(173)).await;
        }

        let restored = SessionStore::restore(storage).await;
        let session = restored.snapshot().await;
        assert!(session.is_authenticated());
        assert_eq!(session.profile.name.as_deref(), Some("Asha"));
        // Role flags and bookings are process-lifetime only
        assert!(!session.role_verified.any_verified());
        assert!(session.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_restore_from_broken_or_corrupt_storage() {
        let store = SessionStore::restore(Arc::new(BrokenStore)).await;
        assert!(!store.is_authenticated().await);

        let storage = memory();
        storage.set(AUTH_TOKEN_KEY, "tok").await.unwrap();
        storage.set(USER_PROFILE_KEY, "{broken").await.unwrap();
        let store = SessionStore::restore(storage).await;
        assert!(!store.is_authenticated().await);
        assert_eq!(store.profile().await, Profile::default());
    }

    #[tokio::test]
    async fn test_fresh_session_after_corrupt_file_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = SessionStore::restore(Arc::new(FileKeyValueStore::new(&path))).await;
        assert!(!store.is_authenticated().await);
        store.set_token(Some("fresh".to_string())).await;
        store.set_profile(ProfileUpdate::name("Asha")).await;
        drop(store);

        let restarted = SessionStore::restore(Arc::new(FileKeyValueStore::new(&path))).await;
        assert!(restarted.is_authenticated().await);
        assert_eq!(restarted.profile().await.name.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn test_stale_profile_write_cannot_undo_logout() {
        let storage = memory();
        let store = SessionStore::new(storage.clone());
        store.set_profile(ProfileUpdate::name("Asha")).await;
        store.logout().await;

        // A write captured before logout arriving late is dropped
        store
            .persist(USER_PROFILE_KEY, 1, Some(r#"{"name":"Asha"}"#.to_string()))
            .await;
        assert_eq!(storage.get(USER_PROFILE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_profile_and_logout() {
        let storage = memory();
        let store = Arc::new(SessionStore::new(storage.clone()));

        let a = store.clone();
        let b = store.clone();
        tokio::join!(
            async move { a.set_profile(ProfileUpdate::name("Asha")).await },
            async move { b.logout().await },
        );

        // Whatever the interleaving, disk agrees with memory
        let on_disk = storage.get(USER_PROFILE_KEY).await.unwrap();
        let in_memory = store.profile().await;
        match on_disk {
            Some(raw) => assert_eq!(serde_json::from_str::<Profile>(&raw).unwrap(), in_memory),
            None => assert_eq!(in_memory, Profile::default()),
        }
    }

    #[tokio::test]
    async fn test_booking_status_transitions() {
        let store = SessionStore::new(memory());
        let first = ride(173);
        let second = ride(90);
        let (first_id, second_id) = (first.id, second.id);
        store.append_booking(first).await;
        store.append_booking(second).await;

        let done = store.complete_booking(first_id).await.unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert!(store.cancel_booking(first_id).await.is_err());

        store.cancel_booking(second_id).await.unwrap();
        let ids: Vec<Uuid> = store.bookings().await.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first_id, second_id]);

        let missing = Uuid::new_v4();
        assert_eq!(
            store.complete_booking(missing).await.unwrap_err(),
            BookingError::NotFound(missing)
        );
    }
}
