pub mod app_config;
pub mod kv;
pub mod redis_repo;
pub mod session;

pub use kv::{FileKeyValueStore, MemoryKeyValueStore};
pub use redis_repo::RedisKeyValueStore;
pub use session::{Profile, ProfileUpdate, Session, SessionStore, AUTH_TOKEN_KEY, USER_PROFILE_KEY};
