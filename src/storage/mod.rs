//! Storage module for configuration and athlete profiles.

pub mod config;
pub mod profiles;

pub use config::{AppConfig, ConfigError};
pub use profiles::{
    add_profile, add_session, resolve_active, update_profile, EnduranceConfig, ProfileConfig,
    ProfileData, ProfileStore, PyramidConfig, StoreError,
};
