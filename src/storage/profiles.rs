//! Athlete profiles and their session history.
//!
//! The collection operations are plain transformations over a slice of
//! [`ProfileData`]; persisting is a separate, explicit [`ProfileStore::save`]
//! the caller runs after every mutation.

use crate::recording::types::SessionSummary;
use crate::sensors::types::ForceUnit;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version written into `profiles.json`.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the profile seeded into an empty store.
pub const DEFAULT_PROFILE_NAME: &str = "Athlete";

const PROFILES_FILE: &str = "profiles.json";
const ACTIVE_PROFILE_FILE: &str = "active_profile";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnduranceConfig {
    /// Hold threshold in the profile's preferred units
    pub target_force: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PyramidConfig {
    /// Target of each step, in order
    pub steps: Vec<f64>,
}

/// Per-athlete configuration. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    pub name: String,
    pub endurance: EnduranceConfig,
    pub pyramid: PyramidConfig,
    pub preferred_units: ForceUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub friends: Vec<String>,
}

impl ProfileConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endurance: EnduranceConfig { target_force: 20.0 },
            pyramid: PyramidConfig {
                steps: vec![10.0, 20.0, 30.0, 20.0, 10.0],
            },
            preferred_units: ForceUnit::Kg,
            password: None,
            friends: Vec::new(),
        }
    }
}

/// A profile with its sessions, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub profile: ProfileConfig,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

impl ProfileData {
    pub fn new(profile: ProfileConfig) -> Self {
        Self {
            profile,
            sessions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileFile {
    version: u32,
    profiles: Vec<ProfileData>,
}

/// The collection seeded when nothing usable is stored.
pub fn default_profiles() -> Vec<ProfileData> {
    vec![ProfileData::new(ProfileConfig::new(DEFAULT_PROFILE_NAME))]
}

pub fn find_profile<'a>(profiles: &'a [ProfileData], name: &str) -> Option<&'a ProfileData> {
    profiles.iter().find(|p| p.name() == name)
}

/// Resolve the active profile, falling back to the first entry when `name` is stale.
pub fn resolve_active<'a>(profiles: &'a [ProfileData], name: &str) -> Option<&'a ProfileData> {
    find_profile(profiles, name).or_else(|| profiles.first())
}

/// Append a new profile. Returns `false` if the name is taken.
pub fn add_profile(profiles: &mut Vec<ProfileData>, config: ProfileConfig) -> bool {
    if find_profile(profiles, &config.name).is_some() {
        return false;
    }
    profiles.push(ProfileData::new(config));
    true
}

/// Replace the config of the profile with the same name, keeping its sessions.
pub fn update_profile(profiles: &mut [ProfileData], config: ProfileConfig) -> bool {
    match profiles.iter_mut().find(|p| p.name() == config.name) {
        Some(entry) => {
            entry.profile = config;
            true
        }
        None => false,
    }
}

/// Prepend a session to the named profile's history.
pub fn add_session(profiles: &mut [ProfileData], name: &str, summary: SessionSummary) -> bool {
    match profiles.iter_mut().find(|p| p.name() == name) {
        Some(entry) => {
            entry.sessions.insert(0, summary);
            true
        }
        None => false,
    }
}

/// File-backed persistence for profiles and the active profile name.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILE)
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_PROFILE_FILE)
    }

    /// Load the stored profiles.
    ///
    /// A missing, empty or unreadable collection yields the default profile.
    pub fn load(&self) -> Result<Vec<ProfileData>, StoreError> {
        let path = self.profiles_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(default_profiles()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        match serde_json::from_str::<ProfileFile>(&content) {
            Ok(file) if !file.profiles.is_empty() => Ok(file.profiles),
            Ok(_) => Ok(default_profiles()),
            Err(e) => {
                tracing::warn!(
                    "Stored profiles at {} are unreadable ({}), resetting to default",
                    path.display(),
                    e
                );
                Ok(default_profiles())
            }
        }
    }

    /// Overwrite the stored collection.
    pub fn save(&self, profiles: &[ProfileData]) -> Result<(), StoreError> {
        let file = ProfileFile {
            version: SCHEMA_VERSION,
            profiles: profiles.to_vec(),
        };
        let content =
            serde_json::to_string_pretty(&file).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.write_atomic(&self.profiles_path(), &content)?;
        tracing::debug!("Saved {} profiles", profiles.len());
        Ok(())
    }

    /// Stored active profile name, if any.
    pub fn load_active(&self) -> Option<String> {
        let name = std::fs::read_to_string(self.active_path()).ok()?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    pub fn save_active(&self, name: &str) -> Result<(), StoreError> {
        self.write_atomic(&self.active_path(), name)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content).map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Profile persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
