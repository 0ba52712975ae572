//! Dashboard controller.
//!
//! Glues the connection manager, the session recorder and the profile store
//! together the way a UI would: live samples feed the recorder while a session
//! runs, and every change to the profile collection is persisted immediately.

use crate::recording::exporter_csv::export_sessions_csv;
use crate::recording::{
    ExportError, Hand, RecorderConfig, RecorderError, SessionParams, SessionRecorder,
    SessionSummary, TrainingMode,
};
use crate::sensors::{
    Adapter, ConnectionManager, ForceSample, SensorError, Transport, TransportMode,
};
use crate::storage::profiles::{self, ProfileConfig, ProfileData, ProfileStore, StoreError};
use crate::storage::AppConfig;
use thiserror::Error;

/// Errors surfaced by dashboard actions.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sensor(#[from] SensorError),
}

pub struct Dashboard<T: Transport = Adapter> {
    connection: ConnectionManager<T>,
    recorder: SessionRecorder,
    store: ProfileStore,
    profiles: Vec<ProfileData>,
    active_profile: String,
    /// Profile the running session will be saved to
    recording_profile: Option<String>,
    training_mode: TrainingMode,
    hand: Hand,
}

impl Dashboard<Adapter> {
    /// Build a dashboard talking to the configured device.
    pub fn new(config: &AppConfig, store: ProfileStore) -> Result<Self, DashboardError> {
        let connection =
            ConnectionManager::new(config.transport_config(), config.transport.mode);
        Self::with_connection(connection, config.recorder_config(), store)
    }
}

impl<T: Transport> Dashboard<T> {
    /// Build a dashboard around an existing connection manager.
    pub fn with_connection(
        connection: ConnectionManager<T>,
        recorder_config: RecorderConfig,
        store: ProfileStore,
    ) -> Result<Self, DashboardError> {
        let profiles = store.load()?;
        let stored_active = store.load_active().unwrap_or_default();
        let active_profile = profiles::resolve_active(&profiles, &stored_active)
            .map(|p| p.name().to_string())
            .unwrap_or_default();

        tracing::info!(
            "Loaded {} profiles, active profile '{}'",
            profiles.len(),
            active_profile
        );

        Ok(Self {
            connection,
            recorder: SessionRecorder::new(recorder_config),
            store,
            profiles,
            active_profile,
            recording_profile: None,
            training_mode: TrainingMode::default(),
            hand: Hand::default(),
        })
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.connection
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    pub fn profiles(&self) -> &[ProfileData] {
        &self.profiles
    }

    pub fn active_profile(&self) -> Option<&ProfileData> {
        profiles::resolve_active(&self.profiles, &self.active_profile)
    }

    pub fn training_mode(&self) -> TrainingMode {
        self.training_mode
    }

    pub fn set_training_mode(&mut self, mode: TrainingMode) {
        self.training_mode = mode;
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn set_hand(&mut self, hand: Hand) {
        self.hand = hand;
    }

    pub async fn connect(&mut self) -> Result<(), SensorError> {
        self.connection.connect().await
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    pub async fn set_mode(&mut self, mode: TransportMode) -> Result<(), SensorError> {
        self.connection.set_mode(mode).await
    }

    /// Drain live samples, feeding the recorder while a session runs.
    pub fn pump(&mut self) -> Vec<ForceSample> {
        let samples = self.connection.pump();
        if self.recorder.is_recording() {
            for sample in &samples {
                // Only fails when idle, checked above.
                let _ = self.recorder.record_sample(*sample);
            }
        }
        samples
    }

    /// Start recording a session for the active profile.
    pub async fn start_session(&mut self) -> Result<(), DashboardError> {
        let profile = self
            .active_profile()
            .map(|p| p.profile.clone())
            .unwrap_or_else(|| ProfileConfig::new(profiles::DEFAULT_PROFILE_NAME));

        // Anything queued so far predates the session.
        self.pump();

        self.recorder.start(SessionParams {
            mode: self.training_mode,
            hand: self.hand,
            units: profile.preferred_units,
            target_force: profile.endurance.target_force,
        })?;
        self.recording_profile = Some(profile.name);

        self.connection.start_session().await;
        Ok(())
    }

    /// Stop the session and persist its summary.
    ///
    /// Works whether or not the device is still connected; samples already
    /// received are never dropped.
    pub async fn stop_session(&mut self) -> Result<Option<SessionSummary>, DashboardError> {
        self.pump();
        let summary = self.recorder.stop()?;
        let profile_name = self.recording_profile.take();

        if let (Some(summary), Some(name)) = (&summary, profile_name) {
            if profiles::add_session(&mut self.profiles, &name, summary.clone()) {
                self.store.save(&self.profiles)?;
            } else {
                tracing::warn!("Profile '{}' vanished, session not saved", name);
            }
        }

        self.connection.stop_session().await;
        Ok(summary)
    }

    /// Make `name` the active profile. Returns `false` if it doesn't exist.
    pub fn select_profile(&mut self, name: &str) -> Result<bool, DashboardError> {
        if profiles::find_profile(&self.profiles, name).is_none() {
            return Ok(false);
        }
        self.active_profile = name.to_string();
        self.store.save_active(name)?;
        Ok(true)
    }

    pub fn add_profile(&mut self, config: ProfileConfig) -> Result<bool, DashboardError> {
        let added = profiles::add_profile(&mut self.profiles, config);
        if added {
            self.store.save(&self.profiles)?;
        }
        Ok(added)
    }

    pub fn update_profile(&mut self, config: ProfileConfig) -> Result<bool, DashboardError> {
        let updated = profiles::update_profile(&mut self.profiles, config);
        if updated {
            self.store.save(&self.profiles)?;
        }
        Ok(updated)
    }

    /// CSV of the active profile's sessions.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        let sessions = self
            .active_profile()
            .map(|p| p.sessions.as_slice())
            .unwrap_or_default();
        export_sessions_csv(sessions)
    }
}
