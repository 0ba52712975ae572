//! Integration tests for the dashboard: live data, recording and persistence.

use super::device_mock::{reading, MockDevice, Reply};
use gripdash::recording::{ExportError, Hand, TrainingMode};
use gripdash::sensors::{ConnectionStatus, ForceUnit, TransportMode};
use gripdash::storage::profiles::DEFAULT_PROFILE_NAME;
use gripdash::storage::{AppConfig, ProfileConfig};
use gripdash::{Dashboard, ProfileStore};
use std::time::Duration;
use tempfile::TempDir;

async fn run_for(dashboard: &mut Dashboard, duration: Duration) -> usize {
    let mut received = 0;
    let deadline = tokio::time::Instant::now() + duration;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
        received += dashboard.pump().len();
    }
    received
}

fn demo_config(dir: &TempDir) -> (AppConfig, ProfileStore) {
    let mut config = AppConfig::default();
    config.data_dir = dir.path().to_path_buf();
    (config, ProfileStore::new(dir.path()))
}

#[tokio::test(start_paused = true)]
async fn test_session_persisted_to_active_profile() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();

    dashboard.set_training_mode(TrainingMode::Endurance);
    dashboard.set_hand(Hand::Left);
    dashboard.set_mode(TransportMode::Demo).await.unwrap();

    dashboard.start_session().await.unwrap();
    assert!(dashboard.recorder().is_recording());
    let received = run_for(&mut dashboard, Duration::from_secs(2)).await;
    let summary = dashboard.stop_session().await.unwrap().unwrap();

    assert!(received > 5);
    assert_eq!(dashboard.connection().status(), ConnectionStatus::Connected);
    assert_eq!(summary.mode, TrainingMode::Endurance);
    assert_eq!(summary.hand, Hand::Left);
    assert_eq!(summary.units, ForceUnit::Kg);
    assert!(summary.max_force > 30.0);
    assert!(summary.avg_force <= summary.max_force);

    let stored = store.load().unwrap();
    assert_eq!(stored[0].name(), DEFAULT_PROFILE_NAME);
    assert_eq!(stored[0].sessions, vec![summary]);
}

/// Newer sessions go first.
#[tokio::test(start_paused = true)]
async fn test_sessions_prepended() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();
    dashboard.set_mode(TransportMode::Demo).await.unwrap();

    dashboard.start_session().await.unwrap();
    run_for(&mut dashboard, Duration::from_secs(1)).await;
    let first = dashboard.stop_session().await.unwrap().unwrap();

    dashboard.set_training_mode(TrainingMode::Max);
    dashboard.start_session().await.unwrap();
    run_for(&mut dashboard, Duration::from_secs(1)).await;
    let second = dashboard.stop_session().await.unwrap().unwrap();

    let sessions = &store.load().unwrap()[0].sessions;
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, second.id);
    assert_eq!(sessions[1].id, first.id);
    assert_eq!(sessions[0].mode, TrainingMode::Max);
}

/// Samples received before a disconnect still count toward the session.
#[tokio::test(start_paused = true)]
async fn test_stop_after_disconnect_keeps_samples() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();
    dashboard.set_mode(TransportMode::Demo).await.unwrap();

    dashboard.start_session().await.unwrap();
    // Let samples queue up without pumping.
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    dashboard.disconnect();

    let summary = dashboard.stop_session().await.unwrap().unwrap();
    assert!(summary.max_force > 30.0);
    assert_eq!(dashboard.connection().status(), ConnectionStatus::Disconnected);
    assert_eq!(store.load().unwrap()[0].sessions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_session_uses_profile_units() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();

    let mut lbf = ProfileConfig::new(DEFAULT_PROFILE_NAME);
    lbf.preferred_units = ForceUnit::Lbf;
    assert!(dashboard.update_profile(lbf).unwrap());

    dashboard.set_mode(TransportMode::Demo).await.unwrap();
    dashboard.start_session().await.unwrap();
    run_for(&mut dashboard, Duration::from_secs(2)).await;
    let summary = dashboard.stop_session().await.unwrap().unwrap();

    assert_eq!(summary.units, ForceUnit::Lbf);
    // Demo peaks at 40 kg.
    assert!(summary.max_force > 66.0 && summary.max_force <= 88.2);
}

#[tokio::test]
async fn test_empty_session_not_saved() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();

    dashboard.start_session().await.unwrap();
    assert!(dashboard.stop_session().await.unwrap().is_none());
    assert!(store.load().unwrap()[0].sessions.is_empty());
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store).unwrap();

    dashboard.start_session().await.unwrap();
    assert!(dashboard.start_session().await.is_err());
}

// =============================================================================
// Profiles
// =============================================================================

#[test]
fn test_profile_management_persists() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store.clone()).unwrap();

    assert!(dashboard.add_profile(ProfileConfig::new("Lena")).unwrap());
    assert!(!dashboard.add_profile(ProfileConfig::new("Lena")).unwrap());
    assert!(dashboard.select_profile("Lena").unwrap());
    assert!(!dashboard.select_profile("Nobody").unwrap());
    assert_eq!(dashboard.active_profile().unwrap().name(), "Lena");

    let reopened = Dashboard::new(&config, store).unwrap();
    assert_eq!(reopened.profiles().len(), 2);
    assert_eq!(reopened.active_profile().unwrap().name(), "Lena");
}

#[test]
fn test_stale_active_profile_falls_back() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    store.save_active("Deleted").unwrap();

    let dashboard = Dashboard::new(&config, store).unwrap();
    assert_eq!(
        dashboard.active_profile().unwrap().name(),
        DEFAULT_PROFILE_NAME
    );
}

#[tokio::test(start_paused = true)]
async fn test_export_active_profile() {
    let dir = TempDir::new().unwrap();
    let (config, store) = demo_config(&dir);
    let mut dashboard = Dashboard::new(&config, store).unwrap();

    assert!(matches!(dashboard.export_csv(), Err(ExportError::NoData)));

    dashboard.set_mode(TransportMode::Demo).await.unwrap();
    dashboard.start_session().await.unwrap();
    run_for(&mut dashboard, Duration::from_secs(1)).await;
    let summary = dashboard.stop_session().await.unwrap().unwrap();

    let csv = dashboard.export_csv().unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains(&summary.id.to_string()));
}

// =============================================================================
// Device notifications
// =============================================================================

#[tokio::test]
async fn test_polling_device_notified_of_session() {
    let device = MockDevice::start(vec![Reply::ok(&reading(9.5, 100))]).await;
    let dir = TempDir::new().unwrap();
    let (mut config, store) = demo_config(&dir);
    config.device.origin = device.origin.clone();
    config.device.poll_interval_ms = 20;
    config.transport.mode = TransportMode::Polling;

    let mut dashboard = Dashboard::new(&config, store).unwrap();
    dashboard.connect().await.unwrap();
    dashboard.start_session().await.unwrap();
    run_for(&mut dashboard, Duration::from_millis(500)).await;
    let summary = dashboard.stop_session().await.unwrap().unwrap();

    assert_eq!(summary.max_force, 9.5);
    let lines = device.request_lines();
    assert!(lines.iter().any(|l| l.starts_with("post /api/session/start")));
    assert!(lines.iter().any(|l| l.starts_with("post /api/session/stop")));
}
