//! GripDash - grip-strength dynamometer dashboard
//!
//! Streams live force readings from a grip dynamometer over WebSocket, HTTP
//! polling or Bluetooth LE, records training sessions with summary statistics,
//! and keeps per-athlete session history on disk.

pub mod dashboard;
pub mod recording;
pub mod sensors;
pub mod storage;

// Re-export commonly used types
pub use dashboard::Dashboard;
pub use recording::recorder::SessionRecorder;
pub use sensors::manager::ConnectionManager;
pub use storage::profiles::ProfileStore;
