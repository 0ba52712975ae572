//! Unit test modules.

mod csv_export_test;
mod session_recorder_test;
