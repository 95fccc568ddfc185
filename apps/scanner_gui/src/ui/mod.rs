//! UI layer for the scanner GUI: app shell and painting.

pub mod app;

pub use app::{DialogConfirm, ScannerGuiApp};
