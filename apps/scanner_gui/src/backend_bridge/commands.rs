//! Backend commands queued from UI to backend worker.

use std::time::Duration;

pub enum BackendCommand {
    ScanBarcode { barcode: String },
    ProcessBatch,
    ClearBatch,
    FetchState,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScanBarcode { .. } => "scan_barcode",
            Self::ProcessBatch => "process_batch",
            Self::ClearBatch => "clear_batch",
            Self::FetchState => "fetch_state",
        }
    }

    /// Delay before the follow-up state refresh after the command succeeds,
    /// so the backend's own state propagation can complete first.
    pub fn refresh_delay(&self) -> Option<Duration> {
        match self {
            Self::ScanBarcode { .. } => Some(Duration::from_millis(500)),
            Self::ProcessBatch => Some(Duration::from_millis(1000)),
            Self::ClearBatch => Some(Duration::from_millis(500)),
            Self::FetchState => None,
        }
    }
}
