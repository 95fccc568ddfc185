use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Batch;

/// Remote command names exposed by the batch backend.
pub const SERVICE_SCAN_BARCODE: &str = "scan_barcode";
pub const SERVICE_PROCESS_BATCH: &str = "process_batch";
pub const SERVICE_CLEAR_BATCH: &str = "clear_batch";

pub const DEFAULT_QUANTITY: u32 = 1;

/// Pushed state object: one entry per registered integration, keyed by an
/// opaque entry id. The client reads the first available entry only.
pub type FeedState = BTreeMap<String, FeedEntry>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub data: Option<CoordinatorData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatorData {
    #[serde(default)]
    pub batch: Option<Batch>,
    /// Names of the external sources registered on the backend.
    #[serde(default)]
    pub backends: Vec<String>,
}

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// Body of a `scan_barcode` call. The GUI only fills `barcode`; the
/// backend schema also accepts a manual source override and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanBarcodeRequest {
    pub barcode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl ScanBarcodeRequest {
    pub fn new(barcode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            backend: None,
            quantity: DEFAULT_QUANTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_request_defaults_quantity_on_the_wire() {
        let req: ScanBarcodeRequest =
            serde_json::from_str(r#"{"barcode":"012345"}"#).expect("request");
        assert_eq!(req.quantity, DEFAULT_QUANTITY);
        assert!(req.backend.is_none());
    }

    #[test]
    fn scan_request_omits_absent_backend_override() {
        let json = serde_json::to_value(ScanBarcodeRequest::new("012345")).expect("json");
        assert!(json.get("backend").is_none());
        assert_eq!(json["barcode"], "012345");
    }

    #[test]
    fn feed_entry_without_data_deserializes() {
        let state: FeedState = serde_json::from_str(r#"{"entry_1":{}}"#).expect("state");
        assert!(state["entry_1"].data.is_none());
    }
}
