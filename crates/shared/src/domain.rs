use serde::{Deserialize, Serialize};

/// Per-item processing state, owned and advanced server-side. The client
/// only ever observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Processed,
    Error,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Error => "error",
        }
    }
}

/// Batch operating mode. Informational for the client; it never gates
/// command availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    #[default]
    Batch,
    Single,
    #[serde(other)]
    Unknown,
}

impl BatchMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Single => "single",
            Self::Unknown => "unknown",
        }
    }
}

/// Catalog record resolved for a barcode by the backend's lookup step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_backend() -> String {
    "unknown".to_string()
}

fn default_quantity() -> u32 {
    1
}

/// One scanned entry awaiting commit. Every field except `barcode` is
/// defaulted so sparse snapshots from the feed still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub barcode: String,
    #[serde(default, rename = "upc_data")]
    pub catalog_match: Option<CatalogMatch>,
    #[serde(default = "default_backend", rename = "backend")]
    pub backend_label: String,
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl BatchItem {
    /// Resolved catalog title, falling back to the raw barcode.
    pub fn display_title(&self) -> &str {
        self.catalog_match
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.barcode)
    }

    /// Error text for rendering; an error-status item without a message
    /// still gets a non-empty region.
    pub fn error_text(&self) -> &str {
        self.error_message.as_deref().unwrap_or("Error")
    }
}

/// The externally-owned queue of scanned items. Insertion order is display
/// order; the client never mutates it locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub items: Vec<BatchItem>,
    #[serde(default)]
    pub mode: BatchMode,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_wire_item_fills_defaults() {
        let item: BatchItem = serde_json::from_str(r#"{"barcode":"012345"}"#).expect("item");
        assert_eq!(item.barcode, "012345");
        assert_eq!(item.backend_label, "unknown");
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.quantity, 1);
        assert!(!item.exists);
        assert!(item.error_message.is_none());
    }

    #[test]
    fn display_title_prefers_catalog_match() {
        let item: BatchItem = serde_json::from_str(
            r#"{"barcode":"012345","upc_data":{"title":"Oat Milk 1L"}}"#,
        )
        .expect("item");
        assert_eq!(item.display_title(), "Oat Milk 1L");
    }

    #[test]
    fn display_title_falls_back_to_barcode_for_empty_match() {
        let item: BatchItem =
            serde_json::from_str(r#"{"barcode":"012345","upc_data":{}}"#).expect("item");
        assert_eq!(item.display_title(), "012345");
    }

    #[test]
    fn error_text_defaults_when_message_missing() {
        let item: BatchItem =
            serde_json::from_str(r#"{"barcode":"9","status":"error"}"#).expect("item");
        assert_eq!(item.status, ItemStatus::Error);
        assert_eq!(item.error_text(), "Error");
    }

    #[test]
    fn unknown_mode_string_is_tolerated() {
        let batch: Batch =
            serde_json::from_str(r#"{"items":[],"mode":"turbo"}"#).expect("batch");
        assert_eq!(batch.mode, BatchMode::Unknown);
    }

    #[test]
    fn empty_object_is_an_empty_batch() {
        let batch: Batch = serde_json::from_str("{}").expect("batch");
        assert!(batch.is_empty());
        assert_eq!(batch.mode, BatchMode::Batch);
    }
}
