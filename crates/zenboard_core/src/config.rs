//! Store configuration.
//!
//! # Invariants
//! - `document_key` differs from both legacy keys.

/// Key holding the current widget document.
pub const DEFAULT_DOCUMENT_KEY: &str = "zen_widget_v2";
/// First-release key holding a bare task array.
pub const LEGACY_BOARD_KEY: &str = "zen_board_v1";
/// First-release key holding a bare note array.
pub const LEGACY_NOTES_KEY: &str = "zen_notes_v1";

/// Storage keys used by `StateStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub document_key: String,
    pub legacy_board_key: String,
    pub legacy_notes_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            legacy_board_key: LEGACY_BOARD_KEY.to_string(),
            legacy_notes_key: LEGACY_NOTES_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Uses a custom document key while keeping the legacy keys.
    pub fn with_document_key(document_key: impl Into<String>) -> Self {
        Self {
            document_key: document_key.into(),
            ..Self::default()
        }
    }
}
