use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ops::view::StatusFilter;

/// Persisted TUI state (written to .state.json in the data directory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiState {
    #[serde(default)]
    pub filter: StatusFilter,
    /// Last search text, if any
    #[serde(default)]
    pub search: Option<String>,
    /// ID of the task under the cursor
    #[serde(default)]
    pub cursor_id: Option<String>,
}

pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(data_dir.join(".state.json")).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(data_dir.join(".state.json"), content)
}
