use std::path::PathBuf;

use super::config::Config;

/// Where a tick session reads and writes its files
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory holding `todos.json`, `.state.json`, `.lock` and `.recovery.log`
    pub data_dir: PathBuf,
    /// Path to config.toml (may not exist)
    pub config_path: PathBuf,
    /// Parsed config.toml, or defaults
    pub config: Config,
}
