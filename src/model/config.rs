use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Light or dark color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse_mode(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Hex color overrides applied in light mode (e.g. `highlight = "#7C3AED"`)
    #[serde(default)]
    pub light: HashMap<String, String>,
    /// Hex color overrides applied in dark mode
    #[serde(default)]
    pub dark: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            theme: ThemeMode::Dark,
            show_key_hints: true,
            light: HashMap::new(),
            dark: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding todos.json. Overridden by `--data-dir` and `TICK_DATA_DIR`.
    #[serde(default)]
    pub data_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ui.theme, ThemeMode::Dark);
        assert!(config.ui.show_key_hints);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn parses_theme_and_overrides() {
        let config: Config = toml::from_str(
            r##"
[ui]
theme = "light"
show_key_hints = false

[ui.light]
highlight = "#7C3AED"

[storage]
data_dir = "/tmp/tick"
"##,
        )
        .unwrap();
        assert_eq!(config.ui.theme, ThemeMode::Light);
        assert!(!config.ui.show_key_hints);
        assert_eq!(config.ui.light.get("highlight").unwrap(), "#7C3AED");
        assert_eq!(config.storage.data_dir.as_deref(), Some("/tmp/tick"));
    }

    #[test]
    fn theme_toggle_round_trips() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Light.toggled().toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::parse_mode("dark"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse_mode("sepia"), None);
    }
}
