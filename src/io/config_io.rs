use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{Config, ThemeMode};
use crate::model::workspace::Workspace;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("no data directory: set TICK_DATA_DIR or HOME")]
    NoDataDir,
}

/// `$XDG_CONFIG_HOME/tick/config.toml`, else `$HOME/.config/tick/config.toml`
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    config_dir.join("tick").join("config.toml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config, returning both the parsed config and the raw toml_edit
/// document for format-preserving edits. A missing file yields defaults and
/// an empty document.
pub fn read_config(path: &Path) -> Result<(Config, toml_edit::DocumentMut), ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let config: Config = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, creating parent directories.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let write_err = |e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, doc.to_string()).map_err(write_err)
}

/// Set `ui.theme` in the config document
pub fn set_theme(doc: &mut toml_edit::DocumentMut, mode: ThemeMode) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["theme"] = toml_edit::value(mode.as_str());
}

/// Persist a theme choice to the config file at `path`.
pub fn save_theme(path: &Path, mode: ThemeMode) -> Result<(), ConfigError> {
    let (_, mut doc) = read_config(path)?;
    set_theme(&mut doc, mode);
    write_config(path, &doc)
}

/// Pick the data directory: explicit override, then `TICK_DATA_DIR`, then
/// `storage.data_dir` from the config, then `$XDG_DATA_HOME/tick`, then
/// `$HOME/.local/share/tick`.
pub fn resolve_data_dir(override_dir: Option<&str>, config: &Config) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var("TICK_DATA_DIR")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = &config.storage.data_dir {
        return Ok(expand_home(dir));
    }
    if let Ok(dir) = std::env::var("XDG_DATA_HOME")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir).join("tick"));
    }
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".local/share/tick")),
        _ => Err(ConfigError::NoDataDir),
    }
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(dir),
    }
}

/// Read the config and resolve where data lives.
pub fn open_workspace(data_dir_override: Option<&str>) -> Result<Workspace, ConfigError> {
    let config_path = config_path();
    let (config, _) = read_config(&config_path)?;
    let data_dir = resolve_data_dir(data_dir_override, &config)?;
    Ok(Workspace {
        data_dir,
        config_path,
        config,
    })
}
