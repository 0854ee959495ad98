use crate::cli::commands::{RecoveryAction, RecoveryCmd, ThemeArgs};
use crate::cli::output::{ThemeJson, format_recovery_entry, parse_timestamp_arg};
use crate::io::{config_io, recovery};
use crate::model::config::ThemeMode;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Show the persisted theme, or set it (`light`, `dark`, `toggle`).
pub fn cmd_theme(args: ThemeArgs, json: bool) -> CliResult {
    let path = config_io::config_path();
    let (config, _) = config_io::read_config(&path)?;

    let mode = match args.mode.as_deref() {
        None => config.ui.theme,
        Some("toggle") => config.ui.theme.toggled(),
        Some(s) => ThemeMode::parse_mode(s)
            .ok_or_else(|| format!("unknown theme '{}' (expected: light, dark, toggle)", s))?,
    };
    if args.mode.is_some() && mode != config.ui.theme {
        config_io::save_theme(&path, mode)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ThemeJson { theme: mode })?);
    } else {
        println!("{}", mode.as_str());
    }
    Ok(())
}

pub fn cmd_recovery(args: RecoveryCmd, data_dir: Option<&str>, json: bool) -> CliResult {
    let workspace = config_io::open_workspace(data_dir)?;
    let dir = workspace.data_dir;

    match args.action {
        Some(RecoveryAction::Path) => {
            let path = std::path::absolute(recovery::recovery_log_path(&dir))?;
            println!("{}", path.display());
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = prune.before.as_deref().map(parse_timestamp_arg).transpose()?;
            let removed = recovery::prune_recovery(&dir, before, prune.all)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("pruned {} entries", removed);
            }
        }
        None => {
            let since = args.since.as_deref().map(parse_timestamp_arg).transpose()?;
            let entries = recovery::read_recovery_entries(&dir, Some(args.limit.unwrap_or(10)), since);
            if json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if entries.is_empty() {
                println!("recovery log is empty");
            } else {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    for line in format_recovery_entry(entry) {
                        println!("{}", line);
                    }
                }
            }
        }
    }
    Ok(())
}
