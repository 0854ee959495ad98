use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum StoreEvent {
    /// One or more slot files changed on disk.
    Changed(Vec<PathBuf>),
}

/// Watches a data directory for slot files written by other processes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }

                let relevant: Vec<PathBuf> =
                    event.paths.into_iter().filter(|p| is_slot_file(p)).collect();
                if !relevant.is_empty() {
                    let _ = tx.send(StoreEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events without blocking.
    pub fn poll(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

/// `<slot>.json`, excluding dotfiles (`.state.json`) and temp files
fn is_slot_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.') && name.ends_with(".json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_file_filter() {
        assert!(is_slot_file(Path::new("/d/todos.json")));
        assert!(!is_slot_file(Path::new("/d/.state.json")));
        assert!(!is_slot_file(Path::new("/d/.tmpAbc123")));
        assert!(!is_slot_file(Path::new("/d/.recovery.log")));
        assert!(!is_slot_file(Path::new("/d/.lock")));
    }
}
