//! File system watcher for out-of-band changes to the data directory

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::storage::{ACTIVITIES_FILE, SETTINGS_FILE};

/// Debounce duration - wait this long after last event before sending update
const DEBOUNCE_MS: u64 = 100;

/// Whether an event touches one of the files clients render.
fn is_relevant(event: &Event) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches
        && event.paths.iter().any(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name == ACTIVITIES_FILE || name == SETTINGS_FILE)
        })
}

/// Watch the data directory and broadcast a reload after each burst of changes.
///
/// Commits made by the CLI while the server runs reach clients this way.
pub async fn watch_storage(
    data_dir: PathBuf,
    update_tx: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(&data_dir), RecursiveMode::NonRecursive)?;
    tracing::debug!(path = %data_dir.display(), "watching data directory");

    let mut pending_update = false;
    let mut last_event_time = Instant::now();

    loop {
        let timeout = if pending_update {
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event_time.elapsed())
        } else {
            Duration::from_secs(3600)
        };

        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(event) if is_relevant(&event) => {
                        pending_update = true;
                        last_event_time = Instant::now();
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            _ = tokio::time::sleep(timeout), if pending_update => {
                let _ = update_tx.send(super::reload_message());
                pending_update = false;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevant_files_only() {
        assert!(is_relevant(&event(
            EventKind::Modify(ModifyKind::Any),
            "/data/activities.jsonl"
        )));
        assert!(is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/data/settings.kdl"
        )));
        assert!(!is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "/data/.tmpA1b2C3"
        )));
        assert!(!is_relevant(&event(
            EventKind::Access(notify::event::AccessKind::Any),
            "/data/activities.jsonl"
        )));
    }
}
