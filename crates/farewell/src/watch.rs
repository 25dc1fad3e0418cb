use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::time::Duration;

use anyhow::Context;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

use crate::loader::{Message, StaticSource, records_to_messages};

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Re-reads a local message file whenever it changes on disk.
pub struct MessageWatcher {
    path: PathBuf,
    events: Receiver<DebounceEventResult>,
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl MessageWatcher {
    /// `on_change` runs on the watcher thread, typically to wake the UI.
    pub fn new(path: &Path, on_change: impl Fn() + Send + 'static) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        // Editors often replace the file, so watch the directory instead.
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, events) = channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            if tx.send(result).is_ok() {
                on_change();
            }
        })
        .context("Failed to start file watcher")?;
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::info!(path = %path.display(), "watching message file");
        Ok(Self {
            path,
            events,
            _debouncer: debouncer,
        })
    }

    /// Freshly parsed messages if the file changed since the last call.
    pub fn poll(&self) -> Option<Vec<Message>> {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(Ok(events)) => {
                    changed |= events.iter().any(|e| same_file(&e.path, &self.path));
                }
                Ok(Err(e)) => tracing::warn!("file watcher error: {e}"),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if !changed {
            return None;
        }
        self.reload()
    }

    fn reload(&self) -> Option<Vec<Message>> {
        match read_messages(&self.path) {
            Ok(messages) => {
                tracing::info!(count = messages.len(), "message file reloaded");
                Some(messages)
            }
            Err(e) => {
                tracing::warn!("keeping previous messages: {e:#}");
                None
            }
        }
    }
}

fn same_file(event_path: &Path, watched: &Path) -> bool {
    event_path == watched || event_path.file_name() == watched.file_name()
}

pub fn read_messages(path: &Path) -> anyhow::Result<Vec<Message>> {
    let source = StaticSource::from_path(path)?;
    Ok(records_to_messages(source.into_records()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_matches_by_name() {
        let watched = Path::new("/tmp/cards/messages.yaml");
        assert!(same_file(Path::new("/tmp/cards/messages.yaml"), watched));
        assert!(same_file(Path::new("/private/tmp/cards/messages.yaml"), watched));
        assert!(!same_file(Path::new("/tmp/cards/other.yaml"), watched));
    }

    #[test]
    fn test_read_messages_filters_rows() {
        let dir = std::env::temp_dir().join(format!("farewell-watch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("messages.yaml");
        std::fs::write(
            &path,
            "- value: Hi\n  author: A\n- value: Missing author\n- author: Missing body\n",
        )
        .unwrap();

        let messages = read_messages(&path).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "Hi");

        std::fs::remove_dir_all(&dir).ok();
    }
}
