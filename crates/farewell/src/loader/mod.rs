pub mod source;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::channel::oneshot;

pub use source::{MessageSource, SourceError, StaticSource};

/// A farewell message ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
    pub author: String,
}

/// One row as it came from the source. Missing or non-string fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub value: Option<String>,
    pub author: Option<String>,
}

impl RawRecord {
    pub fn new(value: Option<&str>, author: Option<&str>) -> Self {
        Self {
            value: value.map(str::to_owned),
            author: author.map(str::to_owned),
        }
    }

    pub fn from_row(row: &serde_json::Value) -> Self {
        let field = |name: &str| {
            row.get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        Self {
            value: field("value"),
            author: field("author"),
        }
    }

    fn into_message(self) -> Option<Message> {
        match (self.value, self.author) {
            (Some(message), Some(author)) if !message.is_empty() && !author.is_empty() => {
                Some(Message { message, author })
            }
            _ => None,
        }
    }
}

/// Drop rows lacking a body or an attribution and keep the rest in order.
pub fn records_to_messages(records: Vec<RawRecord>) -> Vec<Message> {
    let total = records.len();
    let messages: Vec<Message> = records
        .into_iter()
        .filter_map(RawRecord::into_message)
        .collect();
    if messages.len() < total {
        tracing::debug!(
            dropped = total - messages.len(),
            kept = messages.len(),
            "skipped incomplete message rows"
        );
    }
    messages
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(String),
    Ready(Vec<Message>),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Loaded messages; empty while loading or after a failure.
    pub fn messages(&self) -> &[Message] {
        match self {
            Self::Ready(messages) => messages,
            _ => &[],
        }
    }

    fn from_fetch(result: Result<Vec<RawRecord>, SourceError>) -> Self {
        match result {
            Ok(records) => Self::Ready(records_to_messages(records)),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

const LOADER_STOPPED: &str = "loader stopped before returning a result";

type FetchResult = Result<Vec<RawRecord>, SourceError>;

/// A single in-flight fetch, run on its own worker thread.
///
/// Dropping the loader raises its cancellation flag; a fetch that completes
/// afterwards is discarded without touching any state.
pub struct Loader {
    receiver: oneshot::Receiver<FetchResult>,
    cancelled: Arc<AtomicBool>,
    done: bool,
}

impl Loader {
    pub fn spawn(source: Arc<dyn MessageSource>) -> Self {
        let (sender, receiver) = oneshot::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let label = source.describe();

        tracing::info!(source = %label, "loading messages");
        let spawned = std::thread::Builder::new()
            .name("message-loader".to_string())
            .spawn(move || {
                let result = match tokio::runtime::Builder::new_current_thread().build() {
                    Ok(runtime) => runtime.block_on(source.fetch()),
                    Err(e) => Err(SourceError::Io(e)),
                };
                if flag.load(Ordering::Acquire) {
                    tracing::debug!(source = %label, "view gone, discarding fetch result");
                    return;
                }
                if sender.send(result).is_err() {
                    tracing::debug!(source = %label, "loader dropped before delivery");
                }
            });
        if let Err(e) = spawned {
            // The sender went down with the closure, so poll() reports the failure.
            tracing::error!("could not start loader thread: {e}");
        }

        Self {
            receiver,
            cancelled,
            done: false,
        }
    }

    /// Non-blocking check for the terminal state.
    pub fn poll(&mut self) -> Option<LoadState> {
        if self.done {
            return None;
        }
        let state = match self.receiver.try_recv() {
            Ok(Some(result)) => LoadState::from_fetch(result),
            Ok(None) => return None,
            Err(oneshot::Canceled) => LoadState::Failed(LOADER_STOPPED.to_string()),
        };
        self.done = true;
        log_outcome(&state);
        Some(state)
    }

    /// Block until the fetch finishes. Used outside the UI loop.
    pub fn wait(mut self) -> LoadState {
        let receiver = std::mem::replace(&mut self.receiver, oneshot::channel().1);
        let state = match futures::executor::block_on(receiver) {
            Ok(result) => LoadState::from_fetch(result),
            Err(oneshot::Canceled) => LoadState::Failed(LOADER_STOPPED.to_string()),
        };
        self.done = true;
        log_outcome(&state);
        state
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

fn log_outcome(state: &LoadState) {
    match state {
        LoadState::Ready(messages) => tracing::info!(count = messages.len(), "messages loaded"),
        LoadState::Failed(e) => tracing::warn!("failed to load messages: {e}"),
        LoadState::Loading => {}
    }
}
