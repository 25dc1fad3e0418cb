use std::sync::Arc;

use crate::loader::{LoadState, Loader, Message, MessageSource};
use crate::navigation::{NavCommand, Navigator, Position};

/// Everything the slides view knows: the fetch, its outcome and the cursor.
pub struct SlideDeck {
    load: LoadState,
    loader: Option<Loader>,
    nav: Navigator,
}

/// What the view should draw for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visible<'a> {
    pub position: Position,
    pub message: &'a Message,
    pub total: usize,
}

impl<'a> Visible<'a> {
    pub fn tracker(&self) -> String {
        format!("{} / {}", self.position.index + 1, self.total)
    }
}

impl SlideDeck {
    /// Start the one fetch this deck will ever make.
    pub fn mount(source: Arc<dyn MessageSource>) -> Self {
        Self {
            load: LoadState::Loading,
            loader: Some(Loader::spawn(source)),
            nav: Navigator::default(),
        }
    }

    #[cfg(test)]
    pub fn with_state(load: LoadState) -> Self {
        let mut deck = Self {
            load: LoadState::Loading,
            loader: None,
            nav: Navigator::default(),
        };
        deck.settle(load);
        deck
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_loading()
    }

    pub fn total(&self) -> usize {
        self.nav.total()
    }

    /// Pick up the loader result if it arrived. Returns true on the frame it lands.
    pub fn poll(&mut self) -> bool {
        let Some(loader) = self.loader.as_mut() else {
            return false;
        };
        match loader.poll() {
            Some(state) => {
                self.loader = None;
                self.settle(state);
                true
            }
            None => false,
        }
    }

    fn settle(&mut self, state: LoadState) {
        if !self.load.is_loading() {
            return;
        }
        self.load = state;
        if let LoadState::Ready(messages) = &self.load {
            self.nav.reset(messages.len());
        } else {
            self.nav.set_total(0);
        }
    }

    /// Replace the message list in place, keeping the cursor when it still fits.
    /// Only a deck that already loaded successfully takes new messages; the
    /// initial load stays the single `Loading` to terminal transition.
    pub fn replace_messages(&mut self, messages: Vec<Message>) -> bool {
        if !matches!(self.load, LoadState::Ready(_)) {
            tracing::debug!("ignoring message reload before a successful load");
            return false;
        }
        let total = messages.len();
        self.load = LoadState::Ready(messages);
        self.nav.set_total(total);
        true
    }

    pub fn apply(&mut self, command: NavCommand) {
        self.nav.apply(command);
    }

    /// The slide to draw, or `None` when there is nothing to show: still
    /// loading, failed, or an empty list.
    pub fn visible(&self) -> Option<Visible<'_>> {
        let messages = self.load.messages();
        let position = self.nav.current()?;
        let message = messages.get(position.index)?;
        Some(Visible {
            position,
            message,
            total: messages.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{RawRecord, StaticSource};
    use crate::navigation::Direction;

    fn msg(text: &str, author: &str) -> Message {
        Message {
            message: text.to_string(),
            author: author.to_string(),
        }
    }

    fn wait_for(deck: &mut SlideDeck) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !deck.poll() {
            assert!(std::time::Instant::now() < deadline, "deck never loaded");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    #[test]
    fn test_nothing_visible_while_loading() {
        let deck = SlideDeck::with_state(LoadState::Loading);
        assert!(deck.is_loading());
        assert!(deck.visible().is_none());
    }

    #[test]
    fn test_nothing_visible_after_failure() {
        let mut deck = SlideDeck::with_state(LoadState::Failed("network down".into()));
        deck.apply(NavCommand::Next);
        assert!(deck.visible().is_none());
        assert_eq!(deck.load_state().error(), Some("network down"));
        assert!(!deck.is_loading());
    }

    #[test]
    fn test_nothing_visible_for_empty_list() {
        let mut deck = SlideDeck::with_state(LoadState::Ready(Vec::new()));
        deck.apply(NavCommand::Previous);
        assert!(deck.visible().is_none());
    }

    #[test]
    fn test_mount_loads_and_starts_at_first() {
        let source = StaticSource::new(
            "test",
            vec![
                RawRecord::new(Some("Hi"), Some("A")),
                RawRecord::new(Some("Bye"), Some("B")),
            ],
        );
        let mut deck = SlideDeck::mount(Arc::new(source));
        wait_for(&mut deck);

        let visible = deck.visible().unwrap();
        assert_eq!(visible.position.index, 0);
        assert_eq!(visible.message, &msg("Hi", "A"));
        assert_eq!(visible.tracker(), "1 / 2");
        assert!(!deck.poll());
    }

    #[test]
    fn test_mount_with_only_incomplete_rows_shows_nothing() {
        let source = StaticSource::new("test", vec![RawRecord::new(Some("Hi"), None)]);
        let mut deck = SlideDeck::mount(Arc::new(source));
        wait_for(&mut deck);
        assert_eq!(deck.load_state(), &LoadState::Ready(Vec::new()));
        assert!(deck.visible().is_none());
    }

    #[test]
    fn test_browsing_wraps() {
        let mut deck = SlideDeck::with_state(LoadState::Ready(vec![
            msg("one", "A"),
            msg("two", "B"),
            msg("three", "C"),
        ]));
        deck.apply(NavCommand::Previous);
        let visible = deck.visible().unwrap();
        assert_eq!(visible.message.message, "three");
        assert_eq!(visible.position.direction, Direction::Backward);
        assert_eq!(visible.tracker(), "3 / 3");

        deck.apply(NavCommand::Next);
        assert_eq!(deck.visible().unwrap().message.message, "one");
    }

    #[test]
    fn test_shrinking_list_snaps_cursor() {
        let mut deck = SlideDeck::with_state(LoadState::Ready(vec![
            msg("one", "A"),
            msg("two", "B"),
            msg("three", "C"),
        ]));
        deck.apply(NavCommand::Previous);
        assert!(deck.replace_messages(vec![msg("only", "Z")]));
        let visible = deck.visible().unwrap();
        assert_eq!(visible.position.index, 0);
        assert_eq!(visible.message.message, "only");
    }

    #[test]
    fn test_reload_ignored_until_loaded() {
        let mut failed = SlideDeck::with_state(LoadState::Failed("network down".into()));
        assert!(!failed.replace_messages(vec![msg("late", "X")]));
        assert_eq!(failed.load_state().error(), Some("network down"));
        assert!(failed.visible().is_none());

        let mut loading = SlideDeck::with_state(LoadState::Loading);
        assert!(!loading.replace_messages(vec![msg("early", "Y")]));
        assert!(loading.is_loading());

        loading.settle(LoadState::Ready(vec![msg("fetched", "Z")]));
        assert_eq!(loading.visible().unwrap().message.message, "fetched");
    }

    #[test]
    fn test_terminal_state_is_final() {
        let mut deck = SlideDeck::with_state(LoadState::Failed("boom".into()));
        deck.settle(LoadState::Ready(vec![msg("late", "X")]));
        assert!(deck.visible().is_none());
        assert_eq!(deck.load_state().error(), Some("boom"));
    }
}
