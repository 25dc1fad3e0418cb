use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Forward,
    Backward,
    #[default]
    None,
}

/// Index and the direction that led to it, always committed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub index: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
}

/// Cyclic cursor over `total` slides.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    position: Position,
    total: usize,
}

impl Navigator {
    pub fn new(total: usize) -> Self {
        Self {
            position: Position::default(),
            total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Current position, or `None` when there is nothing to show.
    pub fn current(&self) -> Option<Position> {
        (!self.is_empty()).then_some(self.position)
    }

    pub fn goto(&mut self, target: isize, direction: Direction) {
        if self.is_empty() {
            return;
        }
        let index = if target < 0 {
            self.total - 1
        } else if target as usize >= self.total {
            0
        } else {
            target as usize
        };
        self.position = Position { index, direction };
    }

    pub fn next(&mut self) {
        self.goto(self.position.index as isize + 1, Direction::Forward);
    }

    pub fn previous(&mut self) {
        self.goto(self.position.index as isize - 1, Direction::Backward);
    }

    pub fn apply(&mut self, command: NavCommand) {
        match command {
            NavCommand::Next => self.next(),
            NavCommand::Previous => self.previous(),
        }
    }

    /// Follow a change in the number of slides, snapping back to the first one
    /// if the current index fell off the end.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if total > 0 && self.position.index >= total {
            tracing::debug!(
                index = self.position.index,
                total,
                "slide index out of range, snapping to first"
            );
            self.position.index = 0;
        }
    }

    /// Back to the first slide with no direction, used when a fresh list arrives.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.position = Position::default();
    }
}

pub fn key_command(key: egui::Key) -> Option<NavCommand> {
    match key {
        egui::Key::ArrowRight => Some(NavCommand::Next),
        egui::Key::ArrowLeft => Some(NavCommand::Previous),
        _ => None,
    }
}

/// Take the arrow keys out of this frame's input so nothing else reacts to them.
/// Every press counts, including several of the same key in one frame.
pub fn consume_nav_keys(input: &mut egui::InputState) -> Vec<NavCommand> {
    let mut commands = Vec::new();
    for key in [egui::Key::ArrowLeft, egui::Key::ArrowRight] {
        let presses = input.count_and_consume_key(egui::Modifiers::NONE, key);
        if let Some(cmd) = key_command(key) {
            commands.extend(std::iter::repeat_n(cmd, presses));
        }
    }
    commands
}
