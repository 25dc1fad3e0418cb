use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::deck::SlideDeck;
use crate::envelope::{Envelope, EnvelopeEvent};
use crate::loader::{self, MessageSource};
use crate::navigation::{self, NavCommand};
use crate::render::{self, Chevron, card, envelope as envelope_render};
use crate::render::envelope::EnvelopeGeometry;
use crate::render::transition::{
    CardPose, CardTransition, FLIP_TRAVEL, StagePose, TransitionKind, cards_enter_pose,
    envelope_exit_pose, stage_half_elapsed,
};
use crate::theme::Theme;
use crate::watch::MessageWatcher;

/// How often to look at the loader while a fetch is in flight.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

const SLIDE_AREA_MAX_WIDTH: f32 = 768.0;
const SLIDE_AREA_HEIGHT: f32 = 320.0;
const BUTTON_GAP: f32 = 12.0;

pub struct RunOptions {
    pub fullscreen: bool,
    pub messages: Option<PathBuf>,
    pub watch: bool,
}

struct EnvelopeView {
    envelope: Envelope,
    hovered: bool,
    geometry: Option<EnvelopeGeometry>,
}

struct SlidesView {
    deck: SlideDeck,
    transition: Option<CardTransition>,
    /// Index of the card last shown (or being transitioned to).
    shown: Option<usize>,
    mounted_at: Instant,
    watcher: Option<MessageWatcher>,
}

/// Strictly forward: envelope, then the hand-over, then the cards.
enum Stage {
    Envelope(EnvelopeView),
    Leaving {
        geometry: Option<EnvelopeGeometry>,
        since: Instant,
    },
    Slides(SlidesView),
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

struct CardApp {
    stage: Stage,
    source: Arc<dyn MessageSource>,
    watch_path: Option<PathBuf>,
    theme: Theme,
    transition_kind: TransitionKind,
    kicker: String,
    heading: String,
    toast: Option<Toast>,
}

impl EnvelopeView {
    fn new(open_delay: Duration) -> Self {
        Self {
            envelope: Envelope::new(open_delay),
            hovered: false,
            geometry: None,
        }
    }

    fn show(&mut self, ui: &egui::Ui, ctx: &egui::Context, theme: &Theme, now: Instant, scale: f32) {
        let rect = ui.max_rect();
        let base = envelope_render::base_rect(rect.center(), rect, scale);
        let geometry = envelope_render::geometry(
            base,
            self.envelope.open_progress(now),
            self.hovered,
            self.envelope.is_open(),
            scale,
        );
        let stage = StagePose {
            opacity: 1.0,
            scale: 1.0,
            dy: 0.0,
        };
        let pocket = envelope_render::render(ui, theme, &geometry, stage, scale);
        self.geometry = Some(geometry);

        let response = ui.interact(pocket, ui.id().with("envelope"), egui::Sense::click());
        let response = if self.envelope.is_open() {
            response
        } else {
            response.on_hover_cursor(egui::CursorIcon::PointingHand)
        };
        self.hovered = response.hovered();
        if response.clicked() && self.envelope.click(now) {
            ctx.request_repaint();
        }

        // Keep animating the flap until the hand-over fires.
        if self.envelope.remaining(now).is_some() {
            ctx.request_repaint();
        }
    }
}

impl SlidesView {
    fn mount(
        source: Arc<dyn MessageSource>,
        watch_path: Option<&PathBuf>,
        ctx: &egui::Context,
        now: Instant,
    ) -> Self {
        let watcher = watch_path.and_then(|path| {
            let ctx = ctx.clone();
            match MessageWatcher::new(path, move || ctx.request_repaint()) {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::warn!("live reload disabled: {e:#}");
                    None
                }
            }
        });
        Self {
            deck: SlideDeck::mount(source),
            transition: None,
            shown: None,
            mounted_at: now,
            watcher,
        }
    }

    fn update(&mut self, ctx: &egui::Context, now: Instant, kind: TransitionKind) {
        if self.deck.poll() {
            ctx.request_repaint();
        }
        if self.deck.is_loading() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        if let Some(messages) = self.watcher.as_ref().and_then(MessageWatcher::poll) {
            if self.deck.replace_messages(messages) {
                self.transition = None;
                self.shown = self.deck.visible().map(|v| v.position.index);
            }
        }

        // Arrow keys are only bound while there is something to browse.
        if self.deck.total() > 0 {
            let commands = ctx.input_mut(navigation::consume_nav_keys);
            for command in commands {
                self.navigate(command, now, kind);
            }
        }

        if self.transition.is_some_and(|t| t.is_complete(now)) {
            self.transition = None;
        }
    }

    fn navigate(&mut self, command: NavCommand, now: Instant, kind: TransitionKind) {
        self.deck.apply(command);
        let Some(visible) = self.deck.visible() else {
            return;
        };
        let position = visible.position;
        if let Some(prev) = self.shown {
            if prev != position.index {
                self.transition = Some(CardTransition::new(
                    prev,
                    position.index,
                    kind,
                    position.direction,
                    now,
                ));
            }
        }
        self.shown = Some(position.index);
    }

    fn show(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        app: &ChromeText<'_>,
        now: Instant,
        scale: f32,
        kind: TransitionKind,
    ) {
        let enter = cards_enter_pose(self.mounted_at, now);
        if enter.opacity < 1.0 {
            ctx.request_repaint();
        }

        // Nothing to show: no header, no card, no tracker.
        let Some(visible) = self.deck.visible() else {
            return;
        };
        if self.shown.is_none() {
            self.shown = Some(visible.position.index);
        }
        let tracker = visible.tracker();

        let theme = app.theme;
        let opacity = enter.opacity;
        let scale = scale * enter.scale;
        let rect = ui.max_rect();

        let header_height = (theme.kicker_size + theme.heading_size + 12.0) * scale;
        let footer_height = (theme.small_size + theme.small_size + 12.0) * scale;
        let gap = 24.0 * scale;
        let slide_height = SLIDE_AREA_HEIGHT * scale;
        let block = header_height + gap + slide_height + gap + footer_height;
        let top = rect.center().y - block / 2.0 + enter.dy * scale;

        render::draw_header(
            ui,
            theme,
            app.kicker,
            app.heading,
            egui::pos2(rect.center().x, top),
            opacity,
            scale,
        );

        let button_span = (40.0 + BUTTON_GAP) * scale;
        let area_width = (SLIDE_AREA_MAX_WIDTH * scale).min(rect.width() - 32.0 * scale);
        let slide_top = top + header_height + gap;
        let slide_area = egui::Rect::from_center_size(
            egui::pos2(rect.center().x, slide_top + slide_height / 2.0),
            egui::vec2((area_width - button_span * 2.0).max(0.0), slide_height),
        );

        let travel = match kind {
            TransitionKind::Slide => slide_area.width(),
            _ => FLIP_TRAVEL * scale,
        };
        let messages = self.deck.load_state().messages();
        match self.transition {
            Some(t) => {
                for (index, pose) in t.frames(now) {
                    if let Some(message) = messages.get(index) {
                        card::render(ui, message, theme, slide_area, pose, travel, opacity, scale);
                    }
                }
                ctx.request_repaint();
            }
            None => {
                card::render(
                    ui,
                    visible.message,
                    theme,
                    slide_area,
                    CardPose::REST,
                    travel,
                    opacity,
                    scale,
                );
            }
        }

        let y = slide_area.center().y;
        let left = egui::pos2(slide_area.left() - button_span / 2.0 - BUTTON_GAP * scale / 2.0, y);
        let right = egui::pos2(slide_area.right() + button_span / 2.0 + BUTTON_GAP * scale / 2.0, y);
        let mut clicked = None;
        if render::nav_button(ui, theme, left, Chevron::Left, opacity, scale) {
            clicked = Some(NavCommand::Previous);
        }
        if render::nav_button(ui, theme, right, Chevron::Right, opacity, scale) {
            clicked = Some(NavCommand::Next);
        }

        let footer_top = slide_area.bottom() + gap;
        let tracker_height = card::draw_centered_label(
            ui,
            &tracker,
            egui::FontId::proportional(theme.small_size * scale),
            Theme::with_opacity(theme.text, opacity),
            egui::pos2(rect.center().x, footer_top),
        );
        card::draw_centered_label(
            ui,
            render::NAV_HINT,
            egui::FontId::proportional(theme.small_size * 0.8 * scale),
            Theme::with_opacity(theme.hint, opacity * 0.8),
            egui::pos2(rect.center().x, footer_top + tracker_height + 4.0 * scale),
        );

        if let Some(command) = clicked {
            self.navigate(command, now, kind);
            ctx.request_repaint();
        }
    }
}

/// Read-only bits the slides view needs from the app.
struct ChromeText<'a> {
    theme: &'a Theme,
    kicker: &'a str,
    heading: &'a str,
}

impl CardApp {
    fn new(config: &Config, source: Arc<dyn MessageSource>, watch_path: Option<PathBuf>) -> Self {
        Self {
            stage: Stage::Envelope(EnvelopeView::new(config.open_delay())),
            source,
            watch_path,
            theme: Theme::from_name(config.theme_name()),
            transition_kind: TransitionKind::from_name(config.transition_name()),
            kicker: config.kicker(),
            heading: config.heading(),
            toast: None,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn cycle_transition(&mut self) {
        self.transition_kind = self.transition_kind.cycled();
        self.toast = Some(Toast::new(format!(
            "Transition: {}",
            self.transition_kind.name()
        )));
    }

    /// Move the stage machine forward when its timers say so.
    fn advance_stage(&mut self, ctx: &egui::Context, now: Instant) {
        let next = match &mut self.stage {
            Stage::Envelope(view) => match view.envelope.poll(now) {
                Some(EnvelopeEvent::Opened) => {
                    tracing::debug!("envelope hand-over");
                    Some(Stage::Leaving {
                        geometry: view.geometry,
                        since: now,
                    })
                }
                None => None,
            },
            Stage::Leaving { since, .. } if stage_half_elapsed(*since, now) => {
                tracing::debug!("mounting slides");
                Some(Stage::Slides(SlidesView::mount(
                    Arc::clone(&self.source),
                    self.watch_path.as_ref(),
                    ctx,
                    now,
                )))
            }
            Stage::Leaving { .. } | Stage::Slides(_) => None,
        };
        if let Some(next) = next {
            self.stage = next;
            ctx.request_repaint();
        }
    }
}

impl eframe::App for CardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut toggle_theme = false;
        let mut cycle_transition = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            toggle_theme = i.key_pressed(egui::Key::D);
            cycle_transition = i.key_pressed(egui::Key::T);
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if toggle_theme {
            self.toggle_theme();
        }
        if cycle_transition {
            self.cycle_transition();
        }

        self.advance_stage(ctx, now);

        let kind = self.transition_kind;
        if let Stage::Slides(view) = &mut self.stage {
            view.update(ctx, now, kind);
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let bg = self.theme.background;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let scale = render::compute_scale(rect);

                match &mut self.stage {
                    Stage::Envelope(view) => view.show(ui, ctx, &self.theme, now, scale),
                    Stage::Leaving { geometry, since } => {
                        if let Some(geometry) = geometry {
                            let pose = envelope_exit_pose(*since, now);
                            envelope_render::render(ui, &self.theme, geometry, pose, scale);
                        }
                        ctx.request_repaint();
                    }
                    Stage::Slides(view) => {
                        let chrome = ChromeText {
                            theme: &self.theme,
                            kicker: &self.kicker,
                            heading: &self.heading,
                        };
                        view.show(ui, ctx, &chrome, now, scale, kind);
                    }
                }

                if let Some(ref toast) = self.toast {
                    draw_toast(ui, &self.theme, toast, rect, scale);
                    ctx.request_repaint();
                }
            });
    }
}

fn draw_toast(ui: &egui::Ui, theme: &Theme, toast: &Toast, rect: egui::Rect, scale: f32) {
    let opacity = toast.opacity();
    if opacity <= 0.0 {
        return;
    }
    let color = Theme::with_opacity(theme.text, opacity * 0.9);
    let bg = Theme::with_opacity(theme.card_fill, opacity * 0.9);
    let galley = ui.painter().layout_no_wrap(
        toast.message.clone(),
        egui::FontId::proportional(16.0 * scale),
        color,
    );
    let padding = 12.0 * scale;
    let toast_rect = egui::Rect::from_min_size(
        egui::pos2(
            rect.center().x - galley.rect.width() / 2.0 - padding,
            rect.bottom() - 64.0 * scale,
        ),
        egui::vec2(
            galley.rect.width() + padding * 2.0,
            galley.rect.height() + padding * 2.0,
        ),
    );
    ui.painter().rect_filled(toast_rect, 8.0 * scale, bg);
    ui.painter().galley(
        egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding),
        galley,
        color,
    );
}

pub fn run(options: RunOptions) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let source = loader::source::resolve(options.messages.as_deref(), &config)?;

    let watch_path = match (&options.messages, options.watch) {
        (Some(path), true) => Some(path.clone()),
        (None, true) => {
            tracing::warn!("--watch only applies with --messages; ignoring");
            None
        }
        _ => None,
    };

    let title = config.heading();
    let viewport = if options.fullscreen {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(CardApp::new(&config, source, watch_path)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
