use eframe::egui::{self, Align2, FontId, Pos2, Rect, Vec2};

use crate::loader::Message;
use crate::render::transition::CardPose;
use crate::theme::Theme;

const MAX_CARD_WIDTH: f32 = 576.0;
const PADDING_X: f32 = 40.0;
const PADDING_Y: f32 = 32.0;
const AUTHOR_GAP: f32 = 24.0;
const ROUNDING: f32 = 24.0;

/// Card width at rest: capped, but never wider than the area minus a margin.
pub fn rest_width(area: Rect, scale: f32) -> f32 {
    (MAX_CARD_WIDTH * scale).min(area.width() - 32.0 * scale).max(0.0)
}

/// Where the card sits this frame, given its full size and transition pose.
pub fn card_rect(area: Rect, size: Vec2, pose: CardPose, travel: f32) -> Rect {
    let center = Pos2::new(area.center().x + pose.dx * travel, area.center().y);
    let width = size.x * pose.width_scale.clamp(0.0, 1.0);
    Rect::from_center_size(center, egui::vec2(width, size.y))
}

fn attribution_text(author: &str) -> String {
    format!("\u{2014} {author}")
}

/// Paint one message card centered in `area`. Returns the card rect.
#[allow(clippy::too_many_arguments)]
pub fn render(
    ui: &egui::Ui,
    message: &Message,
    theme: &Theme,
    area: Rect,
    pose: CardPose,
    travel: f32,
    opacity: f32,
    scale: f32,
) -> Rect {
    let opacity = (opacity * pose.opacity).clamp(0.0, 1.0);
    let width = rest_width(area, scale);
    let text_width = (width - PADDING_X * 2.0 * scale).max(1.0);

    let text_color = Theme::with_opacity(theme.text, opacity);
    let body = ui.painter().layout(
        message.message.clone(),
        FontId::proportional(theme.body_size * scale),
        text_color,
        text_width,
    );

    let author_color = Theme::with_opacity(theme.attribution, opacity);
    let author = ui.painter().layout(
        attribution_text(&message.author),
        FontId::proportional(theme.attribution_size * scale),
        author_color,
        text_width,
    );

    let height = PADDING_Y * 2.0 * scale
        + body.rect.height()
        + AUTHOR_GAP * scale
        + author.rect.height();
    let rect = card_rect(area, egui::vec2(width, height), pose, travel);
    if rect.width() < 1.0 || opacity <= 0.0 {
        return rect;
    }

    let painter = ui.painter().with_clip_rect(rect.intersect(ui.clip_rect()));
    painter.rect(
        rect,
        ROUNDING * scale,
        Theme::with_opacity(theme.card_fill, opacity),
        egui::Stroke::new(1.0, Theme::with_opacity(theme.card_border, opacity)),
        egui::StrokeKind::Inside,
    );

    // Text keeps its natural width and is clipped as the card turns.
    let content_left = rect.center().x - text_width / 2.0;
    let top = rect.top() + PADDING_Y * scale;
    let body_x = content_left + (text_width - body.rect.width()) / 2.0;
    let body_height = body.rect.height();
    painter.galley(Pos2::new(body_x, top), body, text_color);

    let author_y = top + body_height + AUTHOR_GAP * scale;
    let author_x = content_left + text_width - author.rect.width();
    painter.galley(Pos2::new(author_x, author_y), author, author_color);

    rect
}

/// Centered single-line label, used for the tracker and hint.
pub fn draw_centered_label(
    ui: &egui::Ui,
    text: &str,
    font: FontId,
    color: egui::Color32,
    top_center: Pos2,
) -> f32 {
    let rect = ui
        .painter()
        .text(top_center, Align2::CENTER_TOP, text, font, color);
    rect.height()
}
