pub mod card;
pub mod envelope;
pub mod transition;

use eframe::egui::{self, Align2, FontId, Pos2, Rect};

use crate::theme::Theme;

const REF_WIDTH: f32 = 1280.0;
const REF_HEIGHT: f32 = 720.0;

pub const NAV_HINT: &str = "Use \u{2190} \u{2192} arrow keys to navigate";

pub fn compute_scale(rect: Rect) -> f32 {
    (rect.width() / REF_WIDTH)
        .min(rect.height() / REF_HEIGHT)
        .clamp(0.5, 2.5)
}

/// Small uppercase kicker above the main heading. Returns the height used.
pub fn draw_header(
    ui: &egui::Ui,
    theme: &Theme,
    kicker: &str,
    heading: &str,
    top_center: Pos2,
    opacity: f32,
    scale: f32,
) -> f32 {
    let painter = ui.painter();
    let kicker_rect = painter.text(
        top_center,
        Align2::CENTER_TOP,
        spaced_caps(kicker),
        FontId::proportional(theme.kicker_size * scale),
        Theme::with_opacity(theme.kicker, opacity),
    );
    let heading_top = Pos2::new(top_center.x, kicker_rect.bottom() + 4.0 * scale);
    let heading_rect = painter.text(
        heading_top,
        Align2::CENTER_TOP,
        heading,
        FontId::proportional(theme.heading_size * scale),
        Theme::with_opacity(theme.heading, opacity),
    );
    heading_rect.bottom() - top_center.y
}

/// Letter-spaced uppercase, the way the kicker is styled.
fn spaced_caps(text: &str) -> String {
    let upper = text.to_uppercase();
    let mut out = String::with_capacity(upper.len() * 2);
    for (i, c) in upper.chars().enumerate() {
        if i > 0 {
            out.push('\u{2009}');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chevron {
    Left,
    Right,
}

/// Round previous/next button. Returns true when clicked this frame.
pub fn nav_button(
    ui: &mut egui::Ui,
    theme: &Theme,
    center: Pos2,
    chevron: Chevron,
    opacity: f32,
    scale: f32,
) -> bool {
    let radius = 20.0 * scale;
    let rect = Rect::from_center_size(center, egui::vec2(radius * 2.0, radius * 2.0));
    let id = ui.id().with(("nav_button", chevron == Chevron::Left));
    let response = ui
        .interact(rect, id, egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand);

    let fill = if response.hovered() {
        Theme::with_opacity(theme.card_fill, opacity)
    } else {
        Theme::with_opacity(theme.button_fill, opacity)
    };
    let painter = ui.painter();
    painter.circle(
        center,
        radius,
        fill,
        egui::Stroke::new(1.0, Theme::with_opacity(theme.button_border, opacity)),
    );

    let color = Theme::with_opacity(theme.button_text, opacity);
    let arm = radius * 0.3;
    let (tip, back) = match chevron {
        Chevron::Left => (center.x - arm * 0.6, center.x + arm * 0.6),
        Chevron::Right => (center.x + arm * 0.6, center.x - arm * 0.6),
    };
    let stroke = egui::Stroke::new(2.0 * scale, color);
    painter.line_segment(
        [Pos2::new(back, center.y - arm), Pos2::new(tip, center.y)],
        stroke,
    );
    painter.line_segment(
        [Pos2::new(tip, center.y), Pos2::new(back, center.y + arm)],
        stroke,
    );

    response.clicked()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_reference_window() {
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(1280.0, 720.0));
        assert_eq!(compute_scale(rect), 1.0);
    }

    #[test]
    fn test_scale_uses_tighter_axis_and_clamps() {
        let wide = Rect::from_min_size(Pos2::ZERO, egui::vec2(2560.0, 720.0));
        assert_eq!(compute_scale(wide), 1.0);
        let tiny = Rect::from_min_size(Pos2::ZERO, egui::vec2(100.0, 100.0));
        assert_eq!(compute_scale(tiny), 0.5);
    }

    #[test]
    fn test_spaced_caps() {
        assert_eq!(spaced_caps("ab"), "A\u{2009}B");
        assert_eq!(spaced_caps(""), "");
    }
}
