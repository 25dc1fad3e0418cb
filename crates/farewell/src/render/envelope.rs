use eframe::egui::{self, Pos2, Rect, Shape, Stroke};

use crate::render::transition::{StagePose, ease_in_out};
use crate::theme::Theme;

const WIDTH: f32 = 520.0;
const HEIGHT: f32 = 320.0;
const ROUNDING: f32 = 24.0;
const FLAP_DEPTH: f32 = 0.75;
const FLAP_OPEN_ANGLE: f32 = 160.0;
const FLAP_OPEN_DROP: f32 = 18.0;
const HOVER_LIFT: f32 = 6.0;
const HOVER_FLAP_SQUASH: f32 = 0.9;
const OPEN_SCALE: f32 = 1.03;

/// Everything needed to paint the envelope for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeGeometry {
    pub pocket: Rect,
    pub flap_tip: Pos2,
    /// Whether the flap has turned past vertical and now points upward.
    pub flap_flipped: bool,
}

/// Size of the envelope on screen, scaled down to fit narrow windows.
pub fn base_rect(center: Pos2, available: Rect, scale: f32) -> Rect {
    let width = (WIDTH * scale).min(available.width() * 0.9);
    let height = width * HEIGHT / WIDTH;
    Rect::from_center_size(center, egui::vec2(width, height))
}

pub fn geometry(base: Rect, open_progress: f32, hovered: bool, is_open: bool, scale: f32) -> EnvelopeGeometry {
    let t = ease_in_out(open_progress.clamp(0.0, 1.0));
    let grow = 1.0 + (OPEN_SCALE - 1.0) * t;
    let mut pocket = Rect::from_center_size(base.center(), base.size() * grow);
    if hovered && !is_open {
        pocket = pocket.translate(egui::vec2(0.0, -HOVER_LIFT * scale));
    }

    let depth = pocket.height() * FLAP_DEPTH;
    let flap_tip_y = if is_open {
        let angle = (FLAP_OPEN_ANGLE * t).to_radians();
        pocket.top() + FLAP_OPEN_DROP * scale * t + depth * angle.cos()
    } else if hovered {
        pocket.top() + depth * HOVER_FLAP_SQUASH
    } else {
        pocket.top() + depth
    };

    EnvelopeGeometry {
        pocket,
        flap_tip: Pos2::new(pocket.center().x, flap_tip_y),
        flap_flipped: flap_tip_y < pocket.top(),
    }
}

/// Paint the envelope and return the clickable rect.
pub fn render(ui: &egui::Ui, theme: &Theme, geo: &EnvelopeGeometry, stage: StagePose, scale: f32) -> Rect {
    let opacity = stage.opacity;
    let pocket = Rect::from_center_size(
        geo.pocket.center() + egui::vec2(0.0, stage.dy * scale),
        geo.pocket.size() * stage.scale,
    );
    let flap_tip = Pos2::new(
        pocket.center().x,
        pocket.top() + (geo.flap_tip.y - geo.pocket.top()) * stage.scale,
    );
    let painter = ui.painter();
    let border = Stroke::new(1.0, Theme::with_opacity(theme.envelope_border, opacity));

    // Soft shadow under the envelope
    let shadow = Rect::from_min_max(
        Pos2::new(pocket.left() + 40.0 * scale, pocket.bottom() + 10.0 * scale),
        Pos2::new(pocket.right() - 40.0 * scale, pocket.bottom() + 34.0 * scale),
    );
    painter.rect_filled(
        shadow,
        shadow.height() / 2.0,
        Theme::with_opacity(theme.shadow, opacity),
    );

    // Flap turned up sits behind the pocket
    if geo.flap_flipped {
        draw_flap(painter, theme, pocket, flap_tip, border, opacity);
    }

    painter.rect(
        pocket,
        ROUNDING * scale,
        Theme::with_opacity(theme.envelope_pocket, opacity),
        border,
        egui::StrokeKind::Inside,
    );

    let side = Theme::with_opacity(theme.envelope_side, opacity);
    let inset = ROUNDING * scale * 0.3;
    let left = vec![
        pocket.left_top() + egui::vec2(inset, inset),
        Pos2::new(pocket.center().x, pocket.top() + inset),
        pocket.left_bottom() + egui::vec2(inset, -inset),
    ];
    let right = vec![
        Pos2::new(pocket.center().x, pocket.top() + inset),
        pocket.right_top() + egui::vec2(-inset, inset),
        pocket.right_bottom() + egui::vec2(-inset, -inset),
    ];
    painter.add(Shape::convex_polygon(left, side, border));
    painter.add(Shape::convex_polygon(right, side, border));

    if !geo.flap_flipped {
        draw_flap(painter, theme, pocket, flap_tip, border, opacity);
    }

    pocket
}

fn draw_flap(
    painter: &egui::Painter,
    theme: &Theme,
    pocket: Rect,
    tip: Pos2,
    border: Stroke,
    opacity: f32,
) {
    let fill = Theme::with_opacity(theme.envelope_flap, opacity);
    let mut points = vec![pocket.left_top(), tip, pocket.right_top()];
    // Keep the winding consistent so the polygon stays convex once flipped.
    if tip.y < pocket.top() {
        points.reverse();
    }
    painter.add(Shape::convex_polygon(points, fill, border));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Rect {
        Rect::from_center_size(Pos2::new(640.0, 360.0), egui::vec2(WIDTH, HEIGHT))
    }

    #[test]
    fn test_base_rect_keeps_aspect() {
        let available = Rect::from_min_size(Pos2::ZERO, egui::vec2(300.0, 800.0));
        let rect = base_rect(available.center(), available, 1.0);
        assert_eq!(rect.width(), 270.0);
        assert!((rect.height() - 270.0 * HEIGHT / WIDTH).abs() < 1e-3);
    }

    #[test]
    fn test_closed_flap_points_down() {
        let geo = geometry(base(), 0.0, false, false, 1.0);
        assert_eq!(geo.pocket, base());
        assert_eq!(geo.flap_tip.y, base().top() + HEIGHT * FLAP_DEPTH);
        assert!(!geo.flap_flipped);
    }

    #[test]
    fn test_hover_lifts_and_squashes() {
        let geo = geometry(base(), 0.0, true, false, 1.0);
        assert_eq!(geo.pocket.top(), base().top() - HOVER_LIFT);
        let depth = geo.flap_tip.y - geo.pocket.top();
        assert!((depth - HEIGHT * FLAP_DEPTH * HOVER_FLAP_SQUASH).abs() < 1e-3);
    }

    #[test]
    fn test_open_flap_flips_up_and_grows() {
        let geo = geometry(base(), 1.0, true, true, 1.0);
        assert!(geo.flap_flipped);
        assert!(geo.flap_tip.y < geo.pocket.top());
        assert!(geo.pocket.width() > WIDTH);
        // Hover no longer lifts once opened.
        assert_eq!(geo.pocket.center(), base().center());
    }

    #[test]
    fn test_flap_passes_vertical_midway() {
        let before = geometry(base(), 0.3, false, true, 1.0);
        let after = geometry(base(), 0.8, false, true, 1.0);
        assert!(!before.flap_flipped);
        assert!(after.flap_flipped);
    }
}
