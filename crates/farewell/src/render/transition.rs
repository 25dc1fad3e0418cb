use std::time::{Duration, Instant};

use crate::navigation::Direction;

/// Each half of a card change (exit, then enter).
pub const CARD_HALF_DURATION: Duration = Duration::from_millis(350);

/// Each half of the envelope-to-cards hand-over.
pub const STAGE_HALF_DURATION: Duration = Duration::from_millis(600);

/// Horizontal travel of a flipping card at scale 1.0.
pub const FLIP_TRAVEL: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Flip,
    Slide,
    Fade,
    None,
}

impl TransitionKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "slide" => Self::Slide,
            "fade" => Self::Fade,
            "none" => Self::None,
            _ => Self::Flip,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flip => "flip",
            Self::Slide => "slide",
            Self::Fade => "fade",
            Self::None => "none",
        }
    }

    pub fn cycled(&self) -> Self {
        match self {
            Self::Flip => Self::Slide,
            Self::Slide => Self::Fade,
            Self::Fade => Self::None,
            Self::None => Self::Flip,
        }
    }
}

pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn fraction(start: Instant, now: Instant, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (now.saturating_duration_since(start).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// How a card is placed relative to its resting spot.
///
/// `dx` is in units of the transition's travel distance, `width_scale` fakes the
/// rotation around the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPose {
    pub dx: f32,
    pub width_scale: f32,
    pub opacity: f32,
}

impl CardPose {
    pub const REST: CardPose = CardPose {
        dx: 0.0,
        width_scale: 1.0,
        opacity: 1.0,
    };
}

/// A running change from one card to the next.
#[derive(Debug, Clone, Copy)]
pub struct CardTransition {
    pub from: usize,
    pub to: usize,
    pub kind: TransitionKind,
    pub direction: Direction,
    start: Instant,
}

impl CardTransition {
    pub fn new(
        from: usize,
        to: usize,
        kind: TransitionKind,
        direction: Direction,
        now: Instant,
    ) -> Self {
        Self {
            from,
            to,
            kind,
            direction,
            start: now,
        }
    }

    fn duration(&self) -> Duration {
        match self.kind {
            TransitionKind::None => Duration::ZERO,
            // The slide moves both cards at once.
            TransitionKind::Slide => CARD_HALF_DURATION,
            TransitionKind::Flip | TransitionKind::Fade => CARD_HALF_DURATION * 2,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        fraction(self.start, now, self.duration())
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Forward moves cards towards negative x, backward mirrors it.
    fn sign(&self) -> f32 {
        match self.direction {
            Direction::Forward => 1.0,
            Direction::Backward | Direction::None => -1.0,
        }
    }

    /// Cards to paint this frame with their poses, back to front.
    pub fn frames(&self, now: Instant) -> Vec<(usize, CardPose)> {
        let p = self.progress(now);
        let sign = self.sign();
        match self.kind {
            TransitionKind::None => vec![(self.to, CardPose::REST)],
            TransitionKind::Slide => {
                let t = ease_in_out(p);
                vec![
                    (
                        self.from,
                        CardPose {
                            dx: -sign * t,
                            ..CardPose::REST
                        },
                    ),
                    (
                        self.to,
                        CardPose {
                            dx: sign * (1.0 - t),
                            ..CardPose::REST
                        },
                    ),
                ]
            }
            TransitionKind::Flip | TransitionKind::Fade => {
                // The outgoing card leaves fully before the incoming one appears.
                let flip = self.kind == TransitionKind::Flip;
                if p < 0.5 {
                    let t = ease_in_out(p * 2.0);
                    vec![(self.from, half_pose(flip, -sign * t, t))]
                } else {
                    let t = 1.0 - ease_in_out((p - 0.5) * 2.0);
                    vec![(self.to, half_pose(flip, sign * t, t))]
                }
            }
        }
    }
}

/// `away` is 0 at rest and 1 fully turned away.
fn half_pose(flip: bool, dx: f32, away: f32) -> CardPose {
    if flip {
        CardPose {
            dx,
            width_scale: (away * std::f32::consts::FRAC_PI_2).cos().max(0.0),
            opacity: 1.0 - away,
        }
    } else {
        CardPose {
            opacity: 1.0 - away,
            ..CardPose::REST
        }
    }
}

/// Envelope leaves, then the cards arrive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagePose {
    pub opacity: f32,
    pub scale: f32,
    pub dy: f32,
}

pub fn envelope_exit_pose(start: Instant, now: Instant) -> StagePose {
    let t = ease_in_out(fraction(start, now, STAGE_HALF_DURATION));
    StagePose {
        opacity: 1.0 - t,
        scale: 1.0 - 0.1 * t,
        dy: -40.0 * t,
    }
}

pub fn cards_enter_pose(start: Instant, now: Instant) -> StagePose {
    let t = ease_in_out(fraction(start, now, STAGE_HALF_DURATION));
    StagePose {
        opacity: t,
        scale: 1.02 - 0.02 * t,
        dy: 20.0 * (1.0 - t),
    }
}

pub fn stage_half_elapsed(start: Instant, now: Instant) -> bool {
    now.saturating_duration_since(start) >= STAGE_HALF_DURATION
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            TransitionKind::Flip,
            TransitionKind::Slide,
            TransitionKind::Fade,
            TransitionKind::None,
        ] {
            assert_eq!(TransitionKind::from_name(kind.name()), kind);
        }
        assert_eq!(TransitionKind::from_name("bogus"), TransitionKind::Flip);
    }

    #[test]
    fn test_cycle_visits_every_kind() {
        let mut kind = TransitionKind::Flip;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(kind);
            kind = kind.cycled();
        }
        assert_eq!(kind, TransitionKind::Flip);
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&TransitionKind::None));
    }

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flip_forward_exits_left_and_enters_from_right() {
        let t0 = Instant::now();
        let tr = CardTransition::new(0, 1, TransitionKind::Flip, Direction::Forward, t0);

        let early = tr.frames(at(t0, 200));
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].0, 0);
        assert!(early[0].1.dx < 0.0);

        let late = tr.frames(at(t0, 500));
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].0, 1);
        assert!(late[0].1.dx > 0.0);
        assert!(late[0].1.opacity > 0.0);
    }

    #[test]
    fn test_flip_backward_mirrors_forward() {
        let t0 = Instant::now();
        let fwd = CardTransition::new(1, 2, TransitionKind::Flip, Direction::Forward, t0);
        let back = CardTransition::new(2, 1, TransitionKind::Flip, Direction::Backward, t0);
        for ms in [100, 300, 450, 600] {
            let a = fwd.frames(at(t0, ms))[0].1;
            let b = back.frames(at(t0, ms))[0].1;
            assert!((a.dx + b.dx).abs() < 1e-6);
            assert!((a.opacity - b.opacity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_flip_settles_at_rest() {
        let t0 = Instant::now();
        let tr = CardTransition::new(3, 4, TransitionKind::Flip, Direction::Forward, t0);
        assert!(!tr.is_complete(at(t0, 699)));
        assert!(tr.is_complete(at(t0, 700)));
        let end = tr.frames(at(t0, 700));
        assert_eq!(end, vec![(4, CardPose::REST)]);
    }

    #[test]
    fn test_slide_draws_both_cards() {
        let t0 = Instant::now();
        let tr = CardTransition::new(0, 1, TransitionKind::Slide, Direction::Forward, t0);
        let mid = tr.frames(at(t0, 175));
        assert_eq!(mid.len(), 2);
        assert!(mid[0].1.dx < 0.0);
        assert!(mid[1].1.dx > 0.0);
        assert!(tr.is_complete(at(t0, 350)));
    }

    #[test]
    fn test_none_is_instant() {
        let t0 = Instant::now();
        let tr = CardTransition::new(0, 1, TransitionKind::None, Direction::Forward, t0);
        assert!(tr.is_complete(t0));
        assert_eq!(tr.frames(t0), vec![(1, CardPose::REST)]);
    }

    #[test]
    fn test_stage_poses() {
        let t0 = Instant::now();
        let start = envelope_exit_pose(t0, t0);
        assert_eq!(start.opacity, 1.0);
        let end = envelope_exit_pose(t0, at(t0, 600));
        assert_eq!(end.opacity, 0.0);
        assert!((end.dy + 40.0).abs() < 1e-4);

        let enter = cards_enter_pose(t0, at(t0, 600));
        assert_eq!(enter.opacity, 1.0);
        assert!((enter.scale - 1.0).abs() < 1e-6);
        assert!(stage_half_elapsed(t0, at(t0, 600)));
        assert!(!stage_half_elapsed(t0, at(t0, 599)));
    }
}
