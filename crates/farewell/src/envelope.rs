use std::time::{Duration, Instant};

/// How long the flap animation runs before the envelope hands over to the cards.
pub const DEFAULT_OPEN_DELAY: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeEvent {
    Opened,
}

/// One-shot timer armed at a known instant.
///
/// The signal fires on the first poll at or after the deadline and never again.
/// It lives inside whatever view armed it, so dropping the view disarms it.
#[derive(Debug)]
pub struct DeferredSignal {
    armed_at: Instant,
    deadline: Instant,
    state: SignalState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Pending,
    Fired,
    Cancelled,
}

impl DeferredSignal {
    pub fn arm(now: Instant, delay: Duration) -> Self {
        Self {
            armed_at: now,
            deadline: now + delay,
            state: SignalState::Pending,
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state == SignalState::Pending && now >= self.deadline {
            self.state = SignalState::Fired;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        if self.state == SignalState::Pending {
            self.state = SignalState::Cancelled;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == SignalState::Pending
    }

    /// Time left until the deadline, `None` once fired or cancelled.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.is_pending()
            .then(|| self.deadline.saturating_duration_since(now))
    }

    /// Fraction of the delay that has elapsed, clamped to `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.deadline.saturating_duration_since(self.armed_at);
        if total.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.armed_at);
        (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Closed/open envelope that reports `Opened` once its opening animation is over.
#[derive(Debug)]
pub struct Envelope {
    state: EnvelopeState,
    open_delay: Duration,
    signal: Option<DeferredSignal>,
}

impl Envelope {
    pub fn new(open_delay: Duration) -> Self {
        Self {
            state: EnvelopeState::Closed,
            open_delay,
            signal: None,
        }
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state() == EnvelopeState::Open
    }

    /// Pointer activation. Only the first one counts.
    pub fn click(&mut self, now: Instant) -> bool {
        if self.is_open() {
            tracing::trace!("envelope already open, ignoring click");
            return false;
        }
        self.state = EnvelopeState::Open;
        self.signal = Some(DeferredSignal::arm(now, self.open_delay));
        tracing::debug!(delay_ms = self.open_delay.as_millis() as u64, "envelope opened");
        true
    }

    pub fn poll(&mut self, now: Instant) -> Option<EnvelopeEvent> {
        let signal = self.signal.as_mut()?;
        signal.poll(now).then_some(EnvelopeEvent::Opened)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.signal.as_ref().and_then(|s| s.remaining(now))
    }

    /// Animation progress of the flap: 0 while closed, 1 when fully open.
    pub fn open_progress(&self, now: Instant) -> f32 {
        match &self.signal {
            Some(signal) => signal.progress(now),
            None => 0.0,
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_DELAY)
    }
}

impl Drop for Envelope {
    fn drop(&mut self) {
        if self.signal.as_ref().is_some_and(DeferredSignal::is_pending) {
            tracing::debug!("envelope dropped before its open signal fired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_opens_once() {
        let t0 = Instant::now();
        let mut env = Envelope::default();
        assert_eq!(env.state(), EnvelopeState::Closed);

        assert!(env.click(t0));
        assert!(env.is_open());
        assert!(!env.click(t0 + Duration::from_millis(10)));
        assert!(env.is_open());
    }

    #[test]
    fn test_signal_fires_exactly_once_after_delay() {
        let t0 = Instant::now();
        let mut env = Envelope::default();
        env.click(t0);

        assert_eq!(env.poll(t0), None);
        assert_eq!(env.poll(t0 + Duration::from_millis(899)), None);
        assert_eq!(
            env.poll(t0 + Duration::from_millis(900)),
            Some(EnvelopeEvent::Opened)
        );
        assert_eq!(env.poll(t0 + Duration::from_millis(901)), None);
        assert_eq!(env.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_second_click_does_not_rearm_timer() {
        let t0 = Instant::now();
        let mut env = Envelope::default();
        env.click(t0);
        env.click(t0 + Duration::from_millis(500));
        assert_eq!(
            env.poll(t0 + Duration::from_millis(900)),
            Some(EnvelopeEvent::Opened)
        );
    }

    #[test]
    fn test_no_signal_without_click() {
        let t0 = Instant::now();
        let mut env = Envelope::default();
        assert_eq!(env.poll(t0 + Duration::from_secs(5)), None);
        assert_eq!(env.remaining(t0), None);
        assert_eq!(env.open_progress(t0), 0.0);
    }

    #[test]
    fn test_remaining_and_progress() {
        let t0 = Instant::now();
        let mut env = Envelope::new(Duration::from_millis(1000));
        env.click(t0);
        let at = t0 + Duration::from_millis(250);
        assert_eq!(env.remaining(at), Some(Duration::from_millis(750)));
        assert!((env.open_progress(at) - 0.25).abs() < 1e-3);

        env.poll(t0 + Duration::from_millis(1000));
        assert_eq!(env.remaining(t0 + Duration::from_millis(1000)), None);
        assert_eq!(env.open_progress(t0 + Duration::from_secs(3)), 1.0);
    }

    #[test]
    fn test_cancelled_signal_never_fires() {
        let t0 = Instant::now();
        let mut signal = DeferredSignal::arm(t0, Duration::from_millis(900));
        signal.cancel();
        assert!(!signal.poll(t0 + Duration::from_secs(1)));
        assert_eq!(signal.remaining(t0), None);
    }

    #[test]
    fn test_signal_lives_and_dies_with_envelope() {
        let t0 = Instant::now();
        let mut env = Envelope::default();
        env.click(t0);
        assert!(env.remaining(t0).is_some());
        drop(env);

        let mut reopened = Envelope::default();
        assert_eq!(reopened.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let t0 = Instant::now();
        let mut env = Envelope::new(Duration::ZERO);
        env.click(t0);
        assert_eq!(env.open_progress(t0), 1.0);
        assert_eq!(env.poll(t0), Some(EnvelopeEvent::Opened));
    }
}
