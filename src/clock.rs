use std::time::{Duration, Instant};

/// Fixed-period tick source polled by the event loop.
///
/// Missed periods are not replayed: after a long gap (system sleep) the
/// ticker fires once and re-anchors on the current instant. A deadline past
/// what `Instant` can represent never comes due.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self { period, next: now.checked_add(period) }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }

        self.next = match next.checked_add(self.period) {
            Some(n) if n > now => Some(n),
            _ => now.checked_add(self.period),
        };
        true
    }

    /// How long the event loop may block before this ticker is due.
    pub fn until_due(&self, now: Instant) -> Duration {
        self.next.map_or(self.period, |next| next.saturating_duration_since(now))
    }
}
