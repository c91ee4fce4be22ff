//! Client-side generate cooldown.
//!
//! A single mutable field owned by the controller, not a free-floating
//! global: `try_acquire(now)` either arms the window or reports the wait
//! remaining. The window re-arms on every successful acquire (an attempt
//! that later fails still counts), and is never persisted.

use std::time::{Duration, Instant};

/// Minimum spacing between generate attempts.
pub const GENERATE_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// Attempt allowed; the window has been re-armed.
    Ready,
    /// Still inside the window; wait this long.
    Wait(Duration),
}

#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    last_attempt: Option<Instant>,
}

impl Cooldown {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_attempt: None,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> CooldownDecision {
        if let Some(last) = self.last_attempt {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.window {
                return CooldownDecision::Wait(self.window - elapsed);
            }
        }
        self.last_attempt = Some(now);
        CooldownDecision::Ready
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(GENERATE_COOLDOWN)
    }
}

/// Whole seconds to show the user, rounded up so "wait 0s" never appears.
#[must_use]
pub fn wait_seconds(wait: Duration) -> u64 {
    wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{Cooldown, CooldownDecision, wait_seconds};

    #[test]
    fn first_attempt_is_ready() {
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        assert_eq!(
            cooldown.try_acquire(Instant::now()),
            CooldownDecision::Ready
        );
    }

    #[test]
    fn second_attempt_inside_the_window_waits() {
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        let start = Instant::now();
        assert_eq!(cooldown.try_acquire(start), CooldownDecision::Ready);

        let decision = cooldown.try_acquire(start + Duration::from_secs(2));
        assert_eq!(decision, CooldownDecision::Wait(Duration::from_secs(3)));
    }

    #[test]
    fn attempt_after_the_window_proceeds() {
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        let start = Instant::now();
        cooldown.try_acquire(start);

        assert_eq!(
            cooldown.try_acquire(start + Duration::from_secs(5)),
            CooldownDecision::Ready
        );
    }

    #[test]
    fn rejected_attempt_does_not_rearm_the_window() {
        let mut cooldown = Cooldown::new(Duration::from_secs(5));
        let start = Instant::now();
        cooldown.try_acquire(start);

        // Rejected at t+4; the window still expires at t+5, not t+9.
        let _ = cooldown.try_acquire(start + Duration::from_secs(4));
        assert_eq!(
            cooldown.try_acquire(start + Duration::from_secs(5)),
            CooldownDecision::Ready
        );
    }

    #[test]
    fn wait_seconds_rounds_up() {
        assert_eq!(wait_seconds(Duration::from_millis(1)), 1);
        assert_eq!(wait_seconds(Duration::from_millis(2500)), 3);
        assert_eq!(wait_seconds(Duration::from_secs(3)), 3);
    }
}
