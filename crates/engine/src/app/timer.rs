use std::time::Duration;

/// Countdown measured in simulated time.
///
/// A timer is inactive until [`Timer::activate`] is called and deactivates
/// itself once the accumulated elapsed time reaches its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    duration: Duration,
    elapsed: Duration,
    active: bool,
}

impl Timer {
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.elapsed = Duration::ZERO;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advances the timer. Returns `true` on the update that expires it.
    pub fn update(&mut self, dt: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.deactivate();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_timer_ignores_updates() {
        let mut timer = Timer::from_millis(100);
        assert!(!timer.update(Duration::from_millis(500)));
        assert!(!timer.is_active());
    }

    #[test]
    fn expires_exactly_when_elapsed_reaches_duration() {
        let mut timer = Timer::from_millis(500);
        timer.activate();
        assert!(!timer.update(Duration::from_millis(250)));
        assert!(!timer.update(Duration::from_millis(249)));
        assert!(timer.is_active());
        assert!(timer.update(Duration::from_millis(1)));
        assert!(!timer.is_active());
    }

    #[test]
    fn reactivation_restarts_elapsed_time() {
        let mut timer = Timer::from_millis(100);
        timer.activate();
        let _ = timer.update(Duration::from_millis(90));
        timer.activate();
        assert!(!timer.update(Duration::from_millis(90)));
        assert_eq!(timer.elapsed(), Duration::from_millis(90));
    }
}
