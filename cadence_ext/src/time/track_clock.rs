#[cfg(test)]
use mock_instant::thread_local::Instant;
#[cfg(not(test))]
use std::time::Instant;

use std::time::Duration;

/// Local estimate of the playing track's position, advanced in real time
/// between the audio node's sparse position reports.
///
/// The clock runs from an anchor instant and a base position; pausing
/// freezes it, seeking rebases it, and a speed multiplier (timescale
/// filters) scales the advance rate.
pub struct TrackClock {
    base: Duration,
    anchor: Instant,
    paused: bool,
    speed: f64,
}

impl TrackClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Duration::ZERO,
            anchor: Instant::now(),
            paused: false,
            speed: 1.0,
        }
    }

    /// Rewinds to zero, unpaused, at the current speed.
    pub fn reset(&mut self) {
        self.base = Duration::ZERO;
        self.anchor = Instant::now();
        self.paused = false;
    }

    #[must_use]
    pub fn position(&self) -> Duration {
        if self.paused {
            return self.base;
        }
        let elapsed = Instant::now().saturating_duration_since(self.anchor);
        self.base + elapsed.mul_f64(self.speed)
    }

    #[must_use]
    pub const fn paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    fn rebase(&mut self) {
        self.base = self.position();
        self.anchor = Instant::now();
    }

    pub fn set_pause(&mut self, state: bool) {
        if state == self.paused {
            return;
        }
        self.rebase();
        self.paused = state;
    }

    pub fn set_speed(&mut self, multiplier: f64) {
        self.rebase();
        self.speed = multiplier;
    }

    pub fn seek_to(&mut self, position: Duration) {
        self.base = position;
        self.anchor = Instant::now();
    }
}

impl Default for TrackClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use mock_instant::thread_local::MockClock;
    use pretty_assertions::assert_eq;

    use super::TrackClock;

    #[test]
    fn advances_in_real_time() {
        let clock = TrackClock::new();
        MockClock::advance(Duration::from_secs(5));
        assert_eq!(clock.position(), Duration::from_secs(5));
    }

    #[test]
    fn pausing_freezes_position() {
        let mut clock = TrackClock::new();
        MockClock::advance(Duration::from_secs(3));
        clock.set_pause(true);
        MockClock::advance(Duration::from_secs(10));
        assert_eq!(clock.position(), Duration::from_secs(3));

        clock.set_pause(false);
        MockClock::advance(Duration::from_secs(2));
        assert_eq!(clock.position(), Duration::from_secs(5));
    }

    #[test]
    fn seeking_rebases() {
        let mut clock = TrackClock::new();
        MockClock::advance(Duration::from_secs(30));
        clock.seek_to(Duration::from_secs(90));
        MockClock::advance(Duration::from_secs(1));
        assert_eq!(clock.position(), Duration::from_secs(91));
    }

    #[test]
    fn speed_scales_the_advance_rate() {
        let mut clock = TrackClock::new();
        clock.set_speed(2.0);
        MockClock::advance(Duration::from_secs(4));
        assert_eq!(clock.position(), Duration::from_secs(8));
    }

    #[test]
    fn reset_keeps_speed() {
        let mut clock = TrackClock::new();
        clock.set_speed(1.5);
        MockClock::advance(Duration::from_secs(10));
        clock.reset();
        assert_eq!(clock.position(), Duration::ZERO);
        assert_eq!(clock.speed(), 1.5);
    }
}
