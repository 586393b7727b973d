use std::time::{Duration, Instant};

/// Measures the wall time between rendered frames.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lap(&mut self) -> Duration {
        self.lap_at(Instant::now())
    }

    /// Time since the previous lap. The first lap after [`FrameClock::reset`]
    /// only arms the clock and returns zero, so time spent suspended or behind
    /// an overlay is never fed to the simulation.
    pub fn lap_at(&mut self, now: Instant) -> Duration {
        let dt = self.last.map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        dt
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_first_lap_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.lap_at(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_laps_measure_between_frames() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.lap_at(start);
        assert_eq!(clock.lap_at(start + Duration::from_millis(16)), Duration::from_millis(16));
        assert_eq!(clock.lap_at(start + Duration::from_millis(50)), Duration::from_millis(34));
    }

    #[test]
    fn test_reset_drops_the_gap() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.lap_at(start);
        clock.reset();
        assert_eq!(clock.lap_at(start + Duration::from_secs(30)), Duration::ZERO);
        assert_eq!(clock.lap_at(start + Duration::from_millis(30_016)), Duration::from_millis(16));
    }

    #[test]
    fn test_time_going_backwards_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new();
        clock.lap_at(start);
        assert_eq!(clock.lap_at(start - Duration::from_millis(5)), Duration::ZERO);
    }
}
