use std::{
    thread,
    time::{Duration, Instant},
};

/// A source of frame signals
pub trait FrameClock {
    /// Wait for the next frame and return its timestamp in milliseconds
    ///
    /// Timestamps never decrease.
    fn next_frame(&mut self) -> f64;
}

/// Simulated time advancing one fixed frame per call, without waiting
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: f64,
    frame: f64,
}

impl FixedClock {
    /// **Panics** if `fps` is not positive
    pub fn new(fps: f64) -> Self {
        assert!(fps > 0.0, "FixedClock needs a positive frame rate");
        Self {
            now: 0.0,
            frame: 1000.0 / fps,
        }
    }
}

impl FrameClock for FixedClock {
    fn next_frame(&mut self) -> f64 {
        let now = self.now;
        self.now += self.frame;
        now
    }
}

/// Wall-clock frames paced to a target rate
#[derive(Debug, Clone)]
pub struct RealtimeClock {
    start: Instant,
    frame: Duration,
    deadline: Instant,
}

impl RealtimeClock {
    /// **Panics** if `fps` is not positive
    pub fn new(fps: f64) -> Self {
        assert!(fps > 0.0, "RealtimeClock needs a positive frame rate");
        let start = Instant::now();
        Self {
            start,
            frame: Duration::from_secs_f64(1.0 / fps),
            deadline: start,
        }
    }
}

impl FrameClock for RealtimeClock {
    fn next_frame(&mut self) -> f64 {
        let now = Instant::now();
        if let Some(wait) = self.deadline.checked_duration_since(now) {
            thread::sleep(wait);
            self.deadline += self.frame;
        } else {
            // Fell behind: skip the missed frames instead of bursting to catch up
            self.deadline = now + self.frame;
        }
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Turns frame timestamps into the `dt` handed to physics
///
/// The first tick and any non-positive or non-finite delta use the nominal frame time,
/// long stalls are capped at `max`.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last: Option<f64>,
    nominal: f32,
    max: f32,
}

impl FrameTimer {
    pub fn new(nominal: f32, max: f32) -> Self {
        Self {
            last: None,
            nominal,
            max,
        }
    }

    /// Seconds elapsed since the previous timestamp
    pub fn delta(&mut self, timestamp: f64) -> f32 {
        let raw = self.last.map(|last| ((timestamp - last) / 1000.0) as f32);
        self.last = Some(timestamp);
        match raw {
            Some(dt) if dt.is_finite() && dt > 0.0 => dt.min(self.max),
            _ => self.nominal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_steps() {
        let mut clock = FixedClock::new(50.0);
        assert_eq!(clock.next_frame(), 0.0);
        assert_eq!(clock.next_frame(), 20.0);
        assert_eq!(clock.next_frame(), 40.0);
    }

    #[test]
    fn realtime_clock_is_monotonic() {
        let mut clock = RealtimeClock::new(1000.0);
        let a = clock.next_frame();
        let b = clock.next_frame();
        assert!(b >= a, "Timestamps never decrease");
    }

    #[test]
    fn timer_defends_against_bad_deltas() {
        let mut timer = FrameTimer::new(1.0 / 60.0, 0.1);
        assert_eq!(timer.delta(1000.0), 1.0 / 60.0, "First tick is nominal");
        assert!((timer.delta(1020.0) - 0.02).abs() < 1e-6, "Regular delta");
        assert_eq!(timer.delta(1020.0), 1.0 / 60.0, "Zero delta is nominal");
        assert_eq!(timer.delta(1010.0), 1.0 / 60.0, "Negative delta is nominal");
        assert_eq!(timer.delta(6010.0), 0.1, "Stall capped");
        assert_eq!(timer.delta(f64::NAN), 1.0 / 60.0, "NaN is nominal");
    }
}
