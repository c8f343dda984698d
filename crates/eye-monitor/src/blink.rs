//! Blink counting with a consecutive-frame hysteresis

use ring_buffer::TimeWindow;
use tracing::debug;

use crate::config::EyeMonitorConfig;

/// Counts blinks on the reopening edge of a long enough closure
#[derive(Debug, Clone)]
pub struct BlinkCounter {
    ear_threshold: f64,
    min_frames: u32,
    closed_frames: u32,
    total: u64,
    window: TimeWindow,
}

impl BlinkCounter {
    pub fn new(ear_threshold: f64, config: &EyeMonitorConfig) -> Self {
        Self {
            ear_threshold,
            min_frames: config.consecutive_frames,
            closed_frames: 0,
            total: 0,
            window: TimeWindow::new(config.blink_window_secs),
        }
    }

    /// Feed one frame's average EAR; returns the blink timestamp if one completed
    pub fn update(&mut self, avg_ear: f64, now: f64) -> Option<f64> {
        let mut blink = None;
        if avg_ear < self.ear_threshold {
            self.closed_frames += 1;
        } else {
            if self.closed_frames >= self.min_frames {
                self.total += 1;
                self.window.push(now);
                debug!("Blink after {} closed frames", self.closed_frames);
                blink = Some(now);
            }
            self.closed_frames = 0;
        }
        self.window.prune(now);
        blink
    }

    /// Blinks inside the trailing window as of `now`
    pub fn blinks_per_minute(&mut self, now: f64) -> usize {
        self.window.count_at(now)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Closure in progress long enough to count once the eye reopens
    pub fn is_blinking(&self) -> bool {
        self.closed_frames >= self.min_frames
    }

    pub fn closed_frames(&self) -> u32 {
        self.closed_frames
    }

    pub fn reset(&mut self) {
        self.closed_frames = 0;
        self.total = 0;
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: f64 = 0.30;
    const SHUT: f64 = 0.10;

    fn counter() -> BlinkCounter {
        BlinkCounter::new(0.21, &EyeMonitorConfig::default())
    }

    #[test]
    fn test_single_blink_on_reopening_edge() {
        let mut c = counter();
        let sequence: Vec<f64> = [OPEN; 5]
            .into_iter()
            .chain([SHUT; 4])
            .chain([OPEN; 5])
            .collect();

        let blinks: Vec<f64> = sequence
            .iter()
            .enumerate()
            .filter_map(|(i, &ear)| c.update(ear, i as f64 * 0.1))
            .collect();

        assert_eq!(blinks.len(), 1);
        // first open frame after the closure is index 9
        assert!((blinks[0] - 0.9).abs() < 1e-9);
        assert_eq!(c.total(), 1);
    }

    #[test]
    fn test_short_closure_is_noise() {
        let mut c = counter();
        for (i, ear) in [OPEN, SHUT, SHUT, OPEN, OPEN].into_iter().enumerate() {
            assert!(c.update(ear, i as f64).is_none());
        }
        assert_eq!(c.total(), 0);
    }

    #[test]
    fn test_prolonged_closure_never_counts() {
        let mut c = counter();
        for i in 0..300 {
            assert!(c.update(SHUT, i as f64 / 30.0).is_none());
        }
        assert_eq!(c.total(), 0);
        assert!(c.is_blinking());
    }

    #[test]
    fn test_window_drops_old_blinks() {
        let mut c = counter();
        let mut t = 0.0;
        let blink_at = |c: &mut BlinkCounter, start: f64| {
            for k in 0..3 {
                c.update(SHUT, start + k as f64 * 0.01);
            }
            c.update(OPEN, start + 0.05)
        };
        assert!(blink_at(&mut c, t).is_some());
        t += 30.0;
        assert!(blink_at(&mut c, t).is_some());

        assert_eq!(c.blinks_per_minute(45.0), 2);
        // first blink landed at 0.05
        assert_eq!(c.blinks_per_minute(60.1), 1);
        assert_eq!(c.total(), 2);
    }
}
