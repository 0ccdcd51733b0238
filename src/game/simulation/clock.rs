/// Frame timing on a free-running 16-bit tick counter.
///
/// The counter runs at the system clock divided by 64 (262144 Hz) and wraps
/// every 250 ms, which is longer than any frame. Elapsed ticks are the
/// wrapping difference between two samples.

use bevy::prelude::*;
use std::time::Duration;

/// Tick rate of the hardware timer: 16.78 MHz system clock / 64.
pub const TIMER_HZ: u32 = 262_144;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    pub last_ticks: u16,
    /// Ticks elapsed between the last two samples.
    pub dt: u16,
    /// Frames per second derived from `dt`, rounded and saturated at
    /// `u16::MAX`; 0 when `dt` is 0.
    pub fps: u16,
}

impl FrameClock {
    pub fn new(now: u16) -> Self {
        Self { last_ticks: now, dt: 0, fps: 0 }
    }

    /// Record a new counter value. Correct across the 16-bit wrap.
    pub fn sample(&mut self, now: u16) -> u16 {
        self.dt = now.wrapping_sub(self.last_ticks);
        self.last_ticks = now;
        self.fps = if self.dt == 0 {
            0
        } else {
            let dt = self.dt as u32;
            ((TIMER_HZ + dt / 2) / dt).min(u16::MAX as u32) as u16
        };
        self.dt
    }
}

/// Value the hardware counter would show after `elapsed` of wall time.
pub fn hardware_ticks(elapsed: Duration) -> u16 {
    (elapsed.as_micros() * TIMER_HZ as u128 / 1_000_000) as u16
}

/// Sample the emulated hardware counter once per frame.
pub fn sample_frame_clock(time: Res<Time<Real>>, mut clock: ResMut<FrameClock>) {
    clock.sample(hardware_ticks(time.elapsed()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_handles_wraparound() {
        let mut clock = FrameClock::new(65_000);
        assert_eq!(clock.sample(1_000), 1_536);
        assert_eq!(clock.last_ticks, 1_000);
    }

    #[test]
    fn test_fps_rounds_to_nearest() {
        let mut clock = FrameClock::new(0);
        // One 60 Hz frame is 4369.07 ticks
        clock.sample(4_369);
        assert_eq!(clock.fps, 60);

        clock.sample(4_369);
        assert_eq!(clock.dt, 0);
        assert_eq!(clock.fps, 0);
    }

    #[test]
    fn test_fps_saturates_on_tiny_dt() {
        let mut clock = FrameClock::new(0);
        clock.sample(1);
        assert_eq!(clock.fps, u16::MAX);

        // dt = 4 rounds to exactly 65536
        clock.sample(5);
        assert_eq!(clock.fps, u16::MAX);

        // 262144 / 5 rounds to 52429, the first value that fits
        clock.sample(10);
        assert_eq!(clock.fps, 52_429);
    }

    #[test]
    fn test_hardware_ticks_wrap_every_quarter_second() {
        assert_eq!(hardware_ticks(Duration::from_millis(0)), 0);
        assert_eq!(hardware_ticks(Duration::from_millis(125)), 32_768);
        assert_eq!(hardware_ticks(Duration::from_millis(250)), 0);
        assert_eq!(hardware_ticks(Duration::from_millis(16)), 4_194);
    }
}
