use crate::registers::RegisterFile;
use std::time::Duration;

/// rate the delay and sound timers count down at
pub const TIMER_HZ: u32 = 60;

/// How the two timers are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPolicy {
    /// the interpreter ticks both timers once per step
    CycleCoupled,
    /// the driver ticks them at TIMER_HZ of real time, whatever the clock rate
    WallClock,
}

impl Default for TimerPolicy {
    fn default() -> Self {
        TimerPolicy::WallClock
    }
}

/// Turns elapsed wall-clock time into whole timer ticks, carrying the
/// remainder over so no time is lost between calls.
pub struct TimerClock {
    period: Duration,
    pending: Duration,
}

impl TimerClock {
    pub fn new(hz: u32) -> Self {
        TimerClock {
            period: Duration::from_secs(1) / hz.max(1),
            pending: Duration::ZERO,
        }
    }

    /// account for `elapsed` time; returns how many ticks are now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed;
        let mut ticks = 0;
        while self.pending >= self.period {
            self.pending -= self.period;
            ticks += 1;
        }
        ticks
    }

    /// decrement both timers once
    pub fn tick(registers: &mut RegisterFile) {
        registers.tick_timers();
    }

    /// advance by `elapsed` and apply every due tick
    pub fn run(&mut self, elapsed: Duration, registers: &mut RegisterFile) -> u32 {
        let ticks = self.advance(elapsed);
        for _ in 0..ticks {
            Self::tick(registers);
        }
        ticks
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        Self::new(TIMER_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_second_is_sixty_ticks() {
        let mut c = TimerClock::default();
        assert_eq!(c.advance(Duration::from_secs(1)), 60);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut c = TimerClock::new(60);
        // 10ms is less than one 16.6ms period
        assert_eq!(c.advance(Duration::from_millis(10)), 0);
        assert_eq!(c.advance(Duration::from_millis(10)), 1);
        assert_eq!(c.advance(Duration::from_millis(14)), 1);
        assert_eq!(c.advance(Duration::from_millis(1)), 0);
    }

    #[test]
    fn test_run_applies_ticks() {
        let mut c = TimerClock::new(60);
        let mut r = RegisterFile::new();
        r.delay_timer = 10;
        r.sound_timer = 2;
        assert_eq!(c.run(Duration::from_millis(100), &mut r), 6);
        assert_eq!(r.delay_timer, 4);
        assert_eq!(r.sound_timer, 0);
    }
}
