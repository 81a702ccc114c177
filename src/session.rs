use crate::config::Config;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use crate::timer::{TimerClock, TimerPolicy, TIMER_HZ};
use std::io;
use std::time::{Duration, Instant};

/// frames per second; the display, timers and buzzer are serviced once a frame
pub const FRAME_HZ: u32 = 60;

/// present the framebuffer at least this often, even if nothing was drawn
/// (clearing the screen doesn't ask for a redraw)
const FORCED_REDRAW_FRAMES: u64 = FRAME_HZ as u64;

/// The environment around the interpreter: paces cycles against the wall
/// clock, runs the 60Hz timers, drives the buzzer and the display.
pub struct Session<'a> {
    interpreter: Chip8Interpreter<'a>,
    display: &'a mut dyn Display,
    sound: &'a mut dyn Sound,
    clock: TimerClock,
    cycles_per_second: u32,
    timer_policy: TimerPolicy,
}

impl<'a> Session<'a> {
    pub fn new(
        interpreter: Chip8Interpreter<'a>,
        display: &'a mut dyn Display,
        sound: &'a mut dyn Sound,
        config: &Config,
    ) -> Self {
        Session {
            interpreter,
            display,
            sound,
            clock: TimerClock::new(TIMER_HZ),
            cycles_per_second: config.cycles_per_second,
            timer_policy: config.timer_policy(),
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter<'a> {
        &self.interpreter
    }

    /// Run until the user quits, a fatal error happens, or `max_cycles`
    /// instructions have executed. Returns the number of instructions run.
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<u64> {
        let frame = Duration::from_secs(1) / FRAME_HZ;
        let mut cycles: u64 = 0;
        let mut frames: u64 = 0;
        let mut pacer = CyclePacer::new(self.cycles_per_second);
        let mut last_tick = Instant::now();
        let mut next_frame = Instant::now() + frame;

        log::debug!(
            "running at {}Hz, timers {:?}",
            self.cycles_per_second,
            self.timer_policy
        );
        self.display.present(self.interpreter.framebuffer().snapshot())?;

        loop {
            if self.interpreter.quit_requested()? {
                log::info!("stopped by user after {} cycles", cycles);
                return Ok(cycles);
            }

            let mut redraw = false;
            for _ in 0..pacer.next_frame() {
                if max_cycles.map_or(false, |max| cycles >= max) {
                    return Ok(cycles);
                }
                match self.interpreter.step() {
                    Ok(invalidated) => redraw |= invalidated,
                    Err(Error::Io(e)) if e.kind() == io::ErrorKind::Interrupted => {
                        log::info!("stopped by user after {} cycles", cycles);
                        return Ok(cycles);
                    }
                    Err(e) if !e.is_fatal() => {
                        log::warn!("{} [{}]", e, self.interpreter.dump_registers());
                    }
                    Err(e) => {
                        log::error!("halting: {} [{}]", e, self.interpreter.dump_registers());
                        return Err(e);
                    }
                }
                cycles += 1;
            }

            let now = Instant::now();
            if self.timer_policy == TimerPolicy::WallClock {
                self.clock
                    .run(now - last_tick, self.interpreter.registers_mut());
            }
            last_tick = now;

            let sound_timer = self.interpreter.registers().sound_timer;
            if let Err(e) = self.sound.follow_timer(sound_timer) {
                log::warn!("buzzer failed: {}", e);
            }

            frames += 1;
            if redraw || frames % FORCED_REDRAW_FRAMES == 0 {
                self.display.present(self.interpreter.framebuffer().snapshot())?;
            }

            let now = Instant::now();
            if next_frame > now {
                spin_sleep::sleep(next_frame - now);
                next_frame += frame;
            } else {
                // fell behind; don't try to catch up
                next_frame = now + frame;
            }
        }
    }
}

/// Spreads a clock rate over frames: how many whole cycles each frame gets,
/// with the fraction carried into the next one.
struct CyclePacer {
    hz: u64,
    // in units of 1/FRAME_HZ of a cycle
    owed: u64,
}

impl CyclePacer {
    fn new(cycles_per_second: u32) -> Self {
        CyclePacer {
            hz: u64::from(cycles_per_second),
            owed: 0,
        }
    }

    fn next_frame(&mut self) -> u64 {
        self.owed += self.hz;
        let due = self.owed / u64::from(FRAME_HZ);
        self.owed %= u64::from(FRAME_HZ);
        due
    }
}
