use crate::timer::TimerPolicy;
use clap::Parser;
use std::path::PathBuf;

/// roughly what contemporary interpreters manage; programs expect ~500-1000
pub const DEFAULT_CYCLES_PER_SECOND: u32 = 700;

/// well past anything a CHIP-8 program was written for
pub const MAX_CYCLES_PER_SECOND: u32 = 1_000_000;

/// Runtime knobs for a session, taken from the command line.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "chip8vm", about = "Run a CHIP-8 program in the terminal.")]
pub struct Config {
    /// Program image, loaded at 0x200.
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// Instructions executed per second of wall-clock time.
    #[arg(
        long = "hz",
        value_name = "N",
        default_value_t = DEFAULT_CYCLES_PER_SECOND,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CYCLES_PER_SECOND as i64)
    )]
    pub cycles_per_second: u32,

    /// Tick the delay and sound timers once per instruction instead of at 60Hz.
    #[arg(long, default_value_t = false)]
    pub cycle_timers: bool,

    /// Fixed seed for CXNN, for reproducible runs.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Keep the buzzer quiet.
    #[arg(long, default_value_t = false)]
    pub mute: bool,
}

impl Config {
    pub fn timer_policy(&self) -> TimerPolicy {
        if self.cycle_timers {
            TimerPolicy::CycleCoupled
        } else {
            TimerPolicy::WallClock
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom: PathBuf::new(),
            cycles_per_second: DEFAULT_CYCLES_PER_SECOND,
            cycle_timers: false,
            seed: None,
            mute: false,
        }
    }
}
