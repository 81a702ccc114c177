//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter core owns its state outright (memory, registers,
//!   framebuffer); no globals, so any number of machines can exist side by side
//! * opcodes are decoded once into an `Instruction`, then executed; decoding
//!   and execution are tested separately
//! * every failure is an `Error` handed back from `step()`; the driver decides
//!   whether to carry on (unknown opcodes) or stop (everything else)
//! * abstract display, input and sound behind traits so the core doesn't
//!   need to know how the terminal works
//! * timers count down at 60Hz of wall-clock time by default, independent of
//!   how fast instructions run; `TimerPolicy::CycleCoupled` ticks them once
//!   per instruction instead
//!
//! Model
//!
//! Session
//!  |-- display, sound, config
//!  |-- interpreter(input, config)
//!  |    |-- memory (digit sprites + program)
//!  |    |-- register file (V0-VF, I, PC, stack, timers)
//!  |    `-- framebuffer
//!  `-- main loop, once per 60Hz frame
//!       |-- run cycles_per_second / 60 steps
//!       |-- tick the timer clock by elapsed wall-clock time
//!       |-- buzzer on iff sound timer > 0
//!       |-- present the framebuffer if a draw changed it
//!       `-- spin-sleep to the next frame boundary
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod session;
pub mod sound;
pub mod timer;

pub use error::{Error, Result};
