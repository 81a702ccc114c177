use crate::error::{Error, Result};
use crate::memory::{APPLICATION_START, MEMORY_SIZE};
use std::fmt;

/// how deep subroutine calls may nest
pub const STACK_CAPACITY: usize = 16;

/// index of VF, the flag register
pub const VF: usize = 0xf;

/// The CHIP-8 register file: V0-VF, I, the program counter, the call stack
/// and the two countdown timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_CAPACITY],
    sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            v: [0; 16],
            i: 0,
            pc: APPLICATION_START,
            stack: [0; STACK_CAPACITY],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.sp == STACK_CAPACITY {
            return Err(Error::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// count both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Checked after every step. A failure here means the interpreter itself
    /// is broken, not the program it's running.
    pub fn check_invariants(&self) -> Result<()> {
        if self.pc % 2 != 0 {
            return Err(Error::InvariantViolation(format!(
                "pc {:#06x} is odd",
                self.pc
            )));
        }
        if self.pc < APPLICATION_START || self.pc as usize >= MEMORY_SIZE {
            return Err(Error::InvariantViolation(format!(
                "pc {:#06x} outside program area",
                self.pc
            )));
        }
        if self.sp > STACK_CAPACITY {
            return Err(Error::InvariantViolation(format!(
                "sp {} exceeds stack capacity",
                self.sp
            )));
        }
        Ok(())
    }

    pub fn dump(&self) -> RegisterDump {
        RegisterDump {
            v: self.v,
            i: self.i,
            pc: self.pc,
            sp: self.sp,
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// snapshot of the registers for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDump {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, v) in self.v.iter().enumerate() {
            write!(f, "V{:X}={:02x} ", n, v)?;
        }
        write!(f, "I={:04x} PC={:04x} SP={}", self.i, self.pc, self.sp)
    }
}
