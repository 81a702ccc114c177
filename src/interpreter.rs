/// # interpreter
///
/// One `step()` is one fetch/decode/execute cycle:
///  1. fetch the big-endian opcode at PC
///  2. decode it into an `Instruction` (see instruction.rs)
///  3. execute it against the registers, memory, framebuffer and input
///
/// Execution works out where PC goes next (`Flow`) before PC is touched,
/// so an instruction that fails leaves the machine as it found it. The one
/// exception is an unknown opcode, which still moves PC past itself so a
/// driver that chooses to carry on doesn't fault forever on the same word.
///
/// Memory layout, digit sprites and the register file are described in
/// memory.rs and registers.rs.
use crate::config::Config;
use crate::display::Framebuffer;
use crate::error::{Error, Result};
use crate::input::InputPort;
use crate::instruction::Instruction;
use crate::memory::{Chip8Memory, MemoryMap, APPLICATION_START, MEMORY_SIZE};
use crate::registers::{RegisterDump, RegisterFile, VF};
use crate::timer::TimerPolicy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

/// I only ever addresses 12 bits
const ADDRESS_MASK: u16 = 0x0fff;

/// where PC goes once an instruction has run
enum Flow {
    Next,
    SkipIf(bool),
    Jump(u16),
    /// like Next, but the framebuffer changed
    Redraw,
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8Memory,
    registers: RegisterFile,
    framebuffer: Framebuffer,
    input: &'a mut dyn InputPort,
    rng: StdRng,
    timer_policy: TimerPolicy,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(input: &'a mut dyn InputPort, config: &Config) -> Chip8Interpreter<'a> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            memory: Chip8Memory::new(),
            registers: RegisterFile::new(),
            framebuffer: Framebuffer::new(),
            input,
            rng,
            timer_policy: config.timer_policy(),
        }
    }

    /// load a chip8 program image at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        self.memory.load_program(reader)
    }

    /// copy raw bytes anywhere in memory, before the first step
    pub fn load(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        self.memory.load(addr, data)
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn memory(&self) -> &Chip8Memory {
        &self.memory
    }

    pub fn dump_registers(&self) -> RegisterDump {
        self.registers.dump()
    }

    /// ask the input port whether the user wants to stop
    pub fn quit_requested(&mut self) -> Result<bool> {
        Ok(self.input.poll_quit()?)
    }

    /// Run one instruction. Returns true when the framebuffer changed and
    /// should be presented again.
    pub fn step(&mut self) -> Result<bool> {
        let result = self.cycle();
        if self.timer_policy == TimerPolicy::CycleCoupled {
            self.registers.tick_timers();
        }
        self.registers.check_invariants()?;
        result
    }

    fn cycle(&mut self) -> Result<bool> {
        let pc = self.registers.pc;
        let opcode = self.memory.get_word(pc)?;

        let instruction = match Instruction::decode(opcode) {
            Some(instruction) => instruction,
            None => {
                self.registers.pc = sequential(pc, 2)?;
                return Err(Error::UnknownOpcode { opcode });
            }
        };
        log::trace!("{:04x}: {:04x}  {}", pc, opcode, instruction);

        // checked up front, so running off the end changes nothing
        if instruction.needs_successor() {
            sequential(pc, 2)?;
        }

        let (new_pc, redraw) = match self.execute(instruction, pc)? {
            Flow::Next | Flow::SkipIf(false) => (sequential(pc, 2)?, false),
            Flow::SkipIf(true) => (sequential(pc, 4)?, false),
            Flow::Jump(target) => (target, false),
            Flow::Redraw => (sequential(pc, 2)?, true),
        };
        self.registers.pc = new_pc;
        Ok(redraw)
    }

    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<Flow> {
        use Instruction::*;

        let v = &mut self.registers.v;
        let flow = match instruction {
            Sys { nnn } => {
                log::warn!("ignoring machine code routine at {:03x}", nnn);
                Flow::Next
            }
            ClearScreen => {
                self.framebuffer.clear();
                Flow::Next
            }
            // return addresses were checked by sequential() when pushed
            Return => Flow::Jump(self.registers.pop()?),
            Jump { nnn } => Flow::Jump(jump_target(nnn)?),
            Call { nnn } => {
                let target = jump_target(nnn)?;
                self.registers.push(sequential(pc, 2)?)?;
                Flow::Jump(target)
            }
            SkipEqImm { x, nn } => Flow::SkipIf(v[x] == nn),
            SkipNeImm { x, nn } => Flow::SkipIf(v[x] != nn),
            SkipEqReg { x, y } => Flow::SkipIf(v[x] == v[y]),
            SkipNeReg { x, y } => Flow::SkipIf(v[x] != v[y]),
            LoadImm { x, nn } => {
                v[x] = nn;
                Flow::Next
            }
            AddImm { x, nn } => {
                v[x] = v[x].wrapping_add(nn);
                Flow::Next
            }
            Move { x, y } => {
                v[x] = v[y];
                Flow::Next
            }
            Or { x, y } => {
                v[x] |= v[y];
                Flow::Next
            }
            And { x, y } => {
                v[x] &= v[y];
                Flow::Next
            }
            Xor { x, y } => {
                v[x] ^= v[y];
                Flow::Next
            }
            // flags come from the untruncated operands and are written last,
            // so VF as a destination ends up holding the flag
            Add { x, y } => {
                let sum = v[x] as u16 + v[y] as u16;
                v[x] = sum as u8;
                v[VF] = (sum > 0xff) as u8;
                Flow::Next
            }
            Sub { x, y } => {
                let (vx, vy) = (v[x], v[y]);
                v[x] = vx.wrapping_sub(vy);
                v[VF] = (vy <= vx) as u8;
                Flow::Next
            }
            SubReverse { x, y } => {
                let (vx, vy) = (v[x], v[y]);
                v[x] = vy.wrapping_sub(vx);
                v[VF] = (vx <= vy) as u8;
                Flow::Next
            }
            ShiftRight { x, .. } => {
                let vx = v[x];
                v[x] = vx >> 1;
                v[VF] = vx & 0x01;
                Flow::Next
            }
            ShiftLeft { x, .. } => {
                let vx = v[x];
                v[x] = vx << 1;
                v[VF] = vx >> 7;
                Flow::Next
            }
            LoadIndex { nnn } => {
                self.registers.i = nnn;
                Flow::Next
            }
            JumpOffset { nnn } => Flow::Jump(jump_target(v[0] as u16 + nnn)?),
            Random { x, nn } => {
                v[x] = self.rng.gen::<u8>() & nn;
                Flow::Next
            }
            Draw { x, y, n } => {
                let (x0, y0) = (v[x] as usize, v[y] as usize);
                let addr = self.registers.i & ADDRESS_MASK;
                let sprite = self.memory.get_ro_slice(addr, n as usize)?;
                let mut collided = false;
                for (row, byte) in sprite.iter().enumerate() {
                    for col in 0..8 {
                        let bit = (byte >> (7 - col)) & 1;
                        collided |= self.framebuffer.paint(x0 + col, y0 + row, bit);
                    }
                }
                self.registers.v[VF] = collided as u8;
                Flow::Redraw
            }
            SkipKeyPressed { x } => Flow::SkipIf(self.input.is_pressed(v[x] & 0x0f)?),
            SkipKeyNotPressed { x } => Flow::SkipIf(!self.input.is_pressed(v[x] & 0x0f)?),
            LoadDelay { x } => {
                v[x] = self.registers.delay_timer;
                Flow::Next
            }
            WaitKey { x } => {
                let key = self.input.blocking_next_key()?;
                self.registers.v[x] = key & 0x0f;
                Flow::Next
            }
            SetDelay { x } => {
                self.registers.delay_timer = v[x];
                Flow::Next
            }
            SetSound { x } => {
                self.registers.sound_timer = v[x];
                Flow::Next
            }
            AddIndex { x } => {
                self.registers.i = self.registers.i.wrapping_add(v[x] as u16);
                Flow::Next
            }
            LoadDigit { x } => {
                self.registers.i = Chip8Memory::digit_sprite_addr(v[x]);
                Flow::Next
            }
            StoreBcd { x } => {
                let vx = v[x];
                let addr = self.writable_index(3)?;
                self.memory.load(addr, &[vx / 100, (vx / 10) % 10, vx % 10])?;
                Flow::Next
            }
            StoreRegisters { x } => {
                let addr = self.writable_index(x + 1)?;
                self.memory.load(addr, &self.registers.v[..=x])?;
                Flow::Next
            }
            LoadRegisters { x } => {
                let addr = self.registers.i & ADDRESS_MASK;
                let src = self.memory.get_ro_slice(addr, x + 1)?;
                self.registers.v[..=x].copy_from_slice(src);
                Flow::Next
            }
        };
        Ok(flow)
    }

    /// I, masked, as long as `len` bytes from it are in the program area
    fn writable_index(&self, len: usize) -> Result<u16> {
        let addr = self.registers.i & ADDRESS_MASK;
        if addr < APPLICATION_START {
            return Err(Error::MemoryOutOfBounds {
                address: addr as usize,
            });
        }
        if addr as usize + len > MEMORY_SIZE {
            return Err(Error::MemoryOutOfBounds {
                address: MEMORY_SIZE,
            });
        }
        Ok(addr)
    }
}

/// pc + `by`, provided there is still an instruction there to fetch
fn sequential(pc: u16, by: u16) -> Result<u16> {
    let next = pc + by;
    if next as usize >= MEMORY_SIZE {
        return Err(Error::MemoryOutOfBounds {
            address: next as usize,
        });
    }
    Ok(next)
}

/// jumps must land on an instruction in the program area
fn jump_target(addr: u16) -> Result<u16> {
    if addr < APPLICATION_START || addr as usize >= MEMORY_SIZE {
        return Err(Error::MemoryOutOfBounds {
            address: addr as usize,
        });
    }
    if addr % 2 != 0 {
        return Err(Error::MisalignedAddress { address: addr });
    }
    Ok(addr)
}
