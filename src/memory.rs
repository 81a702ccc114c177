use crate::error::{Error, Result};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat memory map: interpreter data below the program
/// area, then the program itself.
pub trait MemoryMap {
    /// total number of addressable bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;

    /// copy a chunk of bytes into memory at `addr`
    fn load(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (opcode fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(((word[0] as u16) << 8) | word[1] as u16)
    }
}

/// how much RAM we have
pub const MEMORY_SIZE: usize = 4096;

/// where the program is loaded
pub const APPLICATION_START: u16 = 0x0200;

/// where the digit sprites live, and how many bytes each one takes
pub const DIGIT_SPRITE_ADDR: u16 = 0x0000;
pub const DIGIT_SPRITE_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  digit sprites 0-F
///   0x0050-0x01ff  reserved for the interpreter
///   0x0200-0x0fff  program
pub struct Chip8Memory {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8Memory {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = self.check_range(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = self.check_range(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

impl Chip8Memory {
    /// initialises memory with the digit sprites baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; MEMORY_SIZE].into_boxed_slice();
        let font = DIGIT_SPRITE_ADDR as usize;
        bytes[font..font + DIGIT_SPRITES.len()].copy_from_slice(&DIGIT_SPRITES);
        Chip8Memory { bytes }
    }

    /// load a whole program image at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<()> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let max = self.size() - APPLICATION_START as usize;
        if buf.len() > max {
            return Err(Error::ProgramTooLarge {
                size: buf.len(),
                max,
            });
        }
        log::debug!("loaded {} program bytes at {:#05x}", buf.len(), APPLICATION_START);
        self.load(APPLICATION_START, &buf)
    }

    /// address of the sprite for hex digit `digit` (only the low nibble counts)
    pub fn digit_sprite_addr(digit: u8) -> u16 {
        DIGIT_SPRITE_ADDR + (digit & 0x0f) as u16 * DIGIT_SPRITE_BYTES
    }

    fn check_range(&self, addr: u16, len: usize) -> Result<usize> {
        let a = addr as usize;
        if a + len > self.bytes.len() {
            // report the first byte that doesn't exist
            return Err(Error::MemoryOutOfBounds {
                address: a.max(self.bytes.len()),
            });
        }
        Ok(a)
    }
}

impl Default for Chip8Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const DIGIT_SPRITES: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
