//! Decoding of raw opcodes into instructions with their operands pulled out.
//!
//! Operand naming follows the usual CHIP-8 notation: `x` and `y` are
//! register indices taken from the second and third nibble, `nn` is the low
//! byte, `nnn` the low 12 bits and `n` the last nibble.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN: call machine code routine (not emulated)
    Sys { nnn: u16 },
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN: skip if VX == NN
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN: skip if VX != NN
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0: skip if VX == VY
    SkipEqReg { x: usize, y: usize },
    /// 6XNN: VX = NN
    LoadImm { x: usize, nn: u8 },
    /// 7XNN: VX += NN, no carry
    AddImm { x: usize, nn: u8 },
    /// 8XY0: VX = VY
    Move { x: usize, y: usize },
    /// 8XY1
    Or { x: usize, y: usize },
    /// 8XY2
    And { x: usize, y: usize },
    /// 8XY3
    Xor { x: usize, y: usize },
    /// 8XY4: VX += VY, VF = carry
    Add { x: usize, y: usize },
    /// 8XY5: VX -= VY, VF = not borrow
    Sub { x: usize, y: usize },
    /// 8XY6: VX >>= 1, VF = bit shifted out
    ShiftRight { x: usize, y: usize },
    /// 8XY7: VX = VY - VX, VF = not borrow
    SubReverse { x: usize, y: usize },
    /// 8XYE: VX <<= 1, VF = bit shifted out
    ShiftLeft { x: usize, y: usize },
    /// 9XY0: skip if VX != VY
    SkipNeReg { x: usize, y: usize },
    /// ANNN: I = NNN
    LoadIndex { nnn: u16 },
    /// BNNN: jump to V0 + NNN
    JumpOffset { nnn: u16 },
    /// CXNN: VX = rand() & NN
    Random { x: usize, nn: u8 },
    /// DXYN: draw N rows of sprite data from I at (VX, VY)
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E
    SkipKeyPressed { x: usize },
    /// EXA1
    SkipKeyNotPressed { x: usize },
    /// FX07: VX = delay timer
    LoadDelay { x: usize },
    /// FX0A: VX = next key press (blocks)
    WaitKey { x: usize },
    /// FX15: delay timer = VX
    SetDelay { x: usize },
    /// FX18: sound timer = VX
    SetSound { x: usize },
    /// FX1E: I += VX
    AddIndex { x: usize },
    /// FX29: I = address of digit sprite VX
    LoadDigit { x: usize },
    /// FX33: store BCD of VX at I, I+1, I+2
    StoreBcd { x: usize },
    /// FX55: store V0..=VX from I
    StoreRegisters { x: usize },
    /// FX65: load V0..=VX from I
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Decode a 16-bit opcode. Returns None when no rule matches.
    pub fn decode(opcode: u16) -> Option<Instruction> {
        use Instruction::*;

        let n1 = (opcode >> 12) & 0xf;
        let x = ((opcode >> 8) & 0xf) as usize;
        let y = ((opcode >> 4) & 0xf) as usize;
        let n = (opcode & 0xf) as u8;
        let nn = (opcode & 0xff) as u8;
        let nnn = opcode & 0x0fff;

        let instruction = match (n1, n) {
            (0x0, _) => match nnn {
                0x0e0 => ClearScreen,
                0x0ee => Return,
                _ => Sys { nnn },
            },
            (0x1, _) => Jump { nnn },
            (0x2, _) => Call { nnn },
            (0x3, _) => SkipEqImm { x, nn },
            (0x4, _) => SkipNeImm { x, nn },
            (0x5, 0x0) => SkipEqReg { x, y },
            (0x6, _) => LoadImm { x, nn },
            (0x7, _) => AddImm { x, nn },
            (0x8, 0x0) => Move { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => Add { x, y },
            (0x8, 0x5) => Sub { x, y },
            (0x8, 0x6) => ShiftRight { x, y },
            (0x8, 0x7) => SubReverse { x, y },
            (0x8, 0xe) => ShiftLeft { x, y },
            (0x9, 0x0) => SkipNeReg { x, y },
            (0xa, _) => LoadIndex { nnn },
            (0xb, _) => JumpOffset { nnn },
            (0xc, _) => Random { x, nn },
            (0xd, _) => Draw { x, y, n },
            (0xe, _) => match nn {
                0x9e => SkipKeyPressed { x },
                0xa1 => SkipKeyNotPressed { x },
                _ => return None,
            },
            (0xf, _) => match nn {
                0x07 => LoadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadDigit { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }

    /// Whether this instruction relies on a word existing after it, either
    /// to carry on at or to push as a return address. Jumps and returns set
    /// PC outright and can sit in the last word of memory.
    pub fn needs_successor(&self) -> bool {
        !matches!(
            self,
            Instruction::Jump { .. } | Instruction::JumpOffset { .. } | Instruction::Return
        )
    }
}

/// disassembly, roughly in the style of the classic CHIP-8 assemblers
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            Sys { nnn } => write!(f, "SYS  {:03X}", nnn),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP   {:03X}", nnn),
            Call { nnn } => write!(f, "CALL {:03X}", nnn),
            SkipEqImm { x, nn } => write!(f, "SE   V{:X}, {:02X}", x, nn),
            SkipNeImm { x, nn } => write!(f, "SNE  V{:X}, {:02X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE   V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD   V{:X}, {:02X}", x, nn),
            AddImm { x, nn } => write!(f, "ADD  V{:X}, {:02X}", x, nn),
            Move { x, y } => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR   V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNeReg { x, y } => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD   I, {:03X}", nnn),
            JumpOffset { nnn } => write!(f, "JP   V0, {:03X}", nnn),
            Random { x, nn } => write!(f, "RND  V{:X}, {:02X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {:X}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP  V{:X}", x),
            SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD   V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD   V{:X}, K", x),
            SetDelay { x } => write!(f, "LD   DT, V{:X}", x),
            SetSound { x } => write!(f, "LD   ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD  I, V{:X}", x),
            LoadDigit { x } => write!(f, "LD   F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD   B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD   V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_system_family() {
        assert_eq!(Instruction::decode(0x00e0), Some(ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Some(Return));
        assert_eq!(Instruction::decode(0x0123), Some(Sys { nnn: 0x123 }));
    }

    #[test]
    fn test_only_jumps_and_returns_stand_alone() {
        assert!(!Jump { nnn: 0x200 }.needs_successor());
        assert!(!JumpOffset { nnn: 0x200 }.needs_successor());
        assert!(!Return.needs_successor());
        assert!(Call { nnn: 0x200 }.needs_successor());
        assert!(SkipEqImm { x: 0, nn: 0 }.needs_successor());
        assert!(ClearScreen.needs_successor());
    }

    #[test]
    fn test_decode_addresses() {
        assert_eq!(Instruction::decode(0x1abc), Some(Jump { nnn: 0xabc }));
        assert_eq!(Instruction::decode(0x2300), Some(Call { nnn: 0x300 }));
        assert_eq!(Instruction::decode(0xa21c), Some(LoadIndex { nnn: 0x21c }));
        assert_eq!(Instruction::decode(0xb400), Some(JumpOffset { nnn: 0x400 }));
    }

    #[test]
    fn test_decode_register_operands() {
        assert_eq!(Instruction::decode(0x3a42), Some(SkipEqImm { x: 0xa, nn: 0x42 }));
        assert_eq!(Instruction::decode(0x4b00), Some(SkipNeImm { x: 0xb, nn: 0x00 }));
        assert_eq!(Instruction::decode(0x5120), Some(SkipEqReg { x: 1, y: 2 }));
        assert_eq!(Instruction::decode(0x611e), Some(LoadImm { x: 1, nn: 0x1e }));
        assert_eq!(Instruction::decode(0x7301), Some(AddImm { x: 3, nn: 0x01 }));
        assert_eq!(Instruction::decode(0x9ef0), Some(SkipNeReg { x: 0xe, y: 0xf }));
        assert_eq!(Instruction::decode(0xc2ff), Some(Random { x: 2, nn: 0xff }));
        assert_eq!(Instruction::decode(0xd124), Some(Draw { x: 1, y: 2, n: 4 }));
    }

    #[test]
    fn test_decode_alu_family() {
        let expected = [
            (0x0, Move { x: 4, y: 5 }),
            (0x1, Or { x: 4, y: 5 }),
            (0x2, And { x: 4, y: 5 }),
            (0x3, Xor { x: 4, y: 5 }),
            (0x4, Add { x: 4, y: 5 }),
            (0x5, Sub { x: 4, y: 5 }),
            (0x6, ShiftRight { x: 4, y: 5 }),
            (0x7, SubReverse { x: 4, y: 5 }),
            (0xe, ShiftLeft { x: 4, y: 5 }),
        ];
        for (n, instruction) in expected {
            assert_eq!(Instruction::decode(0x8450 | n), Some(instruction));
        }
        for n in [0x8, 0x9, 0xa, 0xb, 0xc, 0xd, 0xf] {
            assert_eq!(Instruction::decode(0x8450 | n), None);
        }
    }

    #[test]
    fn test_decode_key_and_misc_family() {
        assert_eq!(Instruction::decode(0xe59e), Some(SkipKeyPressed { x: 5 }));
        assert_eq!(Instruction::decode(0xe5a1), Some(SkipKeyNotPressed { x: 5 }));
        assert_eq!(Instruction::decode(0xf107), Some(LoadDelay { x: 1 }));
        assert_eq!(Instruction::decode(0xf20a), Some(WaitKey { x: 2 }));
        assert_eq!(Instruction::decode(0xf315), Some(SetDelay { x: 3 }));
        assert_eq!(Instruction::decode(0xf418), Some(SetSound { x: 4 }));
        assert_eq!(Instruction::decode(0xf51e), Some(AddIndex { x: 5 }));
        assert_eq!(Instruction::decode(0xf629), Some(LoadDigit { x: 6 }));
        assert_eq!(Instruction::decode(0xf733), Some(StoreBcd { x: 7 }));
        assert_eq!(Instruction::decode(0xf855), Some(StoreRegisters { x: 8 }));
        assert_eq!(Instruction::decode(0xf965), Some(LoadRegisters { x: 9 }));
    }

    #[test]
    fn test_decode_unknown() {
        for opcode in [0xffff, 0x5121, 0x9ab1, 0xe000, 0xe59f, 0xf000, 0xf156] {
            assert_eq!(Instruction::decode(opcode), None, "{:04x}", opcode);
        }
    }

    #[test]
    fn test_disassembly() {
        assert_eq!(ClearScreen.to_string(), "CLS");
        assert_eq!(Draw { x: 1, y: 2, n: 4 }.to_string(), "DRW  V1, V2, 4");
        assert_eq!(LoadIndex { nnn: 0x21c }.to_string(), "LD   I, 21C");
        assert_eq!(Add { x: 0, y: 0xf }.to_string(), "ADD  V0, VF");
        assert_eq!(StoreRegisters { x: 3 }.to_string(), "LD   [I], V3");
    }
}
