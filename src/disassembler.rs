use std::fmt;

use crate::constants::{MAX_ROM_SIZE, PROGRAM_START};
use crate::error::Chip8Error;
use crate::instruction::from_op;
use crate::opcode::Opcode;

/// One line of a disassembly
#[derive(Debug)]
pub struct DisassembledInstruction {
    pub address: u16,
    pub raw: u16,
    pub mnemonic: String,
    /// Set when the bytes aren't something the interpreter can run
    pub error: Option<Chip8Error>,
}

impl DisassembledInstruction {
    fn new(address: u16, raw: u16) -> Self {
        let op = Opcode::from(raw);
        let instruction = match from_op(&op) {
            Some(instruction) => instruction,
            None => return Self::failed(address, raw, Chip8Error::InvalidOpcode { address, raw }),
        };

        match instruction.describe(&op) {
            Ok(mnemonic) if instruction.implemented => DisassembledInstruction {
                address,
                raw,
                mnemonic,
                error: None,
            },
            Ok(mnemonic) => DisassembledInstruction {
                address,
                raw,
                mnemonic,
                error: Some(Chip8Error::OpcodeNotImplemented { raw }),
            },
            Err(error) => Self::failed(address, raw, error),
        }
    }

    fn failed(address: u16, raw: u16, error: Chip8Error) -> Self {
        DisassembledInstruction {
            address,
            raw,
            mnemonic: error.to_string(),
            error: Some(error),
        }
    }
}

/// `0x0200  00E0  CLS`
impl fmt::Display for DisassembledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}  {:04X}  {}", self.address, self.raw, self.mnemonic)
    }
}

/// # Disassembler
/// Walks a ROM two bytes at a time, describing each pair as if it were loaded at 0x200.
///
/// ROMs mix code with sprite data, so bytes that aren't an instruction produce an entry
/// carrying the error instead of ending the walk. A trailing odd byte is skipped, as is
/// anything past the `MAX_ROM_SIZE` bytes that fit in memory.
///
/// Nothing is decoded until the iterator is advanced; clone it to walk the ROM again.
#[derive(Clone, Debug)]
pub struct Disassembler<'a> {
    rom: &'a [u8],
    offset: usize,
}

/// Describes every instruction in `rom`
pub fn disassemble(rom: &[u8]) -> Disassembler<'_> {
    let rom = &rom[..rom.len().min(MAX_ROM_SIZE)];
    Disassembler { rom, offset: 0 }
}

impl<'a> Iterator for Disassembler<'a> {
    type Item = DisassembledInstruction;

    fn next(&mut self) -> Option<Self::Item> {
        let pair = self.rom.get(self.offset..self.offset + 2)?;
        let raw = u16::from(pair[0]) << 8 | u16::from(pair[1]);
        let address = PROGRAM_START.wrapping_add(self.offset as u16);
        self.offset += 2;
        Some(DisassembledInstruction::new(address, raw))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rom.len().saturating_sub(self.offset) / 2;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Disassembler<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassembles_at_program_start() {
        let rom = [0x00, 0xE0, 0xA2, 0x2A, 0xD0, 0x15];
        let lines: Vec<_> = disassemble(&rom).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].address, 0x200);
        assert_eq!(lines[0].raw, 0x00E0);
        assert_eq!(lines[0].mnemonic, "CLS");
        assert_eq!(lines[1].address, 0x202);
        assert_eq!(lines[1].mnemonic, "LD I, 0x22A");
        assert_eq!(lines[2].address, 0x204);
        assert_eq!(lines[2].mnemonic, "DRW V0, V1, 5");
        assert!(lines.iter().all(|line| line.error.is_none()));
    }

    #[test]
    fn test_keeps_going_past_invalid_opcodes() {
        let rom = [0xFF, 0xFF, 0x12, 0x00];
        let lines: Vec<_> = disassemble(&rom).collect();
        assert_eq!(lines.len(), 2);
        assert!(matches!(
            lines[0].error,
            Some(Chip8Error::InvalidOpcode { address: 0x200, raw: 0xFFFF })
        ));
        assert_eq!(lines[0].mnemonic, "invalid opcode 0xFFFF at 0x200");
        assert_eq!(lines[1].mnemonic, "JP 0x200");
        assert!(lines[1].error.is_none());
    }

    #[test]
    fn test_flags_unimplemented_opcodes() {
        let rom = [0x03, 0x45];
        let line = disassemble(&rom).next().unwrap();
        assert_eq!(line.mnemonic, "SYS 0x345");
        assert!(matches!(line.error, Some(Chip8Error::OpcodeNotImplemented { raw: 0x0345 })));
    }

    #[test]
    fn test_skips_trailing_byte() {
        let rom = [0x00, 0xE0, 0x12];
        let disassembler = disassemble(&rom);
        assert_eq!(disassembler.len(), 1);
        assert_eq!(disassembler.count(), 1);
    }

    #[test]
    fn test_stops_at_end_of_memory() {
        let rom = vec![0x00; 0x10000];
        let disassembler = disassemble(&rom);
        assert_eq!(disassembler.len(), MAX_ROM_SIZE / 2);
        let last = disassembler.last().unwrap();
        assert_eq!(last.address, 0xFFE);
    }

    #[test]
    fn test_empty_rom() {
        assert_eq!(disassemble(&[]).count(), 0);
    }

    #[test]
    fn test_restartable() {
        let rom = [0x00, 0xE0, 0x00, 0xEE];
        let disassembler = disassemble(&rom);
        let first: Vec<_> = disassembler.clone().map(|line| line.to_string()).collect();
        let second: Vec<_> = disassembler.map(|line| line.to_string()).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["0x0200  00E0  CLS", "0x0202  00EE  RET"]);
    }
}
