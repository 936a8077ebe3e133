use crate::error::{Chip8Error, Result};
use crate::frame_buffer::FrameBuffer;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// What an instruction does to the machine
pub type Execute = fn(op: &Opcode, state: &mut State, frame_buffer: &mut FrameBuffer) -> Result<()>;

/// # Instruction
/// One row of the instruction table: a pattern to match opcodes against, the handler that
/// executes a match, and a template for describing it.
///
/// Templates use `{x}` `{y}` `{n}` `{kk}` and `{nnn}` for the operands of the opcode.
pub struct Instruction {
    pub pattern: Opcode,
    pub template: &'static str,
    /// Recognised but left out of the interpreter; executing it is an error
    pub implemented: bool,
    execute: Execute,
}

const fn pattern(
    first: u8,
    second: Option<u8>,
    third: Option<u8>,
    fourth: Option<u8>,
) -> Opcode {
    Opcode::pattern(Some(first), second, third, fourth)
}

const fn row(pattern: Opcode, template: &'static str, execute: Execute) -> Instruction {
    Instruction {
        pattern,
        template,
        implemented: true,
        execute,
    }
}

const fn unsupported(pattern: Opcode, template: &'static str, execute: Execute) -> Instruction {
    Instruction {
        implemented: false,
        ..row(pattern, template, execute)
    }
}

/// Every instruction the interpreter knows about.
/// When more than one pattern matches, the one with the most fixed nibbles wins and
/// ties go to whichever comes first.
pub static INSTRUCTIONS: [Instruction; 35] = [
    unsupported(pattern(0x0, None, None, None), "SYS {nnn}", sys),
    row(pattern(0x0, Some(0x0), Some(0xE), Some(0x0)), "CLS", clr),
    row(pattern(0x0, Some(0x0), Some(0xE), Some(0xE)), "RET", rts),
    row(pattern(0x1, None, None, None), "JP {nnn}", jump),
    row(pattern(0x2, None, None, None), "CALL {nnn}", call),
    row(pattern(0x3, None, None, None), "SE V{x}, {kk}", ske),
    row(pattern(0x4, None, None, None), "SNE V{x}, {kk}", skne),
    row(pattern(0x5, None, None, Some(0x0)), "SE V{x}, V{y}", skre),
    row(pattern(0x6, None, None, None), "LD V{x}, {kk}", load),
    row(pattern(0x7, None, None, None), "ADD V{x}, {kk}", add),
    row(pattern(0x8, None, None, Some(0x0)), "LD V{x}, V{y}", mv),
    row(pattern(0x8, None, None, Some(0x1)), "OR V{x}, V{y}", or),
    row(pattern(0x8, None, None, Some(0x2)), "AND V{x}, V{y}", and),
    row(pattern(0x8, None, None, Some(0x3)), "XOR V{x}, V{y}", xor),
    row(pattern(0x8, None, None, Some(0x4)), "ADD V{x}, V{y}", addr_reg),
    row(pattern(0x8, None, None, Some(0x5)), "SUB V{x}, V{y}", sub),
    row(pattern(0x8, None, None, Some(0x6)), "SHR V{x}", shr),
    row(pattern(0x8, None, None, Some(0x7)), "SUBN V{x}, V{y}", subn),
    row(pattern(0x8, None, None, Some(0xE)), "SHL V{x}", shl),
    row(pattern(0x9, None, None, Some(0x0)), "SNE V{x}, V{y}", skrne),
    row(pattern(0xA, None, None, None), "LD I, {nnn}", loadi),
    row(pattern(0xB, None, None, None), "JP V0, {nnn}", jumpi),
    row(pattern(0xC, None, None, None), "RND V{x}, {kk}", rnd),
    row(pattern(0xD, None, None, None), "DRW V{x}, V{y}, {n}", draw),
    row(pattern(0xE, None, Some(0x9), Some(0xE)), "SKP V{x}", skpr),
    row(pattern(0xE, None, Some(0xA), Some(0x1)), "SKNP V{x}", skup),
    row(pattern(0xF, None, Some(0x0), Some(0x7)), "LD V{x}, DT", moved),
    row(pattern(0xF, None, Some(0x0), Some(0xA)), "LD V{x}, K", keyd),
    row(pattern(0xF, None, Some(0x1), Some(0x5)), "LD DT, V{x}", loadd),
    row(pattern(0xF, None, Some(0x1), Some(0x8)), "LD ST, V{x}", loads),
    row(pattern(0xF, None, Some(0x1), Some(0xE)), "ADD I, V{x}", addi),
    row(pattern(0xF, None, Some(0x2), Some(0x9)), "LD F, V{x}", ldspr),
    row(pattern(0xF, None, Some(0x3), Some(0x3)), "LD B, V{x}", bcd),
    row(pattern(0xF, None, Some(0x5), Some(0x5)), "LD [I], V{x}", stor),
    row(pattern(0xF, None, Some(0x6), Some(0x5)), "LD V{x}, [I]", read),
];

/// Selects the correct Instruction for a given Opcode
pub fn from_op(op: &Opcode) -> Option<&'static Instruction> {
    // max_by_key keeps the last of equal elements, so search backwards to favour earlier rows
    INSTRUCTIONS
        .iter()
        .rev()
        .filter(|instruction| instruction.pattern.matches(op))
        .max_by_key(|instruction| instruction.pattern.specificity())
}

impl Instruction {
    /// Runs the instruction against the machine.
    /// `op` must fit this instruction's pattern; anything else is rejected untouched,
    /// with the same error `describe` gives.
    pub fn execute(
        &self,
        op: &Opcode,
        state: &mut State,
        frame_buffer: &mut FrameBuffer,
    ) -> Result<()> {
        if !self.pattern.matches(op) {
            return Err(Chip8Error::InvalidOpcodeContents { opcode: *op });
        }
        (self.execute)(op, state, frame_buffer)
    }

    /// Renders `op` as assembly without touching any machine.
    pub fn describe(&self, op: &Opcode) -> Result<String> {
        if !self.pattern.matches(op) {
            return Err(Chip8Error::InvalidOpcodeContents { opcode: *op });
        }
        let missing = || Chip8Error::InvalidOpcodeContents { opcode: *op };
        let mut text = self.template.to_string();
        if text.contains("{nnn}") {
            let nnn = op.addr().ok_or_else(missing)?;
            text = text.replace("{nnn}", &format!("{:#05X}", nnn));
        }
        if text.contains("{kk}") {
            let kk = op.kk().ok_or_else(missing)?;
            text = text.replace("{kk}", &format!("{:#04X}", kk));
        }
        if text.contains("{x}") {
            let x = op.x().ok_or_else(missing)?;
            text = text.replace("{x}", &format!("{:X}", x));
        }
        if text.contains("{y}") {
            let y = op.y().ok_or_else(missing)?;
            text = text.replace("{y}", &format!("{:X}", y));
        }
        if text.contains("{n}") {
            let n = op.n().ok_or_else(missing)?;
            text = text.replace("{n}", &n.to_string());
        }
        Ok(text)
    }

    /// The mnemonic without operands, e.g. `DRW`
    pub fn mnemonic(&self) -> &'static str {
        self.template
            .split_whitespace()
            .next()
            .unwrap_or(self.template)
    }
}
