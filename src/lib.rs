pub use chip8::{Chip8, Registers, StepOutcome};
pub use disassembler::{disassemble, DisassembledInstruction, Disassembler};
pub use error::{Chip8Error, Result};
pub use frame_buffer::{Frame, FrameBuffer};
pub use opcode::Opcode;
pub use quirks::{BorrowFlag, Quirks};

mod chip8;
pub mod constants;
mod disassembler;
mod error;
mod frame_buffer;
pub mod instruction;
mod opcode;
mod operations;
mod quirks;
pub mod state;
