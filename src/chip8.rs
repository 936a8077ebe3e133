use std::collections::BTreeSet;
use std::io::Read;

use crate::constants::{KEY_COUNT, MEMORY_SIZE, PROGRAM_START, STACK_SIZE};
use crate::disassembler::{disassemble, Disassembler};
use crate::error::{Chip8Error, Result};
use crate::frame_buffer::{Frame, FrameBuffer};
use crate::instruction::from_op;
use crate::opcode::Opcode;
use crate::quirks::Quirks;
use crate::state::State;

/// What a call to `Chip8::step` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction ran
    Executed,
    /// The pc sits on a breakpoint; the next step runs the instruction
    PausedAtBreakpoint(u16),
    /// `LD Vx, K` is waiting for `key_press`
    WaitingForKey,
}

/// The CPU registers, copied out for inspection
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `frame_buffer` that sprites are drawn to
///  - `breakpoints` and the last one the CPU paused on
///  - the loaded `rom` so it can be disassembled
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU one instruction at a time
/// - advancing its timers
/// - inspecting its registers and frame buffer
///
/// Nothing here keeps time. The host calls `step` at its chosen clock speed and
/// `tick_timers` at 60Hz, from one thread or behind one lock.
pub struct Chip8 {
    state: State,
    frame_buffer: FrameBuffer,
    breakpoints: BTreeSet<u16>,
    last_break: Option<u16>,
    rom: Vec<u8>,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        Chip8 {
            state: State::with_quirks(quirks),
            frame_buffer: FrameBuffer::new(),
            breakpoints: BTreeSet::new(),
            last_break: None,
            rom: Vec::new(),
        }
    }

    /// Load a rom into memory at 0x200 and reset the CPU
    ///
    /// # Arguments
    /// * `rom` the raw bytes of a ROM image
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.state.load_program(rom)?;
        self.frame_buffer.clear();
        self.last_break = None;
        self.rom = rom.to_vec();
        log::debug!("loaded {} byte ROM at {:#05X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom_from(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load_rom(&rom)
    }

    /// Set the pressed status of key
    /// - if a register is waiting on a key it receives this one and execution resumes
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) -> Result<()> {
        let index = Self::key_index(key)?;
        self.state.pressed_keys[index] = true;
        if let Some(register) = self.state.register_needing_key.take() {
            log::debug!("V{:X} received key {:X}", register, key);
            self.state.v[register] = key;
        }
        Ok(())
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) -> Result<()> {
        let index = Self::key_index(key)?;
        self.state.pressed_keys[index] = false;
        Ok(())
    }

    fn key_index(key: u8) -> Result<usize> {
        let index = usize::from(key);
        if index < KEY_COUNT {
            Ok(index)
        } else {
            Err(Chip8Error::InvalidKey { key })
        }
    }

    /// Advances the CPU by a single instruction
    /// - does nothing while awaiting a keypress
    /// - pauses once on a breakpoint before running the instruction under it
    /// - gets and executes the next opcode
    ///
    /// Errors leave the pc past the offending instruction.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.state.register_needing_key.is_some() {
            return Ok(StepOutcome::WaitingForKey);
        }

        let address = self.state.pc;
        if self.breakpoints.contains(&address) && self.last_break != Some(address) {
            log::debug!("paused at breakpoint {:#05X}", address);
            self.last_break = Some(address);
            return Ok(StepOutcome::PausedAtBreakpoint(address));
        }

        let raw = self.get_op()?;
        self.state.pc = address.wrapping_add(0x2);

        let op = Opcode::from(raw);
        log::trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            raw,
            self.state.v,
            self.state.i,
            address
        );
        let instruction = from_op(&op).ok_or_else(|| {
            log::warn!("invalid opcode {:04X} at {:#05X}", raw, address);
            Chip8Error::InvalidOpcode { address, raw }
        })?;

        let result = instruction.execute(&op, &mut self.state, &mut self.frame_buffer);
        debug_assert!(
            !matches!(result, Err(Chip8Error::InvalidOpcodeContents { .. })),
            "fetched opcode {:04X} is missing operands",
            raw
        );
        if let Err(error) = result {
            log::warn!("{:04X} at {:#05X} failed: {}", raw, address, error);
            return Err(error);
        }

        self.last_break = None;
        if self.state.register_needing_key.is_some() {
            Ok(StepOutcome::WaitingForKey)
        } else {
            Ok(StepOutcome::Executed)
        }
    }

    /// Decrements the delay timer, stopping at 0
    pub fn tick_delay_timer(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
    }

    /// Decrements the sound timer, stopping at 0
    pub fn tick_sound_timer(&mut self) {
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// One 60Hz tick of both timers
    pub fn tick_timers(&mut self) {
        self.tick_delay_timer();
        self.tick_sound_timer();
    }

    pub fn set_breakpoint(&mut self, address: u16) {
        self.breakpoints.insert(address);
    }

    pub fn clear_breakpoint(&mut self, address: u16) {
        self.breakpoints.remove(&address);
        if self.last_break == Some(address) {
            self.last_break = None;
        }
    }

    /// Flips the breakpoint at `address`, returning whether one is now set
    pub fn toggle_breakpoint(&mut self, address: u16) -> bool {
        if self.breakpoints.contains(&address) {
            self.clear_breakpoint(address);
            false
        } else {
            self.set_breakpoint(address);
            true
        }
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = u16> + '_ {
        self.breakpoints.iter().copied()
    }

    /// A copy of the display
    pub fn frame_buffer_snapshot(&self) -> Frame {
        self.frame_buffer.snapshot()
    }

    /// Returns the frame if the display should be redrawn
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.frame_buffer.take_frame()
    }

    pub fn register_snapshot(&self) -> Registers {
        Registers {
            v: self.state.v,
            i: self.state.i,
            pc: self.state.pc,
            sp: self.state.sp,
            delay_timer: self.state.delay_timer,
            sound_timer: self.state.sound_timer,
            stack: self.state.stack,
        }
    }

    /// Disassembles the loaded ROM
    pub fn disassembly(&self) -> Disassembler<'_> {
        disassemble(&self.rom)
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> Result<u16> {
        let pc = self.state.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds { address: pc + 1 });
        }
        let left = u16::from(self.state.memory[pc]);
        let right = u16::from(self.state.memory[pc + 1]);
        Ok(left << 8 | right)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
