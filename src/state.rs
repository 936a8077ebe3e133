use crate::constants::{
    KEY_COUNT, MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::{Chip8Error, Result};
use crate::quirks::Quirks;

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) a 8-bit stack pointer; it points at the most recently pushed address
///
/// Timers
/// - 2 8-bit timers (delay & sound), counted down by the host
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the sprite sheet
///     - 0x200.. holds the loaded ROM
///
/// ## Input
/// - the pressed status of keys 0..F
/// - while `register_needing_key` is set, execution is parked until a key is pressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub pressed_keys: [bool; KEY_COUNT],
    pub register_needing_key: Option<usize>,
    pub quirks: Quirks,
}

impl State {
    pub fn new() -> Self {
        Self::with_quirks(Quirks::default())
    }

    pub fn with_quirks(quirks: Quirks) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            pressed_keys: [false; KEY_COUNT],
            register_needing_key: None,
            quirks,
        }
    }

    /// Resets the CPU and copies `rom` into program memory.
    ///
    /// The sprite sheet and pressed keys survive; everything else the program could
    /// have touched is zeroed. Nothing changes if the ROM doesn't fit.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.memory[start..].iter_mut().for_each(|byte| *byte = 0);
        self.memory[start..start + rom.len()].copy_from_slice(rom);

        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack = [0; STACK_SIZE];
        self.register_needing_key = None;
        Ok(())
    }

    /// Checks that `len` bytes starting at `start` are all addressable.
    pub fn check_memory(&self, start: usize, len: usize) -> Result<()> {
        match (start + len).checked_sub(1) {
            Some(last) if last >= MEMORY_SIZE => Err(Chip8Error::MemoryOutOfBounds { address: last }),
            _ => Ok(()),
        }
    }

    /// Whether the key named by a register value is held down.
    /// Values past the end of the keypad are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys
            .get(usize::from(key))
            .copied()
            .unwrap_or(false)
    }

    /// The lowest key index that is held down
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.pressed_keys
            .iter()
            .position(|&pressed| pressed)
            .map(|key| key as u8)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_sprite_sheet() {
        let state = State::new();
        assert_eq!(state.memory[0..80], SPRITE_SHEET[..]);
        assert_eq!(state.pc, PROGRAM_START);
    }

    #[test]
    fn test_load_program_resets_cpu() {
        let mut state = State::new();
        state.v[0x3] = 0x42;
        state.i = 0x300;
        state.sp = 0x2;
        state.delay_timer = 0x10;
        state.sound_timer = 0x20;
        state.pc = 0x400;
        state.register_needing_key = Some(0x1);

        state.load_program(&[0x00, 0xE0]).unwrap();

        assert_eq!(state.v, [0; 16]);
        assert_eq!(state.i, 0);
        assert_eq!(state.sp, 0);
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
        assert_eq!(state.pc, PROGRAM_START);
        assert_eq!(state.register_needing_key, None);
        assert_eq!(state.memory[0x200..0x202], [0x00, 0xE0]);
    }

    #[test]
    fn test_load_program_clears_previous_rom() {
        let mut state = State::new();
        state.load_program(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        state.load_program(&[0x55]).unwrap();
        assert_eq!(state.memory[0x200..0x204], [0x55, 0x00, 0x00, 0x00]);
        assert_eq!(state.memory[0..80], SPRITE_SHEET[..]);
    }

    #[test]
    fn test_load_program_fills_memory() {
        let mut state = State::new();
        let rom = vec![0xAB; MAX_ROM_SIZE];
        state.load_program(&rom).unwrap();
        assert_eq!(state.memory[MEMORY_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_program_rejects_oversized_rom() {
        let mut state = State::new();
        state.v[0x1] = 0x1;
        let rom = vec![0; MAX_ROM_SIZE + 1];
        let result = state.load_program(&rom);
        assert!(matches!(
            result,
            Err(Chip8Error::RomTooLarge { size, max }) if size == MAX_ROM_SIZE + 1 && max == MAX_ROM_SIZE
        ));
        assert_eq!(state.v[0x1], 0x1);
    }

    #[test]
    fn test_check_memory() {
        let state = State::new();
        assert!(state.check_memory(0xFFD, 3).is_ok());
        assert!(matches!(
            state.check_memory(0xFFE, 3),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(state.check_memory(0x1000, 0).is_ok());
    }

    #[test]
    fn test_is_pressed_ignores_keys_off_the_keypad() {
        let mut state = State::new();
        state.pressed_keys[0xF] = true;
        assert!(state.is_pressed(0xF));
        assert!(!state.is_pressed(0x1F));
    }

    #[test]
    fn test_first_pressed_key() {
        let mut state = State::new();
        assert_eq!(state.first_pressed_key(), None);
        state.pressed_keys[0xC] = true;
        state.pressed_keys[0x3] = true;
        assert_eq!(state.first_pressed_key(), Some(0x3));
    }
}
