use crate::constants::{FLAG_REGISTER, SPRITE_BYTES, STACK_SIZE};
use crate::error::{Chip8Error, Result};
use crate::frame_buffer::FrameBuffer;
use crate::opcode::Opcode;
use crate::state::State;

// Handlers run after the driver has already moved the pc past the instruction,
// so `state.pc` is the address of the *next* instruction. Skips add another 2.

fn missing(op: &Opcode) -> Chip8Error {
    Chip8Error::InvalidOpcodeContents { opcode: *op }
}

fn x(op: &Opcode) -> Result<usize> {
    op.x().ok_or_else(|| missing(op))
}

fn y(op: &Opcode) -> Result<usize> {
    op.y().ok_or_else(|| missing(op))
}

fn kk(op: &Opcode) -> Result<u8> {
    op.kk().ok_or_else(|| missing(op))
}

fn n(op: &Opcode) -> Result<u8> {
    op.n().ok_or_else(|| missing(op))
}

fn addr(op: &Opcode) -> Result<u16> {
    op.addr().ok_or_else(|| missing(op))
}

fn skip_if(state: &mut State, condition: bool) {
    if condition {
        state.pc = state.pc.wrapping_add(0x2);
    }
}

/// machine code routine at addr; not supported by interpreters
pub fn sys(op: &Opcode, _state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let raw = op.raw().ok_or_else(|| missing(op))?;
    Err(Chip8Error::OpcodeNotImplemented { raw })
}

/// clear
pub fn clr(_op: &Opcode, _state: &mut State, frame_buffer: &mut FrameBuffer) -> Result<()> {
    frame_buffer.clear();
    Ok(())
}

/// PC = STACK.pop()
pub fn rts(_op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let pc = state.pc.wrapping_sub(0x2);
    let sp = state.sp as usize;
    if sp == 0 {
        return Err(Chip8Error::StackUnderflow { pc });
    }
    if sp >= STACK_SIZE {
        return Err(Chip8Error::StackOverflow { pc });
    }
    state.pc = state.stack[sp];
    state.sp -= 0x1;
    Ok(())
}

/// PC = addr
pub fn jump(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    state.pc = addr(op)?;
    Ok(())
}

/// STACK.push(PC); PC = addr
pub fn call(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let target = addr(op)?;
    let sp = state.sp as usize + 0x1;
    if sp >= STACK_SIZE {
        return Err(Chip8Error::StackOverflow {
            pc: state.pc.wrapping_sub(0x2),
        });
    }
    state.sp = sp as u8;
    state.stack[sp] = state.pc;
    state.pc = target;
    Ok(())
}

/// if Vx == kk then pc += 2
pub fn ske(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, kk) = (x(op)?, kk(op)?);
    let condition = state.v[x] == kk;
    skip_if(state, condition);
    Ok(())
}

/// if Vx != kk then pc += 2
pub fn skne(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, kk) = (x(op)?, kk(op)?);
    let condition = state.v[x] != kk;
    skip_if(state, condition);
    Ok(())
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    let condition = state.v[x] == state.v[y];
    skip_if(state, condition);
    Ok(())
}

/// Vx = kk
pub fn load(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, kk) = (x(op)?, kk(op)?);
    state.v[x] = kk;
    Ok(())
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it, VF is left alone
pub fn add(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, kk) = (x(op)?, kk(op)?);
    state.v[x] = state.v[x].wrapping_add(kk);
    Ok(())
}

/// Vx = Vy
pub fn mv(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    state.v[x] = state.v[y];
    Ok(())
}

/// Vx |= Vy
pub fn or(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    state.v[x] |= state.v[y];
    Ok(())
}

/// Vx &= Vy
pub fn and(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    state.v[x] &= state.v[y];
    Ok(())
}

/// Vx ^= Vy
pub fn xor(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    state.v[x] ^= state.v[y];
    Ok(())
}

/// Vx += Vy; VF = overflow
pub fn addr_reg(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    let (res, over) = state.v[x].overflowing_add(state.v[y]);
    state.v[FLAG_REGISTER] = u8::from(over);
    state.v[x] = res;
    Ok(())
}

/// Vx -= Vy; VF = !borrow
pub fn sub(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    let (vx, vy) = (state.v[x], state.v[y]);
    state.v[FLAG_REGISTER] = u8::from(state.quirks.borrow_flag.not_borrow(vx, vy));
    state.v[x] = vx.wrapping_sub(vy);
    Ok(())
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let source = if state.quirks.shift_reads_vy {
        state.v[y(op)?]
    } else {
        state.v[x]
    };
    state.v[FLAG_REGISTER] = source & 0x1;
    state.v[x] = source >> 1;
    Ok(())
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    let (vx, vy) = (state.v[x], state.v[y]);
    state.v[FLAG_REGISTER] = u8::from(state.quirks.borrow_flag.not_borrow(vy, vx));
    state.v[x] = vy.wrapping_sub(vx);
    Ok(())
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let source = if state.quirks.shift_reads_vy {
        state.v[y(op)?]
    } else {
        state.v[x]
    };
    state.v[FLAG_REGISTER] = (source & 0x80) >> 7;
    state.v[x] = source << 1;
    Ok(())
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y) = (x(op)?, y(op)?);
    let condition = state.v[x] != state.v[y];
    skip_if(state, condition);
    Ok(())
}

/// I = addr
pub fn loadi(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    state.i = addr(op)? & 0xFFF;
    Ok(())
}

/// PC = V0 + addr
pub fn jumpi(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    state.pc = (u16::from(state.v[0x0]) & 0xFFF) + addr(op)?;
    Ok(())
}

/// Vx = rand_byte & kk
pub fn rnd(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, kk) = (x(op)?, kk(op)?);
    let rand_byte: u8 = rand::random();
    state.v[x] = rand_byte & kk;
    Ok(())
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
pub fn draw(op: &Opcode, state: &mut State, frame_buffer: &mut FrameBuffer) -> Result<()> {
    let (x, y, n) = (x(op)?, y(op)?, n(op)?);
    let start = state.i as usize;
    state.check_memory(start, n as usize)?;

    let origin_x = state.v[x] as usize;
    let origin_y = state.v[y] as usize;
    let mut collision = false;

    for (row, sprite) in state.memory[start..start + n as usize].iter().enumerate() {
        for bit in 0..8 {
            if (sprite >> (7 - bit)) & 0x1 == 0x1 {
                collision |= frame_buffer.set_pixel(origin_x + bit, origin_y + row);
            }
        }
    }

    state.v[FLAG_REGISTER] = u8::from(collision);
    Ok(())
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let condition = state.is_pressed(state.v[x]);
    skip_if(state, condition);
    Ok(())
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let condition = !state.is_pressed(state.v[x]);
    skip_if(state, condition);
    Ok(())
}

/// Vx = DT
pub fn moved(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    state.v[x] = state.delay_timer;
    Ok(())
}

/// Vx = the lowest pressed key, or await a keypress for Vx
pub fn keyd(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    match state.first_pressed_key() {
        Some(key) => state.v[x] = key,
        None => {
            log::debug!("V{:X} is waiting for a key", x);
            state.register_needing_key = Some(x);
        }
    }
    Ok(())
}

/// DT = Vx
pub fn loadd(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    state.delay_timer = state.v[x(op)?];
    Ok(())
}

/// ST = Vx
pub fn loads(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    state.sound_timer = state.v[x(op)?];
    Ok(())
}

/// I += Vx
pub fn addi(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    state.i = state.i.wrapping_add(u16::from(state.v[x]));
    Ok(())
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    state.i = u16::from(state.v[x]) * SPRITE_BYTES;
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let start = state.i as usize;
    state.check_memory(start, 3)?;

    let value = state.v[x];
    let bcd = [value / 100 % 10, value / 10 % 10, value % 10];
    state.memory[start..start + 3].copy_from_slice(&bcd);
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx
/// Fill memory starting at address i with V0..=Vx; i is left alone
pub fn stor(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let start = state.i as usize;
    state.check_memory(start, x + 1)?;

    state.memory[start..=start + x].copy_from_slice(&state.v[0x0..=x]);
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]
/// Fill V0..=Vx with memory starting at address i; i is left alone
pub fn read(op: &Opcode, state: &mut State, _frame_buffer: &mut FrameBuffer) -> Result<()> {
    let x = x(op)?;
    let start = state.i as usize;
    state.check_memory(start, x + 1)?;

    state.v[0x0..=x].copy_from_slice(&state.memory[start..=start + x]);
    Ok(())
}
