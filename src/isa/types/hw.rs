use static_assertions::const_assert;

pub type Word = u16;

/// Index into the register file, as written after the `R` sigil.
pub type RegIdx = u8;

pub const WORD_WIDTH: usize = 16;
pub const OPCODE_WIDTH: usize = 4;
pub const REGISTER_WIDTH: usize = 4;

pub const OPCODE_COUNT: usize = 1 << OPCODE_WIDTH;
pub const REGISTER_COUNT: usize = 1 << REGISTER_WIDTH;

// The widest register-only form is the three-register ALU layout.
const_assert!(OPCODE_WIDTH + 3 * REGISTER_WIDTH <= WORD_WIDTH);
const_assert!(REGISTER_COUNT <= (std::u8::MAX as usize) + 1);

/// Returns `true` iff `val` can be written in an unsigned field of `width` bits.
pub fn fits_in(val: u64, width: usize) -> bool {
    width >= 64 || val >> width == 0
}

pub fn mask(width: usize) -> Word {
    if width >= WORD_WIDTH {
        Word::MAX
    } else {
        (1 << width) - 1
    }
}
