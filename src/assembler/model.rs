use super::phases::types::Loc;
use crate::isa::{
    types::hw::{RegIdx, Word},
    InstDef,
};
use derive_more::Constructor;
use std::{fmt::Display, num::IntErrorKind};
use strum_macros::EnumIter;

/*
    The values flowing through the assembler, one per source line:

        1.  `RawLine`: a line of source with comments and separators removed. Never empty.

        2.  `ValidatedLine`: a `RawLine` which has been checked against an `InstDef`, holding
            the decoded `ParsedOperand`s. Only the validator constructs these, so holding one
            is proof that the line is well formed.

        3.  `EncodedInstruction`: the packed bits of a `ValidatedLine`.

    Nothing is carried between lines.
*/

pub const REGISTER_SIGIL: char = 'R';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, EnumIter)]
pub enum Radix {
    #[strum(serialize = "decimal")]
    Decimal,
    #[strum(serialize = "binary")]
    Binary,
    #[strum(serialize = "hex")]
    Hex,
}

impl Radix {
    pub fn prefix(&self) -> &'static str {
        match self {
            Radix::Decimal => "",
            Radix::Binary => "0b",
            Radix::Hex => "0x",
        }
    }

    pub fn base(&self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Binary => 2,
            Radix::Hex => 16,
        }
    }

    fn of_token(raw: &str) -> (Radix, &str) {
        for radix in &[Radix::Binary, Radix::Hex] {
            if let Some(digits) = raw.strip_prefix(radix.prefix()) {
                return (*radix, digits);
            }
        }
        (Radix::Decimal, raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct Literal {
    pub value: u64,
    pub radix: Radix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    /// Not a numeral in any accepted radix.
    Malformed,
    /// A well-formed numeral whose value does not fit in 64 bits.
    TooLarge,
}

/// Parses an unsigned numeric literal: a bare decimal numeral, `0b` followed by
/// binary digits, or `0x` followed by hexadecimal digits (of either case).
pub fn parse_literal(raw: &str) -> Result<Literal, LiteralError> {
    let (radix, digits) = Radix::of_token(raw);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix.base())) {
        return Err(LiteralError::Malformed);
    }

    u64::from_str_radix(digits, radix.base())
        .map(|value| Literal::new(value, radix))
        .map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => LiteralError::TooLarge,
            _ => LiteralError::Malformed,
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    loc: Loc,
    original: String,
    text: String,
}

impl RawLine {
    pub(crate) fn new(loc: Loc, original: &str, text: String) -> Self {
        debug_assert!(!text.is_empty());
        RawLine {
            loc,
            original: original.trim().to_owned(),
            text,
        }
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    /// The source line as written, for diagnostics.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

impl Display for RawLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedOperand {
    Register(RegIdx),
    /// The radix is kept for display only; encoding depends on `value` alone.
    Immediate { value: Word, radix: Radix },
}

impl ParsedOperand {
    pub fn value(&self) -> Word {
        match self {
            ParsedOperand::Register(idx) => Word::from(*idx),
            ParsedOperand::Immediate { value, .. } => *value,
        }
    }
}

impl Display for ParsedOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsedOperand::Register(idx) => write!(f, "{}{}", REGISTER_SIGIL, idx),
            ParsedOperand::Immediate { value, radix } => match radix {
                Radix::Decimal => write!(f, "{}", value),
                Radix::Binary => write!(f, "{}{:b}", radix.prefix(), value),
                Radix::Hex => write!(f, "{}{:X}", radix.prefix(), value),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine<'s> {
    pub(crate) loc: Loc,
    pub(crate) def: &'s InstDef,
    pub(crate) operands: Vec<ParsedOperand>,
}

impl<'s> ValidatedLine<'s> {
    pub fn loc(&self) -> Loc {
        self.loc
    }

    pub fn def(&self) -> &'s InstDef {
        self.def
    }

    pub fn operands(&self) -> &[ParsedOperand] {
        &self.operands
    }
}

/// A packed instruction: the low `width` bits of `bits`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedInstruction {
    bits: Word,
    width: usize,
}

impl EncodedInstruction {
    pub(crate) fn new(bits: Word, width: usize) -> Self {
        EncodedInstruction { bits, width }
    }

    pub fn bits(&self) -> Word {
        self.bits
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Display for EncodedInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.width)
    }
}
