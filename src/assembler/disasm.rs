use super::{
    model::{EncodedInstruction, ParsedOperand, Radix},
    phases::{
        normalize,
        types::Located,
    },
};
use crate::isa::{
    types::hw::{self, RegIdx, Word},
    InstDef, OperandKind, Schema,
};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Malformed(String),
    UnknownOpcode(Word),
    WidthMismatch {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Malformed(raw) => write!(
                f,
                "Malformed instruction '{}', expected {} to {} binary digits",
                raw,
                hw::OPCODE_WIDTH,
                hw::WORD_WIDTH
            ),
            Error::UnknownOpcode(opcode) => write!(
                f,
                "No instruction has opcode {:0width$b}",
                opcode,
                width = hw::OPCODE_WIDTH
            ),
            Error::WidthMismatch {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "Instruction '{}' encodes to {} bits, found {}",
                mnemonic, expected, found
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembled<'s> {
    pub def: &'s InstDef,
    pub operands: Vec<ParsedOperand>,
}

impl<'s> Display for Disassembled<'s> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.def.mnemonic)?;
        for op in &self.operands {
            write!(f, " {}", op)?;
        }
        Ok(())
    }
}

/// Splits `width` low bits of `bits` back into an opcode and operand fields.
pub fn decode_bits(schema: &Schema, bits: Word, width: usize) -> Result<Disassembled<'_>, Error> {
    if width < hw::OPCODE_WIDTH || width > hw::WORD_WIDTH {
        return Err(Error::Malformed(format!("{:0width$b}", bits, width = width)));
    }

    let opcode = bits >> (width - hw::OPCODE_WIDTH);
    let def = schema
        .lookup_opcode(opcode)
        .ok_or(Error::UnknownOpcode(opcode))?;

    if def.width() != width {
        return Err(Error::WidthMismatch {
            mnemonic: def.mnemonic.clone(),
            expected: def.width(),
            found: width,
        });
    }

    let mut offset = width - hw::OPCODE_WIDTH;
    let operands = def
        .operands
        .iter()
        .map(|kind| {
            offset -= kind.width();
            let field = (bits >> offset) & hw::mask(kind.width());
            match kind {
                OperandKind::Register => ParsedOperand::Register(field as RegIdx),
                OperandKind::Immediate(_) => ParsedOperand::Immediate {
                    value: field,
                    radix: Radix::Decimal,
                },
            }
        })
        .collect();

    Ok(Disassembled { def, operands })
}

pub fn decode_instruction<'s>(
    schema: &'s Schema,
    inst: &EncodedInstruction,
) -> Result<Disassembled<'s>, Error> {
    decode_bits(schema, inst.bits(), inst.width())
}

/// Decodes one line of `0`/`1` characters.
pub fn decode<'s>(schema: &'s Schema, raw: &str) -> Result<Disassembled<'s>, Error> {
    let raw = raw.trim();
    if raw.len() < hw::OPCODE_WIDTH
        || raw.len() > hw::WORD_WIDTH
        || !raw.chars().all(|c| c == '0' || c == '1')
    {
        return Err(Error::Malformed(raw.to_owned()));
    }

    let bits = Word::from_str_radix(raw, 2).map_err(|_| Error::Malformed(raw.to_owned()))?;
    decode_bits(schema, bits, raw.len())
}

/// Decodes a listing of one instruction per line, stopping at the first bad line.
pub fn disassemble<'s>(
    schema: &'s Schema,
    source: &str,
) -> Result<Vec<Disassembled<'s>>, Located<Error>> {
    normalize::normalize(source)
        .iter()
        .map(|line| decode(schema, line.text()).map_err(|err| Located::with_loc(line.loc(), err)))
        .collect()
}
