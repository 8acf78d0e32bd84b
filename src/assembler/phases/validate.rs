use super::types::Loc;
use crate::assembler::model::{
    self, LiteralError, ParsedOperand, RawLine, ValidatedLine, REGISTER_SIGIL,
};
use crate::isa::{
    types::hw::{self, RegIdx, Word},
    OperandKind, Schema,
};
use derive_more::Constructor;
use std::{convert::TryFrom, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RegisterDefect {
    #[strum(serialize = "expected 'R' followed by a register index")]
    MissingSigil,
    #[strum(serialize = "register index is not a decimal numeral")]
    Malformed,
    #[strum(serialize = "register index must be between 0 and 15")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateDefect {
    /// Not a decimal, `0b`-binary or `0x`-hex numeral.
    Malformed,
    /// A numeral whose value needs more bits than the field has.
    Overflow,
}

/// Operand positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownMnemonic(String),
    OperandCountMismatch {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    InvalidRegister {
        position: usize,
        token: String,
        defect: RegisterDefect,
    },
    InvalidImmediate {
        position: usize,
        token: String,
        width: usize,
        defect: ImmediateDefect,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownMnemonic(name) => write!(f, "Unknown operation '{}'", name),
            Error::OperandCountMismatch {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "Incorrect number of operands for '{}': expected {}, found {}",
                mnemonic, expected, found
            ),
            Error::InvalidRegister {
                position,
                token,
                defect,
            } => write!(
                f,
                "Invalid register '{}' for operand {}: {}",
                token, position, defect
            ),
            Error::InvalidImmediate {
                position,
                token,
                defect: ImmediateDefect::Malformed,
                ..
            } => write!(
                f,
                "Invalid immediate '{}' for operand {}: expected a decimal, 0b-binary or \
                 0x-hex numeral",
                token, position
            ),
            Error::InvalidImmediate {
                position,
                token,
                width,
                defect: ImmediateDefect::Overflow,
            } => write!(
                f,
                "Immediate '{}' for operand {} exceeds expected length of {} bits",
                token, position, width
            ),
        }
    }
}

/// A defect found on one line, together with the line as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Diagnostic {
    pub loc: Loc,
    pub line: String,
    pub error: Error,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}: {}, in line: {}", self.loc, self.error, self.line)
    }
}

fn parse_register(raw: &str) -> Result<RegIdx, RegisterDefect> {
    let digits = raw
        .strip_prefix(REGISTER_SIGIL)
        .ok_or(RegisterDefect::MissingSigil)?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RegisterDefect::Malformed);
    }

    digits
        .parse::<u64>()
        .ok()
        .filter(|&idx| idx < hw::REGISTER_COUNT as u64)
        .and_then(|idx| RegIdx::try_from(idx).ok())
        .ok_or(RegisterDefect::OutOfRange)
}

fn parse_immediate(raw: &str, width: usize) -> Result<ParsedOperand, ImmediateDefect> {
    let lit = model::parse_literal(raw).map_err(|err| match err {
        LiteralError::Malformed => ImmediateDefect::Malformed,
        LiteralError::TooLarge => ImmediateDefect::Overflow,
    })?;

    if !hw::fits_in(lit.value, width) {
        return Err(ImmediateDefect::Overflow);
    }

    Word::try_from(lit.value)
        .map(|value| ParsedOperand::Immediate {
            value,
            radix: lit.radix,
        })
        .map_err(|_| ImmediateDefect::Overflow)
}

fn parse_operand(kind: OperandKind, position: usize, raw: &str) -> Result<ParsedOperand, Error> {
    match kind {
        OperandKind::Register => {
            parse_register(raw)
                .map(ParsedOperand::Register)
                .map_err(|defect| Error::InvalidRegister {
                    position,
                    token: raw.to_owned(),
                    defect,
                })
        }
        OperandKind::Immediate(width) => {
            parse_immediate(raw, width).map_err(|defect| Error::InvalidImmediate {
                position,
                token: raw.to_owned(),
                width,
                defect,
            })
        }
    }
}

/// Checks one line against the schema. The mnemonic is checked first, then the
/// operand count, then every operand from left to right; all operand defects
/// are reported, not just the first.
pub fn validate_line<'s>(schema: &'s Schema, line: &RawLine) -> Result<ValidatedLine<'s>, Vec<Error>> {
    let mut tokens = line.tokens();
    let mnemonic = tokens.next().unwrap_or_default();

    let def = schema
        .lookup(mnemonic)
        .ok_or_else(|| vec![Error::UnknownMnemonic(mnemonic.to_owned())])?;

    let args = tokens.collect::<Vec<_>>();
    if args.len() != def.arity() {
        return Err(vec![Error::OperandCountMismatch {
            mnemonic: mnemonic.to_owned(),
            expected: def.arity(),
            found: args.len(),
        }]);
    }

    let mut operands = Vec::with_capacity(args.len());
    let mut errors = Vec::new();
    for (idx, (kind, raw)) in def.operands.iter().zip(args).enumerate() {
        match parse_operand(*kind, idx + 1, raw) {
            Ok(op) => operands.push(op),
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedLine {
        loc: line.loc(),
        def,
        operands,
    })
}

/// Validates every line of a unit. Either all lines pass, or every defect of
/// every line is returned in source order.
pub fn validate<'s>(
    schema: &'s Schema,
    lines: &[RawLine],
) -> Result<Vec<ValidatedLine<'s>>, Vec<Diagnostic>> {
    let mut validated = Vec::with_capacity(lines.len());
    let mut diagnostics = Vec::new();

    for line in lines {
        match validate_line(schema, line) {
            Ok(ok) => validated.push(ok),
            Err(errs) => diagnostics.extend(
                errs.into_iter()
                    .map(|err| Diagnostic::new(line.loc(), line.original().to_owned(), err)),
            ),
        }
    }

    if diagnostics.is_empty() {
        Ok(validated)
    } else {
        Err(diagnostics)
    }
}
