use super::hw::{self, Word};
use crate::assembler::{
    model::{self, Literal},
    phases::{
        normalize,
        types::{Loc, Located},
    },
};
use crate::isa::defs;
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::{collections::HashMap, convert::TryFrom, fmt::Display, str::FromStr};

static BUILTIN: Lazy<Schema> = Lazy::new(|| {
    let mut builder = Builder::new();
    defs::inst::register(&mut builder);
    builder.build()
});

/// The kind of an operand slot, as declared by an `InstDef`.
///
/// Registers always occupy `hw::REGISTER_WIDTH` bits; immediates carry the
/// width of their field, which may differ between positions of the same
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Register,
    Immediate(usize),
}

impl OperandKind {
    const REGISTER_CODE: &'static str = "R";
    const IMMEDIATE_CODE: &'static str = "I";

    pub fn width(&self) -> usize {
        match self {
            OperandKind::Register => hw::REGISTER_WIDTH,
            OperandKind::Immediate(width) => *width,
        }
    }
}

impl Display for OperandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandKind::Register => write!(f, "{}", OperandKind::REGISTER_CODE),
            OperandKind::Immediate(width) => write!(f, "{}{}", OperandKind::IMMEDIATE_CODE, width),
        }
    }
}

impl FromStr for OperandKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == OperandKind::REGISTER_CODE {
            return Ok(OperandKind::Register);
        }

        s.strip_prefix(OperandKind::IMMEDIATE_CODE)
            .filter(|width| !width.is_empty() && width.chars().all(|c| c.is_ascii_digit()))
            .and_then(|width| width.parse().ok())
            .map(OperandKind::Immediate)
            .ok_or_else(|| Error::BadOperandKind(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstDef {
    pub mnemonic: String,
    pub opcode: Word,
    pub operands: Vec<OperandKind>,
}

impl InstDef {
    pub fn new(mnemonic: &str, opcode: Word, operands: Vec<OperandKind>) -> Self {
        InstDef {
            mnemonic: mnemonic.to_owned(),
            opcode,
            operands,
        }
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    /// Total encoded length in bits: the opcode field followed by every operand field.
    ///
    /// Saturates, so a table declaring absurd field widths still reads as too wide.
    pub fn width(&self) -> usize {
        self.operands
            .iter()
            .map(OperandKind::width)
            .fold(hw::OPCODE_WIDTH, usize::saturating_add)
    }
}

impl Display for InstDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:0width$b} [{}]",
            self.mnemonic,
            self.opcode,
            self.operands.iter().join(", "),
            width = hw::OPCODE_WIDTH
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    OpcodeOutOfRange(String, Word),
    DuplicateMnemonic(String),
    DuplicateOpcode(Word, String, String),
    ZeroWidthImmediate(String),
    TooWide(String, usize),
    MissingOpcode(String),
    BadOpcode(String),
    BadOperandKind(String),
    Empty,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OpcodeOutOfRange(name, opcode) => write!(
                f,
                "Opcode {} of '{}' does not fit in {} bits",
                opcode,
                name,
                hw::OPCODE_WIDTH
            ),
            Error::DuplicateMnemonic(name) => write!(f, "Mnemonic '{}' is defined twice", name),
            Error::DuplicateOpcode(opcode, first, second) => write!(
                f,
                "Opcode {:0width$b} is shared by '{}' and '{}'",
                opcode,
                first,
                second,
                width = hw::OPCODE_WIDTH
            ),
            Error::ZeroWidthImmediate(name) => {
                write!(f, "Instruction '{}' declares a zero-width immediate", name)
            }
            Error::TooWide(name, width) => write!(
                f,
                "Instruction '{}' encodes to {} bits, more than the {}-bit word",
                name,
                width,
                hw::WORD_WIDTH
            ),
            Error::MissingOpcode(name) => write!(f, "Instruction '{}' has no opcode", name),
            Error::BadOpcode(raw) => write!(f, "Malformed opcode '{}'", raw),
            Error::BadOperandKind(raw) => write!(
                f,
                "Malformed operand kind '{}', expected '{}' or '{}<width>'",
                raw,
                OperandKind::REGISTER_CODE,
                OperandKind::IMMEDIATE_CODE
            ),
            Error::Empty => write!(f, "Instruction set defines no instructions"),
        }
    }
}

/// An immutable mnemonic table. Lookups are case-sensitive.
#[derive(Debug, Clone)]
pub struct Schema {
    defs: Vec<InstDef>,
    by_mnemonic: HashMap<String, usize>,
    by_opcode: [Option<usize>; hw::OPCODE_COUNT],
}

impl Schema {
    /// The instruction set the processor is built around.
    pub fn builtin() -> &'static Schema {
        Lazy::force(&BUILTIN)
    }

    /// Loads an instruction set from a table of `MNEMONIC OPCODE KIND...` lines.
    pub fn parse(source: &str) -> Result<Schema, Located<Error>> {
        let mut builder = Builder::new();
        for line in normalize::normalize(source) {
            let loc = line.loc();
            builder
                .register(Schema::parse_def(line.text()).map_err(|err| Located::with_loc(loc, err))?)
                .map_err(|err| Located::with_loc(loc, err))?;
        }

        if builder.schema.defs.is_empty() {
            return Err(Located::with_loc(Loc::new(0), Error::Empty));
        }

        Ok(builder.build())
    }

    fn parse_def(text: &str) -> Result<InstDef, Error> {
        let mut tokens = text.split_whitespace();
        let mnemonic = tokens.next().unwrap_or_default();
        let raw_opcode = tokens
            .next()
            .ok_or_else(|| Error::MissingOpcode(mnemonic.to_owned()))?;

        let opcode = model::parse_literal(raw_opcode)
            .ok()
            .and_then(|Literal { value, .. }| Word::try_from(value).ok())
            .ok_or_else(|| Error::BadOpcode(raw_opcode.to_owned()))?;

        let operands = tokens
            .map(str::parse::<OperandKind>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InstDef::new(mnemonic, opcode, operands))
    }

    pub fn lookup(&self, mnemonic: &str) -> Option<&InstDef> {
        self.by_mnemonic.get(mnemonic).map(|&idx| &self.defs[idx])
    }

    pub fn lookup_opcode(&self, opcode: Word) -> Option<&InstDef> {
        self.by_opcode
            .get(opcode as usize)
            .copied()
            .flatten()
            .map(|idx| &self.defs[idx])
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InstDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

pub struct Builder {
    schema: Schema,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            schema: Schema {
                defs: Vec::new(),
                by_mnemonic: HashMap::new(),
                by_opcode: [None; hw::OPCODE_COUNT],
            },
        }
    }

    pub fn build(self) -> Schema {
        self.schema
    }

    pub fn register(&mut self, def: InstDef) -> Result<(), Error> {
        if def.opcode as usize >= hw::OPCODE_COUNT {
            return Err(Error::OpcodeOutOfRange(def.mnemonic, def.opcode));
        }

        if self.schema.by_mnemonic.contains_key(&def.mnemonic) {
            return Err(Error::DuplicateMnemonic(def.mnemonic));
        }

        if let Some(other) = self.schema.lookup_opcode(def.opcode) {
            return Err(Error::DuplicateOpcode(
                def.opcode,
                other.mnemonic.clone(),
                def.mnemonic,
            ));
        }

        if def.operands.contains(&OperandKind::Immediate(0)) {
            return Err(Error::ZeroWidthImmediate(def.mnemonic));
        }

        if def.width() > hw::WORD_WIDTH {
            let width = def.width();
            return Err(Error::TooWide(def.mnemonic, width));
        }

        let idx = self.schema.defs.len();
        self.schema.by_mnemonic.insert(def.mnemonic.clone(), idx);
        self.schema.by_opcode[def.opcode as usize] = Some(idx);
        self.schema.defs.push(def);
        Ok(())
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_complete() {
        let schema = Schema::builtin();
        assert_eq!(schema.len(), hw::OPCODE_COUNT);
        for opcode in 0..hw::OPCODE_COUNT as Word {
            assert!(schema.lookup_opcode(opcode).is_some());
        }
        assert!(schema.iter().all(|def| def.width() <= hw::WORD_WIDTH));
    }

    #[test]
    fn builtin_shapes() {
        let schema = Schema::builtin();

        let loadi = schema.lookup("LOADI").unwrap();
        assert_eq!(loadi.opcode, 0b0110);
        assert_eq!(
            loadi.operands,
            vec![OperandKind::Register, OperandKind::Immediate(8)]
        );

        let shl = schema.lookup("SHL").unwrap();
        assert_eq!(shl.width(), 16);
        assert_eq!(shl.operands[2], OperandKind::Immediate(1));
        assert_eq!(shl.operands[3], OperandKind::Immediate(3));

        assert_eq!(schema.lookup("CMP").unwrap().width(), 12);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(Schema::builtin().lookup("ADD").is_some());
        assert!(Schema::builtin().lookup("add").is_none());
    }

    #[test]
    fn operand_kind_codes() {
        assert_eq!("R".parse(), Ok(OperandKind::Register));
        assert_eq!("I12".parse(), Ok(OperandKind::Immediate(12)));
        assert_eq!(
            "I".parse::<OperandKind>(),
            Err(Error::BadOperandKind("I".to_owned()))
        );
        assert_eq!(
            "X4".parse::<OperandKind>(),
            Err(Error::BadOperandKind("X4".to_owned()))
        );
        assert_eq!(OperandKind::Immediate(3).to_string(), "I3");
    }

    #[test]
    fn builder_rejects_collisions() {
        let mut builder = Builder::new();
        builder
            .register(InstDef::new("NOP", 0, vec![]))
            .unwrap();
        assert_eq!(
            builder.register(InstDef::new("NOP", 1, vec![])),
            Err(Error::DuplicateMnemonic("NOP".to_owned()))
        );
        assert_eq!(
            builder.register(InstDef::new("HLT", 0, vec![])),
            Err(Error::DuplicateOpcode(0, "NOP".to_owned(), "HLT".to_owned()))
        );
    }

    #[test]
    fn builder_rejects_bad_shapes() {
        let mut builder = Builder::new();
        assert_eq!(
            builder.register(InstDef::new("BIG", 16, vec![])),
            Err(Error::OpcodeOutOfRange("BIG".to_owned(), 16))
        );
        assert_eq!(
            builder.register(InstDef::new("NIL", 1, vec![OperandKind::Immediate(0)])),
            Err(Error::ZeroWidthImmediate("NIL".to_owned()))
        );
        assert_eq!(
            builder.register(InstDef::new(
                "WIDE",
                2,
                vec![OperandKind::Register, OperandKind::Immediate(9)]
            )),
            Err(Error::TooWide("WIDE".to_owned(), 17))
        );
        assert!(builder.build().is_empty());
    }

    #[test]
    fn parse_table() {
        let schema = Schema::parse(
            "# a tiny instruction set\n\
             MOV  0b0000 R, R\n\
             LDI  0x1    R, I8   // load immediate\n\
             HALT 15\n",
        )
        .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema.lookup("LDI").unwrap().opcode, 1);
        assert_eq!(schema.lookup_opcode(15).unwrap().mnemonic, "HALT");
        assert_eq!(schema.lookup("MOV").unwrap().width(), 12);
    }

    #[test]
    fn parse_table_errors() {
        let err = Schema::parse("MOV 0 R R\nLDI\n").unwrap_err();
        assert_eq!(err.loc(), Loc::new(2));
        assert_eq!(err.value(), Error::MissingOpcode("LDI".to_owned()));

        let err = Schema::parse("MOV 0b2 R R\n").unwrap_err();
        assert_eq!(err.value(), Error::BadOpcode("0b2".to_owned()));

        let err = Schema::parse("MOV 0 R Q\n").unwrap_err();
        assert_eq!(err.value(), Error::BadOperandKind("Q".to_owned()));

        let err = Schema::parse("# nothing here\n").unwrap_err();
        assert_eq!(err.value(), Error::Empty);
    }

    #[test]
    fn parse_table_huge_widths() {
        let err = Schema::parse("BIG 0 I18446744073709551615\n").unwrap_err();
        assert_eq!(err.value(), Error::TooWide("BIG".to_owned(), usize::MAX));

        let err =
            Schema::parse("BIG 0 I9223372036854775808 I9223372036854775808 I4\n").unwrap_err();
        assert_eq!(err.value(), Error::TooWide("BIG".to_owned(), usize::MAX));

        let err = Schema::parse("MOV 0 R R\nBIG 1 I13\n").unwrap_err();
        assert_eq!(err.loc(), Loc::new(2));
        assert_eq!(err.value(), Error::TooWide("BIG".to_owned(), 17));
    }
}
