use crate::assembler::model::{EncodedInstruction, ValidatedLine};
use crate::isa::types::hw::{self, Word};

/// Packs a validated line: the opcode, then each operand field left to right.
///
/// Immediates are packed by value, so `10`, `0b1010` and `0xA` encode identically.
pub fn encode(line: &ValidatedLine<'_>) -> EncodedInstruction {
    let def = line.def();

    let bits = def
        .operands
        .iter()
        .zip(line.operands())
        .fold(u32::from(def.opcode), |acc, (kind, op)| {
            let width = kind.width();
            (acc << width) | u32::from(op.value() & hw::mask(width))
        });

    // The schema guarantees `def.width() <= hw::WORD_WIDTH`.
    EncodedInstruction::new(bits as Word, def.width())
}

#[cfg(test)]
mod tests {
    use super::super::{normalize, validate};
    use super::*;
    use crate::assembler::model::Radix;
    use crate::isa::{OperandKind, Schema};
    use strum::IntoEnumIterator;

    fn enc(text: &str) -> String {
        let lines = normalize::normalize(text);
        let validated = validate::validate(Schema::builtin(), &lines).unwrap();
        validated.iter().map(|line| encode(line).to_string()).collect()
    }

    #[test]
    fn loadi() {
        assert_eq!(enc("LOADI R1 10"), "0110000100001010");
    }

    #[test]
    fn add() {
        assert_eq!(enc("ADD R3 R1 R2"), "0000001100010010");
    }

    #[test]
    fn short_forms_keep_their_width() {
        assert_eq!(enc("CMP R1 R2"), "111100010010");
        assert_eq!(enc("JMP 0xFFD"), "1001111111111101");
    }

    #[test]
    fn split_immediate_fields() {
        assert_eq!(enc("SHL R1 R2 1 5"), "1101000100101101");
        assert_eq!(enc("SHR R15 R0 0 0"), "1110111100000000");
    }

    #[test]
    fn memory_forms() {
        assert_eq!(enc("LOAD R1 R2 15"), "0111000100101111");
        assert_eq!(enc("STORE R4, R5, 0b0011"), "1000010001010011");
    }

    #[test]
    fn radix_invariant() {
        let expected = enc("ADDI R7 10");
        for radix in Radix::iter() {
            let lit = match radix {
                Radix::Decimal => "10".to_owned(),
                Radix::Binary => format!("{}{:b}", radix.prefix(), 10),
                Radix::Hex => format!("{}{:x}", radix.prefix(), 10),
            };
            assert_eq!(enc(&format!("ADDI R7 {}", lit)), expected, "{}", radix);
        }
        assert_eq!(enc("ADDI R7 0xA"), expected);
    }

    #[test]
    fn width_matches_schema() {
        for def in Schema::builtin().iter() {
            let text = def
                .operands
                .iter()
                .map(|kind| match kind {
                    OperandKind::Register => "R0",
                    OperandKind::Immediate(_) => "0",
                })
                .fold(def.mnemonic.clone(), |acc, op| acc + " " + op);
            assert_eq!(enc(&text).len(), def.width(), "{}", text);
        }
    }
}
