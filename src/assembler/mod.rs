pub mod disasm;
pub mod model;
pub mod phases;

pub use model::EncodedInstruction;
pub use phases::types::{Loc, Located};
pub use phases::validate::Diagnostic;

use crate::isa::Schema;
use itertools::Itertools;
use log::debug;
use std::fmt::Display;

/*
    Phases:

        1.  Normalization: comments (`#` and `//`) and commas are stripped from each line, and
            lines with nothing left are dropped. Each surviving line remembers its line number.

        2.  Validation: each line is checked against the `Schema` (mnemonic, then operand count,
            then each operand in turn). This is a gate: every line is checked and every defect is
            collected, and if there are any the unit is rejected as a whole.

        3.  Encoding: each validated line is packed into a single `EncodedInstruction`.

    There is no state shared between lines, so there are no labels and no second pass.
*/

/// Every defect found in a rejected unit, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    diagnostics: Vec<Diagnostic>,
}

impl Rejected {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Display for Rejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diagnostics.iter().join("\n"))
    }
}

impl std::error::Error for Rejected {}

pub fn assemble(schema: &Schema, source: &str) -> Result<Vec<EncodedInstruction>, Rejected> {
    let lines = phases::normalize(source);
    debug!("normalized {} instruction lines", lines.len());

    let validated =
        phases::validate(schema, &lines).map_err(|diagnostics| Rejected { diagnostics })?;

    Ok(validated.iter().map(phases::encode).collect())
}

/// The textual output format: one bit string per line.
pub fn render(insts: &[EncodedInstruction]) -> String {
    insts.iter().join("\n")
}
