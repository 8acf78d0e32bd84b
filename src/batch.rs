use crate::assembler::{self, EncodedInstruction, Rejected};
use crate::isa::Schema;
use derive_more::Constructor;
use log::{debug, warn};

/// Written in place of the binary listing for a unit which was rejected.
pub const FAILURE_MARKER: &str = "Error: Formatting issues found.";

/// One named source text, e.g. the contents of one program file.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Unit {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Encoded(Vec<EncodedInstruction>),
    Rejected(Rejected),
}

impl Outcome {
    pub fn is_encoded(&self) -> bool {
        matches!(self, Outcome::Encoded(_))
    }

    /// The output body for this unit: the bit strings, or the failure marker.
    pub fn render(&self) -> String {
        match self {
            Outcome::Encoded(insts) => assembler::render(insts),
            Outcome::Rejected(_) => FAILURE_MARKER.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Report {
    pub name: String,
    pub outcome: Outcome,
}

pub fn assemble_unit(schema: &Schema, unit: &Unit) -> Report {
    let outcome = match assembler::assemble(schema, &unit.source) {
        Ok(insts) => {
            debug!("unit '{}': encoded {} instructions", unit.name, insts.len());
            Outcome::Encoded(insts)
        }
        Err(rejected) => {
            warn!(
                "unit '{}': rejected with {} defect(s)",
                unit.name,
                rejected.diagnostics().len()
            );
            Outcome::Rejected(rejected)
        }
    };

    Report::new(unit.name.clone(), outcome)
}

/// Assembles each unit independently; a rejected unit never affects its siblings.
/// Reports are returned in the order the units were given.
pub fn assemble_units<'a>(
    schema: &Schema,
    units: impl IntoIterator<Item = &'a Unit>,
) -> Vec<Report> {
    units
        .into_iter()
        .map(|unit| assemble_unit(schema, unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, source: &str) -> Unit {
        Unit::new(name.to_owned(), source.to_owned())
    }

    #[test]
    fn sibling_units_are_independent() {
        let units = vec![
            unit("good", "LOADI R1 10\nADD R3 R1 R2\n"),
            unit("bad", "LOADI R1 10\nADD R3 R1 R2\nFOO R1\nJMP 3\n"),
            unit("also_good", "CMP R1 R2"),
        ];
        let reports = assemble_units(Schema::builtin(), &units);

        assert_eq!(
            reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["good", "bad", "also_good"]
        );
        assert_eq!(
            reports[0].outcome.render(),
            "0110000100001010\n0000001100010010"
        );
        assert!(!reports[1].outcome.is_encoded());
        assert_eq!(reports[1].outcome.render(), FAILURE_MARKER);
        assert_eq!(reports[2].outcome.render(), "111100010010");
    }

    #[test]
    fn rejected_unit_has_no_partial_output() {
        let report = assemble_unit(
            Schema::builtin(),
            &unit("bad", "LOADI R1 10\nLOADI R2 20\nADDI R1 300\n"),
        );
        match report.outcome {
            Outcome::Rejected(rejected) => assert_eq!(rejected.diagnostics().len(), 1),
            Outcome::Encoded(_) => panic!("unit should have been rejected"),
        }
    }
}
