pub mod defs;
pub mod types;

pub use types::schema::{InstDef, OperandKind, Schema};
