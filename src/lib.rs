pub mod isa;

pub mod assembler;
pub mod batch;

pub mod cli;
