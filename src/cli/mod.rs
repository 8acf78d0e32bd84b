pub mod batch;
pub mod command;
