#[macro_use]
pub(crate) mod common;

mod arithmetic;
mod errors;
mod globals_and_locals;
mod tables;
mod truthiness;
