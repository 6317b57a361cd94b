pub mod report;
mod style;

pub use report::{Level, Report};
