//! Example package: a toy computation unit that carries its own test suite.

pub mod config;
pub mod example;

pub use config::{HarnessConfig, ReporterKind};
pub use example::{test_suite, ComputationUnit};
