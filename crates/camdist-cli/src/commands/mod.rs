//! CLI command implementations.

pub mod encode;
pub mod patch;
pub mod run;
pub mod scan;
