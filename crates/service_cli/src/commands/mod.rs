//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands write their
//! report to the given writer and log progress through `tracing`.

pub mod check;
pub mod iv;
pub mod price;
pub mod profile;
pub mod risk;
pub mod scenario;
