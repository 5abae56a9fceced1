//! Command-line interface module.

mod args;
pub mod bundle;
pub mod prune;
pub mod publish;
pub mod validate;

pub use args::{Cli, Commands};
