//! Command-line interface module.

mod args;
pub mod build;
pub mod render;
pub mod site;

pub use args::{BuildArgs, Cli, Commands};
