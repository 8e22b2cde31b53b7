//! Sprig - markdown renderer for a personal blog.
//!
//! Code blocks come out wrapped with a copy button and a language label.

#![allow(dead_code)]

mod cli;
mod config;
mod logger;
mod markdown;
mod page;
mod pipeline;
mod site;
mod utils;
mod vdom;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_site(&config, false).map(|_| ()),
        Commands::Render {
            path,
            output,
            minify,
        } => cli::render::render_file(path, output.as_deref(), *minify, &config),
        Commands::Site { pretty } => cli::site::print_site(&config, *pretty),
    }
}
