//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

/// Markdown renderer for a personal blog
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Config file path
    #[arg(short = 'C', long, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every markdown page under the content directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Render a single markdown file to an HTML fragment
    #[command(visible_alias = "r")]
    Render {
        /// Markdown file to render
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Write the fragment to a file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Skip newlines between block elements
        #[arg(short, long)]
        minify: bool,
    },

    /// Print site data (menu, social links, products) as JSON
    Site {
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Minify the HTML content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Include draft pages
    #[arg(short, long)]
    pub drafts: bool,
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["sprig", "-C", "site.toml", "build", "-c", "-V", "--drafts"]);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(cli.is_build());
        let Commands::Build { build_args } = cli.command else {
            unreachable!()
        };
        assert!(build_args.clean && build_args.verbose && build_args.drafts);
        assert_eq!(build_args.minify, None);
    }

    #[test]
    fn test_parse_minify_flag_forms() {
        let minify = |args: &[&str]| match Cli::parse_from(args.iter().copied()).command {
            Commands::Build { build_args } => build_args.minify,
            _ => unreachable!(),
        };
        assert_eq!(minify(&["sprig", "build", "-m"]), Some(true));
        assert_eq!(minify(&["sprig", "build", "--minify", "false"]), Some(false));
    }

    #[test]
    fn test_parse_render_and_site() {
        let cli = Cli::parse_from(["sprig", "render", "post.md", "-o", "out.html"]);
        let Commands::Render {
            path,
            output,
            minify,
        } = &cli.command
        else {
            unreachable!()
        };
        assert_eq!(path, &PathBuf::from("post.md"));
        assert_eq!(output.as_deref(), Some(std::path::Path::new("out.html")));
        assert!(!minify);
        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE));

        let cli = Cli::parse_from(["sprig", "--color", "never", "site", "-p"]);
        assert!(matches!(cli.command, Commands::Site { pretty: true }));
    }
}
