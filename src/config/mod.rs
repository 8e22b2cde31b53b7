//! Site configuration management for `sprig.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── markdown   # [markdown], [markdown.code]
//! │   └── site       # [site] and its menu/social/products
//! ├── types/         # ConfigError, diagnostics, field paths
//! ├── util.rs        # config discovery, path helpers
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section                | Purpose                                      |
//! |------------------------|----------------------------------------------|
//! | `[site]`               | Title, description, url, og image            |
//! | `[site.menu]`          | Menu entries and the label variant in use    |
//! | `[[site.social]]`      | Social links                                 |
//! | `[[site.products]]`    | Product links                                |
//! | `[markdown]`           | Markdown extensions                          |
//! | `[markdown.code]`      | Code block copy button and language labels   |
//! | `[build]`              | Content/output paths, drafts, minify         |

pub mod section;
pub mod types;
mod util;

use util::{extract_url_path, find_config_file, normalize_path};

pub use section::{
    BuildSectionConfig, MarkdownSectionConfig, MenuConfig, MenuEntry, OgImage, Product,
    SiteSectionConfig, SocialLink,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "sprig.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sprig.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub markdown: MarkdownSectionConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. `build` requires one;
    /// `render` and `site` fall back to defaults rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let found = find_config_file(&cli.config);

        let mut config = match &found {
            Some(path) => Self::from_path(path)?,
            None if cli.is_build() => {
                log!(
                    "error";
                    "Config file '{}' not found in this directory or any parent.",
                    cli.config.display()
                );
                bail!(ConfigError::Validation("config file not found".into()));
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        // Raw paths, before they are made absolute
        config.validate_paths()?;

        let root = found
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = found.map(|p| normalize_path(&p)).unwrap_or_default();
        config.finalize(cli, &root);
        config.validate(cli)?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// URL path the site is served under, as `/prefix` or empty.
    ///
    /// `https://example.com/blog/` gives `/blog`.
    pub fn path_prefix(&self) -> String {
        match extract_url_path(&self.site.url) {
            Some(path) if !path.is_empty() => format!("/{path}"),
            _ => String::new(),
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn finalize(&mut self, cli: &Cli, root: &Path) {
        self.root = normalize_path(root);

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.build.content = normalize_path(&self.root.join(&self.build.content));
        self.build.output = normalize_path(&self.root.join(&self.build.output));

        if let Commands::Build { build_args } = &cli.command {
            self.apply_build_args(build_args);
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        self.build.clean = args.clean;
        self.build.drafts |= args.drafts;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Pre-validate paths before normalization.
    fn validate_paths(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.build.validate_paths(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate configuration for the current command.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.markdown.validate(&mut diag);
        if cli.is_build() {
            self.build.validate(&mut diag);
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
