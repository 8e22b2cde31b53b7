//! `[build]` configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Build paths and switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Markdown sources (relative to the project root).
    pub content: PathBuf,
    /// Output directory (relative to the project root).
    pub output: PathBuf,
    /// Render pages marked `draft: true`.
    pub drafts: bool,
    /// Skip newlines between block elements.
    pub minify: bool,
    /// Index of rendered posts, written inside `output`.
    pub index: PathBuf,

    /// Remove `output` before building (CLI only)
    #[serde(skip)]
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            content: "content".into(),
            output: "dist".into(),
            drafts: false,
            minify: false,
            index: "posts.json".into(),
            clean: false,
        }
    }
}

impl BuildSectionConfig {
    pub const CONTENT: FieldPath = FieldPath::new("build.content");
    pub const OUTPUT: FieldPath = FieldPath::new("build.output");
    pub const INDEX: FieldPath = FieldPath::new("build.index");

    /// Check raw paths, before they are joined with the root.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        if self.index.is_absolute() || self.index.components().count() != 1 {
            diag.error_with_hint(
                Self::INDEX,
                format!("`{}` must be a plain file name", self.index.display()),
                "e.g. \"posts.json\"",
            );
        }
    }

    /// Check normalized paths.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.content.is_dir() {
            diag.error(
                Self::CONTENT,
                format!("content directory `{}` not found", self.content.display()),
            );
        }

        if self.output == self.content || self.content.starts_with(&self.output) {
            diag.error_with_hint(
                Self::OUTPUT,
                "output directory contains the content directory",
                "a clean build would delete your sources",
            );
        } else if self.output.starts_with(&self.content) {
            diag.warn(
                Self::OUTPUT,
                "output directory is inside the content directory",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs() -> (TempDir, BuildSectionConfig) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("content")).unwrap();
        let config = BuildSectionConfig {
            content: dir.path().join("content"),
            output: dir.path().join("dist"),
            ..Default::default()
        };
        (dir, config)
    }

    #[test]
    fn test_valid_layout() {
        let (_dir, config) = dirs();
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(!diag.has_errors());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn test_missing_content_dir() {
        let (dir, mut config) = dirs();
        config.content = dir.path().join("missing");
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, BuildSectionConfig::CONTENT);
    }

    #[test]
    fn test_output_wrapping_content_is_error() {
        let (dir, mut config) = dirs();
        config.output = dir.path().to_path_buf();
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, BuildSectionConfig::OUTPUT);
    }

    #[test]
    fn test_output_inside_content_warns() {
        let (_dir, mut config) = dirs();
        config.output = config.content.join("dist");
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(!diag.has_errors());
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_index_must_be_file_name() {
        let config = BuildSectionConfig {
            index: "data/posts.json".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate_paths(&mut diag);
        assert!(diag.has_errors());

        let mut diag = ConfigDiagnostics::new();
        BuildSectionConfig::default().validate_paths(&mut diag);
        assert!(!diag.has_errors());
    }
}
