//! `[markdown]` configuration.
//!
//! ```toml
//! [markdown.extensions]
//! footnotes = false
//!
//! [markdown.code]
//! copy_button_title = "Copy code"
//!
//! [markdown.code.language_label]
//! python = "Python 3"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::markdown::MarkdownOptions;
use crate::pipeline::CodeWrapperConfig;

/// Markdown front end and code block options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownSectionConfig {
    /// pulldown-cmark extensions.
    pub extensions: MarkdownOptions,
    /// Code block wrapper.
    pub code: CodeWrapperConfig,
}

impl MarkdownSectionConfig {
    pub const COPY_BUTTON_TITLE: FieldPath = FieldPath::new("markdown.code.copy_button_title");
    pub const LANGUAGE_LABEL: FieldPath = FieldPath::new("markdown.code.language_label");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.code.copy_button_title.trim().is_empty() {
            diag.warn(
                Self::COPY_BUTTON_TITLE,
                "copy buttons will have an empty title",
            );
        }

        // Fence languages are single tokens, so these keys can never match
        for lang in self.code.language_label.languages() {
            if lang.is_empty() || lang.contains(char::is_whitespace) {
                diag.warn(
                    Self::LANGUAGE_LABEL,
                    format!("`{lang}` never matches a code block language"),
                );
            }
        }

        for lang in self.code.language_label.shadowed() {
            diag.warn(
                Self::LANGUAGE_LABEL,
                format!("`{lang}` appears more than once in different cases; the last one wins"),
            );
        }
    }
}
