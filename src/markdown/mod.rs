//! Markdown front end: frontmatter + body to document tree.

mod convert;
mod meta;

pub use convert::{MarkdownOptions, from_markdown};
pub use meta::{JsonMap, MarkdownMetaExtractor, PageMeta};
