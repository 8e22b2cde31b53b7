//! Page rendering: markdown source to HTML plus its post index entry.
//!
//! ```text
//! source ──> frontmatter split ──> from_markdown ──> CodeWrapper ──> HTML
//! ```

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::config::MarkdownSectionConfig;
use crate::debug;
use crate::markdown::{MarkdownMetaExtractor, PageMeta, from_markdown};
use crate::pipeline::{CodeWrapper, Pipeline};
use crate::utils::date::{relative_time, to_beijing_time};
use crate::vdom::{RenderConfig, render_document};

/// A rendered markdown page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub meta: PageMeta,
    pub html: String,
}

/// Render markdown `source` (frontmatter optional) to an HTML fragment.
pub fn render_page(
    source: &str,
    config: &MarkdownSectionConfig,
    render: RenderConfig,
) -> Result<RenderedPage> {
    let (meta, body) = MarkdownMetaExtractor.split(source)?;

    let doc = Pipeline::new(from_markdown(body, &config.extensions))
        .pipe(CodeWrapper::new(&config.code))
        .inspect(|doc| {
            let blocks = doc
                .walk()
                .elements()
                .filter(|(elem, _)| elem.is("pre"))
                .count();
            let title = meta.title.as_deref().unwrap_or("untitled");
            debug!("render"; "{} code block(s) in `{}`", blocks, title);
        })
        .into_inner();

    Ok(RenderedPage {
        html: render_document(&doc, &render),
        meta,
    })
}

// =============================================================================
// Post index
// =============================================================================

/// One row of `posts.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostEntry {
    pub title: String,
    pub permalink: String,
    /// Publication date in Beijing time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// e.g. "3 days ago", relative to the build time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip)]
    timestamp: Option<i64>,
}

impl PostEntry {
    /// Index entry for a page written at `permalink`; `now` is unix seconds.
    pub fn new(meta: &PageMeta, permalink: String, now: i64) -> Self {
        let published = meta.published().map(to_beijing_time);
        let timestamp = published.map(|dt| dt.to_unix());

        Self {
            title: meta.title.clone().unwrap_or_else(|| permalink.clone()),
            date: published.map(|dt| dt.to_rfc3339()),
            relative: timestamp.map(|ts| relative_time(ts, now)),
            summary: meta.summary.clone(),
            tags: meta.tags.clone(),
            permalink,
            timestamp,
        }
    }
}

/// Newest first; undated posts last, by permalink.
pub fn sort_posts(posts: &mut [PostEntry]) {
    posts.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.permalink.cmp(&b.permalink))
    });
}

/// Site URL of the HTML file rendered from `rel` (a path relative to the
/// content directory).
///
/// `writings/hello.md` under prefix `/blog` gives `/blog/writings/hello.html`.
pub fn permalink(prefix: &str, rel: &Path) -> String {
    let rel = rel.with_extension("html");
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("{prefix}/{}", parts.join("/"))
}
