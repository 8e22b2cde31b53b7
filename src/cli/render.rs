//! Render a single markdown file.

use crate::{config::SiteConfig, debug, log, page::render_page, vdom::RenderConfig};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Render `path` to an HTML fragment, on stdout or into `output`.
pub fn render_file(
    path: &Path,
    output: Option<&Path>,
    minify: bool,
    config: &SiteConfig,
) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let page = render_page(&source, &config.markdown, RenderConfig::new(minify))
        .with_context(|| format!("Failed to render {}", path.display()))?;
    debug!("render"; "{} -> {} bytes", path.display(), page.html.len());

    match output {
        Some(out) => {
            fs::write(out, &page.html)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            log!("render"; "wrote {}", out.display());
        }
        None => println!("{}", page.html),
    }

    Ok(())
}
