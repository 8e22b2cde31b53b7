//! Site building.
//!
//! - **Init** - clean (with `--clean`) and create the output directory
//! - **Collect** - gather `*.md` files under the content directory
//! - **Render** - parallel markdown rendering + code block wrapping
//! - **Index** - write the post index (`posts.json`)

use crate::{
    config::SiteConfig,
    debug, log,
    logger::ProgressLine,
    page::{PostEntry, permalink, render_page, sort_posts},
    utils::date::DateTimeUtc,
    vdom::RenderConfig,
};
use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub posts: Vec<PostEntry>,
    pub drafts_skipped: usize,
}

/// Outcome of rendering one file.
enum PageOutcome {
    Written(PostEntry),
    SkippedDraft,
}

/// Build the whole site.
///
/// Every page is attempted; if any fail, their errors are logged and the
/// build fails after the rest are written.
pub fn build_site(config: &SiteConfig, quiet: bool) -> Result<BuildReport> {
    init_output(config)?;

    let files = collect_markdown_files(&config.build.content);
    debug!(
        "build";
        "found {} in {}",
        plural_count(files.len(), "page"),
        config.build.content.display()
    );

    let progress = (!quiet).then(|| ProgressLine::new(&[("pages", files.len())]));
    let now = DateTimeUtc::now().to_unix();
    let prefix = config.path_prefix();

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let result = render_file(path, config, &prefix, now);
            if let Some(p) = &progress {
                p.inc("pages");
            }
            (path, result)
        })
        .collect();

    if let Some(p) = progress {
        p.finish();
    }

    let mut report = BuildReport::default();
    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(PageOutcome::Written(entry)) => report.posts.push(entry),
            Ok(PageOutcome::SkippedDraft) => report.drafts_skipped += 1,
            Err(e) => {
                failed += 1;
                log!("error"; "{}: {:#}", config.root_relative(path).display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} failed to render", plural_count(failed, "page"));
    }

    sort_posts(&mut report.posts);
    write_index(config, &report.posts)?;

    if !quiet {
        if report.drafts_skipped > 0 {
            log!("build"; "{} skipped", plural_count(report.drafts_skipped, "draft"));
        }
        log!(
            "build";
            "wrote {} to {}",
            plural_count(report.posts.len(), "page"),
            config.root_relative(&config.build.output).display()
        );
    }

    Ok(report)
}

fn init_output(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean {}", output.display()))?;
        debug!("build"; "cleaned {}", output.display());
    }

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))
}

/// All markdown files below `dir`, sorted.
fn collect_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();
    files
}

fn render_file(path: &Path, config: &SiteConfig, prefix: &str, now: i64) -> Result<PageOutcome> {
    let source = fs::read_to_string(path).context("Failed to read source")?;
    let page = render_page(
        &source,
        &config.markdown,
        RenderConfig::new(config.build.minify),
    )?;

    if page.meta.draft && !config.build.drafts {
        return Ok(PageOutcome::SkippedDraft);
    }
    if let Some(date) = page.meta.date.as_deref().filter(|_| page.meta.published().is_none()) {
        log!(
            "warn";
            "{}: unrecognized date `{}`, listed as undated",
            config.root_relative(path).display(),
            date
        );
    }

    let rel = path.strip_prefix(&config.build.content).unwrap_or(path);
    let out = config.build.output.join(rel).with_extension("html");
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, &page.html).with_context(|| format!("Failed to write {}", out.display()))?;

    Ok(PageOutcome::Written(PostEntry::new(
        &page.meta,
        permalink(prefix, rel),
        now,
    )))
}

fn write_index(config: &SiteConfig, posts: &[PostEntry]) -> Result<()> {
    let path = config.build.output.join(&config.build.index);
    let json = serde_json::to_string_pretty(posts)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// `1 page`, `3 pages`
fn plural_count(count: usize, noun: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{s}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content");
        for (rel, body) in files {
            let path = content.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }

        let mut config = SiteConfig::default();
        config.root = dir.path().to_path_buf();
        config.build.content = content;
        config.build.output = dir.path().join("dist");
        config.build.minify = true;
        (dir, config)
    }

    #[test]
    fn test_build_writes_pages_and_index() {
        let (_dir, config) = site(&[
            ("hello.md", "---\ntitle: Hello\ndate: 2024-01-02\n---\n```js\nx\n```\n"),
            ("writings/deep.md", "+++\ntitle = \"Deep\"\ndate = \"2024-03-04\"\n+++\ntext\n"),
            ("notes.txt", "not markdown"),
        ]);

        let report = build_site(&config, true).unwrap();
        assert_eq!(report.posts.len(), 2);
        assert_eq!(report.posts[0].title, "Deep");
        assert_eq!(report.posts[0].permalink, "/writings/deep.html");

        let hello = fs::read_to_string(config.build.output.join("hello.html")).unwrap();
        assert!(hello.contains(r#"<span class="lang">js</span>"#));
        assert!(config.build.output.join("writings/deep.html").exists());
        assert!(!config.build.output.join("notes.html").exists());

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.build.output.join("posts.json")).unwrap())
                .unwrap();
        assert_eq!(index[1]["date"], "2024-01-02T00:00:00+08:00");
    }

    #[test]
    fn test_drafts_skipped_unless_enabled() {
        let files = [("draft.md", "---\ndraft: true\n---\nwip\n"), ("post.md", "done\n")];

        let (_dir, config) = site(&files);
        let report = build_site(&config, true).unwrap();
        assert_eq!(report.drafts_skipped, 1);
        assert_eq!(report.posts.len(), 1);
        assert!(!config.build.output.join("draft.html").exists());

        let (_dir, mut config) = site(&files);
        config.build.drafts = true;
        let report = build_site(&config, true).unwrap();
        assert_eq!(report.drafts_skipped, 0);
        assert_eq!(report.posts.len(), 2);
    }

    #[test]
    fn test_failed_page_fails_build() {
        let (_dir, config) = site(&[
            ("bad.md", "+++\ntitle = \n+++\n"),
            ("good.md", "fine\n"),
        ]);

        let err = build_site(&config, true).unwrap_err();
        assert!(err.to_string().contains("1 page failed"));
        assert!(config.build.output.join("good.html").exists());
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let (_dir, mut config) = site(&[("post.md", "x\n")]);
        fs::create_dir_all(&config.build.output).unwrap();
        fs::write(config.build.output.join("stale.html"), "").unwrap();

        config.build.clean = true;
        build_site(&config, true).unwrap();
        assert!(!config.build.output.join("stale.html").exists());
        assert!(config.build.output.join("post.html").exists());
    }

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "page"), "0 pages");
        assert_eq!(plural_count(1, "page"), "1 page");
    }
}
