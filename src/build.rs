//! Site enhancement orchestration.
//!
//! Coordinates partial prefetching, parallel page enhancement and asset
//! copying.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── prefetch_partials()
//!     │       │
//!     │       └── Fetch header + sidebar concurrently (HTTP or local
//!     │           directory) → in-memory StaticFetcher
//!     │
//!     ├── pages  ──► parse → enhance_page() → minify → write
//!     │             (rayon, one progress bar)
//!     │
//!     └── assets ──► copy through unchanged (rayon, second bar)
//! ```

use crate::{
    config::SiteConfig,
    dom::Document,
    enhance::{self, SlotOutcome},
    log,
    logger::ProgressBars,
    partial::{self, PartialFetcher, StaticFetcher},
    utils::minify,
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use url::Url;
use walkdir::WalkDir;

/// Per-slot warning latches so a missing partial warns once per run,
/// not once per page.
#[derive(Default)]
pub struct WarnOnce {
    header: AtomicBool,
    sidebar: AtomicBool,
}

impl WarnOnce {
    fn warn(&self, slot: &str, err: &partial::FetchError) {
        let latch = match slot {
            "header" => &self.header,
            _ => &self.sidebar,
        };
        if !latch.swap(true, Ordering::Relaxed) {
            log!("warn"; "{slot} partial skipped: {err}");
        }
    }
}

/// Enhance the entire site, processing pages and assets in parallel.
///
/// Partials are fetched once up front (the two fetches run concurrently,
/// neither depends on the other) and injected from memory into every
/// page. If `config.build.clean` is set, clears the output directory
/// first.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;

    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let partials = runtime.block_on(prefetch_partials(config))?;

    let pages = collect_pages(config);
    let assets = collect_assets(config);

    log!("build"; "enhancing {} pages", pages.len());
    let progress = ProgressBars::new(&[("pages", pages.len()), ("assets", assets.len())]);

    let has_error = AtomicBool::new(false);
    let warned = WarnOnce::default();

    let (pages_result, assets_result) = rayon::join(
        || {
            pages.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = enhance_page_file(path, config, &partials, &runtime, &warned) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", path.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                progress.inc_by_name("pages");
                Ok(())
            })
        },
        || {
            assets.par_iter().try_for_each(|(src, dest)| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = copy_asset(src, dest) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", src.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                progress.inc_by_name("assets");
                Ok(())
            })
        },
    );

    progress.finish();
    pages_result?;
    assets_result?;

    log_build_result(output)
}

/// Re-enhance or re-copy the given changed files (watch mode).
///
/// Partials are re-fetched so the fresh fragment content lands in the
/// rebuilt pages. Returns the number of processed files.
pub fn process_watched_files(paths: &[PathBuf], config: &SiteConfig) -> Result<usize> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let partials = runtime.block_on(prefetch_partials(config))?;
    let warned = WarnOnce::default();

    let mut count = 0;
    for path in paths {
        if !path.exists() {
            continue;
        }

        if path.starts_with(&config.build.pages) {
            if is_html(path) {
                enhance_page_file(path, config, &partials, &runtime, &warned)?;
            } else {
                let rel = path.strip_prefix(&config.build.pages).unwrap_or(path);
                copy_asset(path, &config.build.output.join(rel))?;
            }
            count += 1;
        } else if path.starts_with(&config.build.assets) {
            if let Some(dest) = asset_dest(path, config) {
                copy_asset(path, &dest)?;
                count += 1;
            }
        }
    }

    Ok(count)
}

// ============================================================================
// Partial Prefetch
// ============================================================================

/// Fetch both partials into an in-memory fetcher.
///
/// The two fetches are independent async operations with no ordering
/// between them. A failed fetch is logged and the slot left empty; pages
/// then keep their host element untouched for that slot.
async fn prefetch_partials(config: &SiteConfig) -> Result<StaticFetcher> {
    let fetcher = partial::fetcher_for(config)?;

    let (header, sidebar) = tokio::join!(
        fetcher.fetch(&config.build.header_file),
        fetcher.fetch(&config.build.sidebar_file),
    );

    let mut cache = StaticFetcher::default();
    match header {
        Ok(markup) => cache.insert(&config.build.header_file, &markup),
        Err(err) => log!("fetch"; "header partial unavailable: {err}"),
    }
    match sidebar {
        Ok(markup) => cache.insert(&config.build.sidebar_file, &markup),
        Err(err) => log!("fetch"; "sidebar partial unavailable: {err}"),
    }

    Ok(cache)
}

// ============================================================================
// Page Enhancement
// ============================================================================

/// Enhance a single page file and write it to the output directory.
fn enhance_page_file(
    path: &Path,
    config: &SiteConfig,
    partials: &StaticFetcher,
    runtime: &tokio::runtime::Runtime,
    warned: &WarnOnce,
) -> Result<()> {
    let rel = path.strip_prefix(&config.build.pages).unwrap_or(path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read page: {}", path.display()))?;
    let mut doc = Document::parse(&content)
        .with_context(|| format!("Failed to parse page: {}", path.display()))?;

    let url = page_url(config, rel);
    let report = runtime.block_on(enhance::enhance_page(&mut doc, &url, partials, config));

    report_slot_warnings(&report, warned);

    let html = doc.to_html();
    let out_path = config.build.output.join(rel);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, minify::minify(html.as_bytes(), config))
        .with_context(|| format!("Failed to write: {}", out_path.display()))?;

    Ok(())
}

fn report_slot_warnings(report: &enhance::EnhanceReport, warned: &WarnOnce) {
    for (slot, outcome) in [("header", &report.header), ("sidebar", &report.sidebar)] {
        if let SlotOutcome::Failed(err) = outcome {
            warned.warn(slot, err);
        }
    }
}

/// Public URL of a page, for current-link marking.
///
/// `site.url` (or the dev server address in serve mode) plus the
/// detected/explicit path prefix plus the page's output-relative path.
fn page_url(config: &SiteConfig, rel: &Path) -> Url {
    let base = config
        .site_url()
        .unwrap_or_else(|| Url::parse("http://localhost/").unwrap());

    let prefix = if config.site.path_prefix.is_empty() {
        partial::detect_path_prefix(&base)
    } else {
        Some(config.site.path_prefix.trim_matches('/').to_string())
    };

    let mut path = String::from("/");
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        path.push_str(&prefix);
        path.push('/');
    }
    path.push_str(&rel.to_string_lossy().replace('\\', "/"));

    base.join(&path).unwrap_or(base)
}

// ============================================================================
// File Collection
// ============================================================================

fn is_html(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("html" | "htm")
    )
}

/// All source pages (.html) under the pages directory.
fn collect_pages(config: &SiteConfig) -> Vec<PathBuf> {
    walk_files(&config.build.pages)
        .into_iter()
        .filter(|p| is_html(p))
        .collect()
}

/// All files copied through unchanged: non-HTML files inside the pages
/// directory plus everything under the assets directory.
fn collect_assets(config: &SiteConfig) -> Vec<(PathBuf, PathBuf)> {
    let page_assets = walk_files(&config.build.pages)
        .into_iter()
        .filter(|p| !is_html(p))
        .filter_map(|p| {
            let rel = p.strip_prefix(&config.build.pages).ok()?.to_path_buf();
            Some((p, config.build.output.join(rel)))
        });

    let site_assets = walk_files(&config.build.assets)
        .into_iter()
        .filter_map(|p| asset_dest(&p, config).map(|dest| (p, dest)));

    page_assets.chain(site_assets).collect()
}

/// Destination of an asset file: the assets directory is mirrored into
/// the output under its own name.
fn asset_dest(path: &Path, config: &SiteConfig) -> Option<PathBuf> {
    let rel = path.strip_prefix(&config.build.assets).ok()?;
    let dir_name = config.build.assets.file_name()?;
    Some(config.build.output.join(dir_name).join(rel))
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn copy_asset(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy asset to {}", dest.display()))?;
    Ok(())
}

/// Log build result based on output directory contents
fn log_build_result(output: &Path) -> Result<()> {
    let file_count = fs::read_dir(output)?
        .filter_map(Result::ok)
        .count();

    if file_count == 0 {
        log!("warn"; "output is empty, check if pages has .html files");
    } else {
        log!("build"; "done");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("pages/guide")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::create_dir_all(root.join("assets")).unwrap();

        fs::write(
            root.join("pages/index.html"),
            r#"<html><body><header id="site-header"></header><div id="sidebar-container"></div><main>home</main></body></html>"#,
        )
        .unwrap();
        fs::write(
            root.join("pages/guide/index.html"),
            r#"<html><body><div id="sidebar-container"></div><main><pre>code</pre></main></body></html>"#,
        )
        .unwrap();
        fs::write(root.join("pages/guide/shot.png"), b"\x89PNG").unwrap();
        fs::write(
            root.join("partials/header.html"),
            "<h1>Widget Docs</h1>",
        )
        .unwrap();
        fs::write(
            root.join("partials/sidebar.html"),
            "<h3>Contents</h3><ul><li><a href=\"/guide/\">Guide</a></li></ul>",
        )
        .unwrap();
        fs::write(root.join("assets/site.css"), "body {}").unwrap();

        let mut config = SiteConfig::default();
        config.build.root = Some(root.to_path_buf());
        config.build.pages = root.join("pages");
        config.build.partials = root.join("partials");
        config.build.assets = root.join("assets");
        config.build.output = root.join("public");
        config.build.minify = false;
        config.site.url = Some("https://example.com".into());

        (dir, config)
    }

    #[test]
    fn test_build_site_writes_enhanced_pages_and_assets() {
        let (dir, config) = project();

        build_site(&config).unwrap();

        let root = dir.path();
        let index = fs::read_to_string(root.join("public/index.html")).unwrap();
        assert!(index.contains("Widget Docs"));
        assert!(index.contains("sidebar-search"));

        let guide = fs::read_to_string(root.join("public/guide/index.html")).unwrap();
        // Sidebar link to /guide/ resolves to the current page
        assert!(guide.contains(r#"aria-current="page""#));
        assert!(guide.contains("code-block"));

        assert!(root.join("public/guide/shot.png").exists());
        assert!(root.join("public/assets/site.css").exists());
    }

    #[test]
    fn test_build_site_missing_sidebar_partial_degrades() {
        let (dir, config) = project();
        fs::remove_file(dir.path().join("partials/sidebar.html")).unwrap();

        build_site(&config).unwrap();

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        // Host left untouched, header still injected
        assert!(index.contains(r#"<div id="sidebar-container"></div>"#));
        assert!(index.contains("Widget Docs"));
    }

    #[test]
    fn test_build_site_clean_clears_output() {
        let (dir, mut config) = project();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/stale.html"), "old").unwrap();

        config.build.clean = true;
        build_site(&config).unwrap();

        assert!(!dir.path().join("public/stale.html").exists());
        assert!(dir.path().join("public/index.html").exists());
    }

    #[test]
    fn test_process_watched_files_reenhances_page() {
        let (dir, config) = project();
        build_site(&config).unwrap();

        fs::write(
            dir.path().join("pages/index.html"),
            r#"<html><body><div id="sidebar-container"></div><main>updated</main></body></html>"#,
        )
        .unwrap();

        let count =
            process_watched_files(&[dir.path().join("pages/index.html")], &config).unwrap();
        assert_eq!(count, 1);

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("updated"));
        assert!(index.contains("sidebar-search"));
    }

    #[test]
    fn test_page_url_with_detected_prefix() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://alice.github.io/widget-docs".into());

        let url = page_url(&config, Path::new("guide/index.html"));
        assert_eq!(
            url.as_str(),
            "https://alice.github.io/widget-docs/guide/index.html"
        );
    }

    #[test]
    fn test_page_url_root_hosted() {
        let mut config = SiteConfig::default();
        config.site.url = Some("https://docs.example.com".into());

        let url = page_url(&config, Path::new("index.html"));
        assert_eq!(url.as_str(), "https://docs.example.com/index.html");
    }

    #[test]
    fn test_collect_pages_only_html() {
        let (_dir, config) = project();
        let pages = collect_pages(&config);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| is_html(p)));
    }
}
