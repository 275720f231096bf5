//! File system watcher for live re-enhancement.
//!
//! Monitors pages, partials, asset directories and the config file for
//! changes and triggers rebuilds accordingly.
//!
//! # Rebuild strategy
//!
//! | Change | Strategy |
//! |--------|----------|
//! | `furnish.toml` | reload config, re-enhance everything |
//! | partial fragment | re-enhance everything (every page embeds it) |
//! | page / asset | re-enhance or re-copy just the changed files |
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│    handle_changes()    │  │
//! │  │ events   │    │ (300ms)  │    │                        │  │
//! │  └──────────┘    └──────────┘    │  ┌──────────────────┐  │  │
//! │                                  │  │ Full Rebuild     │  │  │
//! │                                  │  │ (partial/config) │  │  │
//! │                                  │  └──────────────────┘  │  │
//! │                                  │  ┌──────────────────┐  │  │
//! │                                  │  │ Incremental      │  │  │
//! │                                  │  │ (pages/assets)   │  │  │
//! │                                  │  └──────────────────┘  │  │
//! │                                  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::{
    build::{build_site, process_watched_files},
    config::{SiteConfig, cfg, reload_config},
    log,
    logger::WatchStatus,
    utils::category::{FileCategory, categorize_path},
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const REBUILD_COOLDOWN_MS: u64 = 800;

const WATCH_CATEGORIES: &[FileCategory] = &[
    FileCategory::Page,
    FileCategory::Asset,
    FileCategory::Partial,
    FileCategory::Config,
];

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Format path as relative for log display.
///
/// `/proj/pages/guide/index.html` → `pages/guide/index.html`
fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and rebuild cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_rebuild: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_rebuild: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_rebuild
            .is_some_and(|t| t.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_rebuild(&mut self) {
        self.last_rebuild = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Attempt a full rebuild, logging errors on failure.
/// Returns true if successful (for cooldown tracking).
fn try_full_rebuild(config: &SiteConfig, reason: &str) -> bool {
    log!("watch"; "{reason}");

    match build_site(config) {
        Ok(()) => true,
        Err(e) => {
            log!("watch"; "full rebuild failed");
            log!("watch"; "{e}");
            false
        }
    }
}

/// Process file changes. Returns true if a full rebuild succeeded (for
/// cooldown).
fn handle_changes(paths: &[PathBuf], status: &mut WatchStatus) -> bool {
    if paths.is_empty() {
        return false;
    }

    let config = cfg();
    let root = config.get_root().to_path_buf();
    let rel = |p: &Path| rel_path(p, &root);

    // Categorize changed files
    let mut config_changed = false;
    let mut partial_triggers: Vec<&PathBuf> = Vec::new();
    let mut incremental_targets: Vec<PathBuf> = Vec::new();

    for path in paths {
        match categorize_path(path, &config) {
            FileCategory::Config => config_changed = true,
            FileCategory::Partial => partial_triggers.push(path),
            FileCategory::Page | FileCategory::Asset => incremental_targets.push(path.clone()),
            FileCategory::Unknown => {}
        }
    }

    // Config changes: reload, then rebuild everything with the new config
    if config_changed {
        match reload_config() {
            Ok(true) => {
                return try_full_rebuild(&cfg(), "config changed, rebuilding...");
            }
            Ok(false) => {
                // Content unchanged (e.g. editor re-save); nothing to do
                // unless other files changed too
            }
            Err(e) => {
                status.error("config reload failed", &format!("{e:#}"));
                return false;
            }
        }
    }

    // Partial changes: every page embeds the fragment, rebuild all
    if !partial_triggers.is_empty() {
        let trigger = rel(partial_triggers[0]);
        return try_full_rebuild(&cfg(), &format!("{trigger} changed, rebuilding..."));
    }

    // Incremental re-enhancement (pages/assets)
    if !incremental_targets.is_empty() {
        match process_watched_files(&incremental_targets, &config) {
            Ok(0) => {}
            Ok(1) => {
                status.success(&format!("re-enhanced: {}", rel(&incremental_targets[0])));
            }
            Ok(count) => {
                status.success(&format!("re-enhanced {count} files"));
            }
            Err(e) => {
                let context = incremental_targets
                    .iter()
                    .map(|p| rel(p))
                    .collect::<Vec<_>>()
                    .join(", ");
                status.error(&format!("failed: {context}"), &format!("{e:#}"));
            }
        }
    }

    false
}

// =============================================================================
// Watcher Setup
// =============================================================================

/// Format absolute path as relative to root, with trailing slash for directories.
fn format_rel(path: &Path, root: &Path, is_dir: bool) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let suffix = if is_dir { "/" } else { "" };
    format!("{}{}", rel.display(), suffix)
}

/// Log watched paths grouped by rebuild strategy.
fn log_watch_summary(config: &SiteConfig) {
    let root = config.get_root();
    let build = &config.build;

    // Full-rebuild triggers: partials, config file
    let full_paths: Vec<_> = [
        (build.partials.as_path(), true),
        (config.config_path.as_path(), false),
    ]
    .into_iter()
    .filter(|(p, _)| p.exists())
    .map(|(p, is_dir)| format_rel(p, root, is_dir))
    .collect();

    // Incremental triggers: pages, assets
    let incr_paths: Vec<_> = [(build.pages.as_path(), true), (build.assets.as_path(), true)]
        .into_iter()
        .filter(|(p, _)| p.exists())
        .map(|(p, is_dir)| format_rel(p, root, is_dir))
        .collect();

    if !full_paths.is_empty() {
        log!("watch"; "full rebuild: {}", full_paths.join(", "));
    }
    if !incr_paths.is_empty() {
        log!("watch"; "incremental: {}", incr_paths.join(", "));
    }
}

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    for &cat in WATCH_CATEGORIES {
        if let Some(path) = cat.path(config)
            && path.exists()
        {
            let mode = if cat.is_directory() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };

            watcher
                .watch(&path, mode)
                .with_context(|| format!("Failed to watch {}: {}", cat.name(), path.display()))?;
        }
    }

    log_watch_summary(config);
    eprintln!(); // Blank line to separate init logs from change events
    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and live re-enhancement.
pub fn watch_for_changes_blocking() -> Result<()> {
    let config = cfg();
    if !config.serve.watch {
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, &config)?;

    let mut debouncer = Debouncer::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take(), &mut status) {
                    debouncer.mark_rebuild();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            // Other cases: irrelevant events, timeout without ready, etc.
            _ => {}
        }
    }

    Ok(())
}
