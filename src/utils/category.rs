//! File category classification for watch mode.
//!
//! Categorizes changed files by their role, determining whether a change
//! requires re-enhancing everything or just the touched files.
//!
//! # File Categories
//!
//! | Category   | Rebuild Strategy      | Example Files                |
//! |------------|-----------------------|------------------------------|
//! | Page       | Incremental (single)  | `pages/**/*.html`            |
//! | Asset      | Incremental (single)  | `assets/**`                  |
//! | Partial    | Full rebuild          | `partials/sidebar.html`      |
//! | Config     | Full rebuild + reload | `furnish.toml`               |
//! | Unknown    | Ignored               | Files outside watched dirs   |
//!
//! A partial change rebuilds everything because every page embeds the
//! injected fragment.

use crate::config::SiteConfig;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Category of a changed file, used to determine the rebuild strategy in
/// watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    /// Source page (.html) - can be re-enhanced individually
    Page,
    /// Asset file - can be copied individually
    Asset,
    /// Partial fragment - requires re-enhancing every page
    Partial,
    /// Site configuration (furnish.toml) - requires reload + full rebuild
    Config,
    /// File outside watched directories
    Unknown,
}

impl FileCategory {
    /// Short name for this category (used in logs)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Page => "pages",
            Self::Asset => "assets",
            Self::Partial => "partials",
            Self::Config => "config",
            Self::Unknown => "unknown",
        }
    }

    /// The watched path for this category from config.
    pub fn path(self, config: &SiteConfig) -> Option<PathBuf> {
        match self {
            Self::Page => Some(config.build.pages.clone()),
            Self::Asset => Some(config.build.assets.clone()),
            Self::Partial => Some(config.build.partials.clone()),
            Self::Config => Some(config.config_path.clone()),
            Self::Unknown => None,
        }
    }

    /// Returns true if this category represents a directory (vs a single file)
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Page | Self::Asset | Self::Partial)
    }
}

/// Categorize a file path to determine how changes should be handled.
pub fn categorize_path(path: &Path, config: &SiteConfig) -> FileCategory {
    let path = normalize_path(path);

    if path == config.config_path {
        FileCategory::Config
    } else if path.starts_with(&config.build.partials) {
        FileCategory::Partial
    } else if path.starts_with(&config.build.pages) {
        FileCategory::Page
    } else if path.starts_with(&config.build.assets) {
        FileCategory::Asset
    } else {
        FileCategory::Unknown
    }
}

/// Normalize a path to absolute form for reliable comparison.
///
/// Config paths are already canonicalized, so incoming paths (e.g., from
/// the file watcher) are canonicalized before comparison.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_dirs(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.config_path = root.join("furnish.toml");
        config.build.pages = root.join("pages");
        config.build.partials = root.join("partials");
        config.build.assets = root.join("assets");
        config
    }

    #[test]
    fn test_category_name() {
        assert_eq!(FileCategory::Page.name(), "pages");
        assert_eq!(FileCategory::Asset.name(), "assets");
        assert_eq!(FileCategory::Partial.name(), "partials");
        assert_eq!(FileCategory::Config.name(), "config");
        assert_eq!(FileCategory::Unknown.name(), "unknown");
    }

    #[test]
    fn test_is_directory() {
        assert!(FileCategory::Page.is_directory());
        assert!(FileCategory::Asset.is_directory());
        assert!(FileCategory::Partial.is_directory());

        assert!(!FileCategory::Config.is_directory());
        assert!(!FileCategory::Unknown.is_directory());
    }

    #[test]
    fn test_categorize_path() {
        let root = Path::new("/proj");
        let config = config_with_dirs(root);

        assert_eq!(
            categorize_path(Path::new("/proj/furnish.toml"), &config),
            FileCategory::Config
        );
        assert_eq!(
            categorize_path(Path::new("/proj/pages/guide/index.html"), &config),
            FileCategory::Page
        );
        assert_eq!(
            categorize_path(Path::new("/proj/partials/sidebar.html"), &config),
            FileCategory::Partial
        );
        assert_eq!(
            categorize_path(Path::new("/proj/assets/site.css"), &config),
            FileCategory::Asset
        );
        assert_eq!(
            categorize_path(Path::new("/elsewhere/file.html"), &config),
            FileCategory::Unknown
        );
    }

    #[test]
    fn test_normalize_path_absolute() {
        let normalized = normalize_path(Path::new("/absolute/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }
}
