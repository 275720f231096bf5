//! Site initialization module.
//!
//! Creates a new documentation site with default configuration, sample
//! pages and the header/sidebar partials.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "furnish.toml";

/// Default site directory structure
const SITE_DIRS: &[&str] = &[
    "pages/getting-started",
    "pages/reference",
    "partials",
    "assets/styles",
    "assets/images",
];

/// Scaffold files embedded at compile time
const SCAFFOLD_FILES: &[(&str, &str)] = &[
    ("pages/index.html", include_str!("embed/init/index.html")),
    (
        "pages/getting-started/index.html",
        include_str!("embed/init/getting-started.html"),
    ),
    (
        "pages/reference/index.html",
        include_str!("embed/init/reference.html"),
    ),
    ("partials/header.html", include_str!("embed/init/header.html")),
    ("partials/sidebar.html", include_str!("embed/init/sidebar.html")),
    ("assets/styles/site.css", include_str!("embed/init/site.css")),
];

/// Create a new site with default structure
pub fn new_site(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `furnish init <SITE_NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(root)?;
    init_scaffold_files(root)?;
    init_default_config(root)?;

    let output_rel = config
        .build
        .output
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| "public".into());
    init_ignored_files(root, &[output_rel.as_path()])?;

    log!("init"; "site created at {}", root.display());
    log!("init"; "next: cd in and run `furnish serve`");
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file
fn init_default_config(root: &Path) -> Result<()> {
    let mut config = SiteConfig::default();
    config.site.title = "My Documentation".into();
    config.site.description = "Documentation built with furnish".into();

    let content = toml::to_string_pretty(&config)?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Create site directory structure
fn init_site_structure(root: &Path) -> Result<()> {
    for dir in SITE_DIRS {
        let path = root.join(dir);
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `furnish init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Write embedded sample pages, partials and styles
fn init_scaffold_files(root: &Path) -> Result<()> {
    for (rel, content) in SCAFFOLD_FILES {
        let path = root.join(rel);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
