//! Site configuration management for `furnish.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[site]`    | Site metadata (title, url, path prefix)          |
//! | `[build]`   | Directories, partial names, host ids, minify     |
//! | `[serve]`   | Development server (port, interface, watch)      |
//! | `[extra]`   | User-defined custom fields                       |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Widget Docs"
//! url = "https://alice.github.io/widget-docs"
//!
//! [build]
//! pages = "pages"
//! partials = "partials"
//! output = "public"
//! minify = true
//!
//! [serve]
//! port = 4173
//!
//! [extra]
//! analytics_id = "UA-12345"
//! ```

mod build;
pub mod defaults;
mod error;
mod handle;
mod serve;
mod site;

pub use handle::{cfg, init_config, reload_config};

// Internal imports used in this module
use build::BuildConfig;
use error::ConfigError;
use serve::ServeConfig;
use site::SiteInfo;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use url::Url;

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing furnish.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub site: SiteInfo,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load configuration for the given CLI invocation: read the config
    /// file when present, then merge CLI overrides.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Parsed `[site].url`, if set and valid.
    pub fn site_url(&self) -> Option<Url> {
        self.site.url.as_deref().and_then(|u| Url::parse(u).ok())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        // Determine the final root path based on command
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => {
                let base = cli
                    .root
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| self.get_root().to_owned());
                base.join(name)
            }
            _ => cli
                .root
                .as_ref()
                .cloned()
                .unwrap_or_else(|| self.get_root().to_owned()),
        };

        self.set_root(&root);
        self.update_path_with_root(&root);

        if let Some(build_args) = cli.build_args() {
            Self::update_option(&mut self.build.minify, build_args.minify.as_ref());
            if build_args.clean {
                self.build.clean = true;
            }
            if let Some(base_url) = &build_args.base_url {
                self.site.url = Some(base_url.clone());
            }
        }

        if let Commands::Serve {
            interface,
            port,
            watch,
            ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
            self.site.url = Some(format!(
                "http://{}:{}",
                self.serve.interface, self.serve.port
            ));
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.pages, cli.pages.as_ref());
        Self::update_option(&mut self.build.partials, cli.partials.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize all directory paths
        self.build.pages = Self::normalize_path(&root.join(&self.build.pages));
        self.build.partials = Self::normalize_path(&root.join(&self.build.partials));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        let cli = self.get_cli();

        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        if let Some(partials_url) = &self.build.partials_url {
            if !partials_url.starts_with("http") {
                bail!(ConfigError::Validation(
                    "[build.partials_url] must start with http:// or https://".into()
                ));
            }
            if Url::parse(partials_url).is_err() {
                bail!(ConfigError::Validation(
                    "[build.partials_url] is not a valid URL".into()
                ));
            }
        }

        match &cli.command {
            Commands::Init { .. } if self.get_root().exists() => {
                bail!("Path already exists");
            }
            Commands::Build { .. } | Commands::Serve { .. } => {
                if !self.build.pages.is_dir() {
                    bail!(ConfigError::Validation(format!(
                        "[build.pages] directory not found: {}",
                        self.build.pages.display()
                    )));
                }
                if self.build.partials_url.is_none() && !self.build.partials.is_dir() {
                    bail!(ConfigError::Validation(format!(
                        "[build.partials] directory not found: {}",
                        self.build.partials.display()
                    )));
                }
            }
            Commands::Init { .. } => {}
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
