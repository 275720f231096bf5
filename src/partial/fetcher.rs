//! Partial fetch backends.
//!
//! | Fetcher | Source | Used by |
//! |---------|--------|---------|
//! | [`HttpFetcher`] | deployed site over HTTP | `[build].partials_url` |
//! | [`DirFetcher`] | local partials directory | default build flow |
//! | [`StaticFetcher`] | in-memory map | build-time cache, tests |

use super::{FetchError, detect_path_prefix};
use crate::config::SiteConfig;
use async_trait::async_trait;
use std::{collections::HashMap, io::ErrorKind, path::PathBuf};
use url::Url;

/// Source of partial markup. Implementations are injected into the
/// loader so the fetch failure path is testable without a network.
#[async_trait]
pub trait PartialFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Pick the fetcher for the current config: HTTP when
/// `[build].partials_url` is set, the local partials directory otherwise.
pub fn fetcher_for(config: &SiteConfig) -> Result<Box<dyn PartialFetcher>, FetchError> {
    match &config.build.partials_url {
        Some(raw) => {
            let site = Url::parse(raw).map_err(|_| FetchError::Url(raw.clone()))?;
            let dir = config
                .build
                .partials
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Box::new(HttpFetcher::for_site(
                &site,
                &dir,
                &config.site.path_prefix,
            )?))
        }
        None => Ok(Box::new(DirFetcher::new(config.build.partials.clone()))),
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches partials from a deployed site.
///
/// The request carries `Cache-Control: no-cache` so the fragment is
/// always fetched fresh.
pub struct HttpFetcher {
    base: Url,
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher rooted at `site origin + path prefix + partials dir`.
    ///
    /// An empty `explicit_prefix` means: detect the prefix from the site
    /// URL when it matches a multi-tenant hosting pattern.
    pub fn for_site(
        site: &Url,
        partials_dir: &str,
        explicit_prefix: &str,
    ) -> Result<Self, FetchError> {
        let prefix = if explicit_prefix.is_empty() {
            detect_path_prefix(site)
        } else {
            Some(explicit_prefix.trim_matches('/').to_string())
        };

        let mut path = String::from("/");
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            path.push_str(&prefix);
            path.push('/');
        }
        let dir = partials_dir.trim_matches('/');
        if !dir.is_empty() {
            path.push_str(dir);
            path.push('/');
        }

        let base = site
            .join(&path)
            .map_err(|_| FetchError::Url(site.to_string()))?;

        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    /// Final URL a partial resolves to.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|_| FetchError::Url(format!("{}{path}", self.base)))
    }
}

#[async_trait]
impl PartialFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|source| FetchError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Http {
            path: path.to_string(),
            source,
        })
    }
}

// ============================================================================
// Local Directory
// ============================================================================

/// Reads partials from the local partials directory - the build-time
/// equivalent of a same-origin fetch.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl PartialFetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let file = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => FetchError::NotFound {
                    path: path.to_string(),
                },
                _ => FetchError::Io {
                    path: path.to_string(),
                    source,
                },
            })
    }
}

// ============================================================================
// In-Memory
// ============================================================================

/// Serves partials from memory. The build pass prefetches each partial
/// once per run and injects from here; tests use it as a fake.
#[derive(Default)]
pub struct StaticFetcher {
    partials: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn insert(&mut self, path: &str, markup: &str) {
        self.partials.insert(path.to_string(), markup.to_string());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.partials.contains_key(path)
    }
}

#[async_trait]
impl PartialFetcher for StaticFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.partials
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
            })
    }
}
