//! Shared partial loading and injection.
//!
//! A partial is an HTML fragment of shared page furniture (header or
//! sidebar) that gets injected into a host element of every page. The
//! fetch side is abstracted behind [`PartialFetcher`] so the failure path
//! is unit-testable without a network; the injection side mutates the
//! page tree and hands the host back for follow-up enhancement.

mod fetcher;

pub use fetcher::{DirFetcher, HttpFetcher, PartialFetcher, StaticFetcher, fetcher_for};

use crate::dom::{Document, NodeId};
use thiserror::Error;
use url::Url;

/// Why a partial could not be fetched or injected.
///
/// Never fatal: the page stays usable without the fragment, callers log a
/// warning and move on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("partial `{path}` returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("failed to fetch partial `{path}`")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("partial `{path}` not found")]
    NotFound { path: String },

    #[error("failed to read partial `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid partial URL `{0}`")]
    Url(String),

    #[error("partial `{path}` is not valid markup: {message}")]
    Malformed { path: String, message: String },
}

// ============================================================================
// Path Prefix Detection
// ============================================================================

/// Host suffixes of multi-tenant static hosts, where a project site lives
/// under the first URL path segment.
const MULTI_TENANT_HOSTS: &[&str] = &["github.io", "gitlab.io", "pages.dev"];

/// Detect the path prefix for a site hosted under a project subpath.
///
/// Matches the hostname against known multi-tenant hosting patterns and,
/// on a hit, takes the first path segment as the prefix. Root-hosted and
/// local sites get no prefix.
///
/// | URL | Prefix |
/// |-----|--------|
/// | `https://alice.github.io/widget-docs/guide/` | `widget-docs` |
/// | `https://docs.example.com/guide/` | none |
/// | `http://localhost:4173/` | none |
pub fn detect_path_prefix(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let multi_tenant = MULTI_TENANT_HOSTS
        .iter()
        .any(|suffix| host.strip_suffix(suffix).is_some_and(|rest| rest.ends_with('.')));
    if !multi_tenant {
        return None;
    }

    let first = url.path_segments()?.next()?;
    (!first.is_empty()).then(|| first.to_string())
}

// ============================================================================
// Injection
// ============================================================================

/// Injects fetched partials into host elements of a page tree.
pub struct PartialLoader<'a> {
    fetcher: &'a dyn PartialFetcher,
}

impl<'a> PartialLoader<'a> {
    pub const fn new(fetcher: &'a dyn PartialFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch `partial` and replace the content of the element with id
    /// `host_id`.
    ///
    /// - Host absent: `Ok(None)` - the page simply lacks that slot.
    /// - Fetch failure: `Err`, host content untouched.
    /// - Success: host content replaced, `Ok(Some(host))` so the caller
    ///   can run follow-up enhancement on the injected subtree.
    pub async fn inject(
        &self,
        doc: &mut Document,
        host_id: &str,
        partial: &str,
    ) -> Result<Option<NodeId>, FetchError> {
        let Some(host) = doc.element_by_id(host_id) else {
            return Ok(None);
        };

        let markup = self.fetcher.fetch(partial).await?;
        doc.replace_children_with_html(host, &markup)
            .map_err(|err| FetchError::Malformed {
                path: partial.to_string(),
                message: format!("{err:#}"),
            })?;

        Ok(Some(host))
    }
}
