//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn url() -> Option<String> {
        None
    }

    pub fn path_prefix() -> String {
        String::new()
    }

    pub fn language() -> String {
        "en".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn pages() -> PathBuf {
        "pages".into()
    }

    pub fn partials() -> PathBuf {
        "partials".into()
    }

    pub fn assets() -> PathBuf {
        "assets".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn partials_url() -> Option<String> {
        None
    }

    pub fn header_host() -> String {
        "site-header".into()
    }

    pub fn sidebar_host() -> String {
        "sidebar-container".into()
    }

    pub fn header_file() -> String {
        "header.html".into()
    }

    pub fn sidebar_file() -> String {
        "sidebar.html".into()
    }

    pub fn zoom_class() -> String {
        "zoomable".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        4173
    }
}
