//! shellcache - Offline precache engine for static sites with slippy maps
//!
//! This library provides the offline layer of a static site: it precaches the
//! site shell plus the map tiles covering a region into a versioned cache
//! generation, garbage-collects stale generations, and answers requests cache
//! first with a transparent fallback image for unreachable map tiles.
//!
//! # Modules
//!
//! - [`coord`]: slippy-map tile math and region coverage
//! - [`manifest`]: tile URL templates and the precache manifest
//! - [`cache`]: cache generations, providers and the lifecycle manager
//! - [`router`]: cache-first fetch interception
//! - [`worker`]: lifecycle event host tying the pieces together

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod manifest;
pub mod network;
pub mod router;
pub mod worker;

/// Crate version, as reported by the command line host.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!version().is_empty(), "Version should not be empty");
    }
}
