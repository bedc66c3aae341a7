//! Cache generation identifiers.
//!
//! A deploy names its cache `<site>-cache-v<N>`. Bumping `N` creates a new
//! generation; activation deletes every generation whose name differs from
//! the current one.

use std::fmt;
use std::str::FromStr;

use super::traits::CacheError;

const VERSION_MARKER: &str = "-cache-v";

/// Identifier of one cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheVersion {
    site: String,
    number: u32,
}

impl CacheVersion {
    /// Creates a version for `site` at generation `number`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::InvalidVersion` if the site label is empty or
    /// contains characters other than ASCII alphanumerics, `-`, `_` or `.`.
    pub fn new(site: impl Into<String>, number: u32) -> Result<Self, CacheError> {
        let site = site.into();
        let invalid = |reason: &str| CacheError::InvalidVersion {
            value: format!("{}{}{}", site, VERSION_MARKER, number),
            reason: reason.to_string(),
        };

        if site.is_empty() {
            return Err(invalid("site label is empty"));
        }
        if !site
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "site label may only contain letters, digits, '-', '_' and '.'",
            ));
        }

        Ok(Self { site, number })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// The generation name used as the store key.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// The following generation for the same site.
    pub fn next(&self) -> Self {
        Self {
            site: self.site.clone(),
            number: self.number.saturating_add(1),
        }
    }

    /// Returns true if `name` belongs to the same site (any generation).
    pub fn same_site(&self, name: &str) -> bool {
        name.parse::<CacheVersion>()
            .map(|other| other.site == self.site)
            .unwrap_or(false)
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.site, VERSION_MARKER, self.number)
    }
}

impl FromStr for CacheVersion {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (site, number) = s
            .rsplit_once(VERSION_MARKER)
            .ok_or_else(|| CacheError::InvalidVersion {
                value: s.to_string(),
                reason: format!("expected <site>{}<N>", VERSION_MARKER),
            })?;

        let number = number.parse::<u32>().map_err(|_| CacheError::InvalidVersion {
            value: s.to_string(),
            reason: format!("generation {:?} is not a non-negative integer", number),
        })?;

        Self::new(site, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_follows_naming_convention() {
        let version = CacheVersion::new("guestbook", 7).unwrap();
        assert_eq!(version.to_string(), "guestbook-cache-v7");
        assert_eq!(version.name(), "guestbook-cache-v7");
    }

    #[test]
    fn test_parse_roundtrip() {
        let version: CacheVersion = "beach-house-cache-v12".parse().unwrap();
        assert_eq!(version.site(), "beach-house");
        assert_eq!(version.number(), 12);
        assert_eq!(version.to_string(), "beach-house-cache-v12");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("guestbook".parse::<CacheVersion>().is_err());
        assert!("guestbook-cache-v".parse::<CacheVersion>().is_err());
        assert!("guestbook-cache-vX".parse::<CacheVersion>().is_err());
        assert!("-cache-v1".parse::<CacheVersion>().is_err());
        assert!("a b-cache-v1".parse::<CacheVersion>().is_err());
    }

    #[test]
    fn test_next_bumps_generation() {
        let version = CacheVersion::new("guestbook", 2).unwrap();
        let next = version.next();
        assert_eq!(next.to_string(), "guestbook-cache-v3");
        assert!(next > version);
    }

    #[test]
    fn test_same_site() {
        let version = CacheVersion::new("guestbook", 2).unwrap();
        assert!(version.same_site("guestbook-cache-v1"));
        assert!(!version.same_site("other-cache-v1"));
        assert!(!version.same_site("tiles"));
    }
}
