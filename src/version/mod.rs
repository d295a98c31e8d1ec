//! Version staleness checks
//!
//! This module compares a scraper's documented release against the latest
//! upstream release, and looks that latest release up on npm or GitHub.

mod latest;

pub use latest::{LatestVersionSource, VersionFetcher, GITHUB_API, NPM_REGISTRY};

/// Returns true if `latest` is ahead of `installed` on major or minor version
///
/// Components are compared numerically (a component without leading digits
/// counts as 0). Only the first two positions are considered, and the
/// comparison stops at the shorter of the two versions, so patch-level
/// differences never make a scraper outdated.
///
/// # Examples
///
/// ```
/// use doc_harvest::is_outdated;
///
/// assert!(is_outdated("1.1", "1.2"));
/// assert!(!is_outdated("1.1.1", "1.1.2"));
/// assert!(!is_outdated("2.0", "1.9"));
/// ```
pub fn is_outdated(installed: &str, latest: &str) -> bool {
    let installed = version_parts(installed);
    let latest = version_parts(latest);

    for i in 0..2 {
        if i >= installed.len() || i >= latest.len() {
            break;
        }
        if latest[i] > installed[i] {
            return true;
        }
        if latest[i] < installed[i] {
            return false;
        }
    }

    false
}

fn version_parts(version: &str) -> Vec<u64> {
    version.split('.').map(leading_number).collect()
}

/// Parses the leading digits of a component, "3rc1" -> 3, "beta" -> 0
fn leading_number(component: &str) -> u64 {
    let digits: String = component
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_bump_is_outdated() {
        assert!(is_outdated("1", "2"));
    }

    #[test]
    fn test_minor_bump_is_outdated() {
        assert!(is_outdated("1.1", "1.2"));
    }

    #[test]
    fn test_patch_bump_is_ignored() {
        assert!(!is_outdated("1.1.1", "1.1.2"));
    }

    #[test]
    fn test_installed_ahead_is_not_outdated() {
        assert!(!is_outdated("2.0", "1.9"));
    }

    #[test]
    fn test_shorter_version_stops_comparison() {
        assert!(!is_outdated("1.2", "1.2.5"));
        assert!(!is_outdated("1", "1.9"));
    }

    #[test]
    fn test_equal_versions() {
        assert!(!is_outdated("4.17.21", "4.17.21"));
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert!(is_outdated("1.9", "1.10"));
        assert!(!is_outdated("1.10", "1.9"));
    }

    #[test]
    fn test_non_numeric_components() {
        assert!(is_outdated("5.0.0-beta", "5.1"));
        assert!(!is_outdated("5.0rc1", "5.0"));
        assert_eq!(leading_number("beta"), 0);
    }
}
