//! Version handling for converting SemVer versions to Debian format
//!
//! See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#version>

use std::cmp::Ordering;

use regex::Regex;

use crate::error::{DebianError, Result};

/// Version used when neither the caller nor the manifest provides one
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Version handler for SemVer to Debian conversion
#[derive(Debug, Clone)]
pub struct VersionHandler {
    /// Matches a trailing pre-release suffix directly after a digit
    prerelease_regex: Regex,
}

impl Default for VersionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionHandler {
    /// Create a new version handler
    pub fn new() -> Self {
        Self {
            // Matches "1.2.3-beta1", "1.2.3rc", "2.0.0.dev-4"
            prerelease_regex: Regex::new(
                r"(\d)[_.+-]?((?i:rc|pre|dev|beta|alpha)[_.+-]?\d*)$",
            )
            .expect("Valid regex"),
        }
    }

    /// Rewrite a trailing pre-release marker to use `~`
    ///
    /// `~` sorts before the empty string in Debian version ordering, so
    /// `1.2.3~beta1` is older than `1.2.3`. Versions without such a suffix
    /// are returned unchanged.
    pub fn transform(&self, version: &str) -> String {
        self.prerelease_regex
            .replace(version, "${1}~${2}")
            .into_owned()
    }

    /// Append a Debian revision (`1.2.3` + `2` → `1.2.3-2`)
    pub fn with_revision(&self, version: &str, revision: &str) -> Result<String> {
        if version.is_empty() {
            return Err(DebianError::invalid_version(version, "Version cannot be empty"));
        }
        if revision.is_empty() || revision.contains(|c: char| c.is_whitespace() || c == '-') {
            return Err(DebianError::invalid_version(
                format!("{version}-{revision}"),
                "Revision must be non-empty and contain no whitespace or hyphens",
            ));
        }

        Ok(format!("{version}-{revision}"))
    }
}

/// Transform a SemVer version into a Debian-ordered one
pub fn transform_version(version: &str) -> String {
    VersionHandler::new().transform(version)
}

/// Compare two Debian versions the way dpkg does
///
/// Versions are split into epoch, upstream version and revision; the
/// epochs are compared numerically and the remaining parts with dpkg's
/// mixed lexical/numeric algorithm, where `~` sorts before everything,
/// even the end of the string.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let left = DebianVersion::parse(left);
    let right = DebianVersion::parse(right);

    left.epoch
        .cmp(&right.epoch)
        .then_with(|| verrevcmp(left.upstream, right.upstream))
        .then_with(|| verrevcmp(left.revision, right.revision))
}

struct DebianVersion<'a> {
    epoch: u64,
    upstream: &'a str,
    revision: &'a str,
}

impl<'a> DebianVersion<'a> {
    fn parse(version: &'a str) -> Self {
        let version = version.trim();
        let (epoch, rest) = match version.split_once(':') {
            Some((epoch, rest)) => (epoch.parse().unwrap_or(0), rest),
            None => (0, version),
        };
        let (upstream, revision) = rest.rsplit_once('-').unwrap_or((rest, ""));

        Self { epoch, upstream, revision }
    }
}

fn char_order(c: Option<&u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(*c),
        Some(c) => i32::from(*c) + 256,
    }
}

fn verrevcmp(left: &str, right: &str) -> Ordering {
    let a = left.as_bytes();
    let b = right.as_bytes();
    let is_digit = |s: &[u8], i: usize| s.get(i).is_some_and(u8::is_ascii_digit);
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !is_digit(a, i)) || (j < b.len() && !is_digit(b, j)) {
            let ac = char_order(a.get(i));
            let bc = char_order(b.get(j));
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while is_digit(a, i) && is_digit(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }

        if is_digit(a, i) {
            return Ordering::Greater;
        }
        if is_digit(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}
