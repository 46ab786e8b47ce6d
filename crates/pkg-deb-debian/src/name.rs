//! Package name sanitization
//!
//! See <https://www.debian.org/doc/debian-policy/ch-controlfields.html#source>

use crate::error::{DebianError, Result};

/// Divider used when flattening a scoped name (`@scope/name`)
pub const SCOPE_DIVIDER: &str = "-";

/// Turn an arbitrary application name into a valid Debian package name
///
/// A leading `@` is dropped and the scope separator replaced by
/// [`SCOPE_DIVIDER`], the result is lowercased and every character outside
/// `[-+.a-z0-9]` becomes `-`. Names shorter than two characters or not
/// starting with an ASCII letter or digit are rejected.
pub fn sanitize_name(name: &str) -> Result<String> {
    let unscoped = replace_scope_name(&name.to_lowercase(), SCOPE_DIVIDER);
    let sanitized: String = unscoped
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { '-' })
        .collect();

    if sanitized.len() < 2 {
        return Err(DebianError::invalid_package_name(
            name,
            "Package name must be at least two characters",
        ));
    }

    if !sanitized.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(DebianError::invalid_package_name(
            name,
            "Package name must start with an ASCII number or letter",
        ));
    }

    Ok(sanitized)
}

/// Normalize a scoped package name (`@scope/name` → `scope<divider>name`)
pub fn replace_scope_name(name: &str, divider: &str) -> String {
    name.strip_prefix('@').unwrap_or(name).replacen('/', divider, 1)
}

fn is_allowed_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '-' | '+' | '.')
}
