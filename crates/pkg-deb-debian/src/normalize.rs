//! Derivation of canonical [`PackageOptions`] from manifest data and caller
//! overrides

use pkg_deb_core::{ManifestDefaults, PackageManifest, PackageOptions, PackageOverrides};
use tracing::debug;

use crate::description::{normalize_description, normalize_extended_description};
use crate::error::{DebianError, Result};
use crate::maintainer::AuthorParser;
use crate::name::sanitize_name;
use crate::version::{VersionHandler, DEFAULT_VERSION};

/// Section used when the caller does not choose one
pub const DEFAULT_SECTION: &str = "utils";

/// Priority used when the caller does not choose one
pub const DEFAULT_PRIORITY: &str = "optional";

/// Merges manifest defaults, packaging defaults and caller overrides, then
/// applies the Debian naming, versioning and description rules
#[derive(Debug, Clone, Default)]
pub struct OptionsNormalizer {
    version_handler: VersionHandler,
    author_parser: AuthorParser,
}

impl OptionsNormalizer {
    /// Create a new options normalizer
    pub fn new() -> Self {
        Self { version_handler: VersionHandler::new(), author_parser: AuthorParser::new() }
    }

    /// Build the canonical options record
    ///
    /// `size_bytes` is the total size of the staged payload; it is stored in
    /// KiB, rounded up.
    pub fn normalize(
        &self,
        manifest: &PackageManifest,
        overrides: &PackageOverrides,
        size_bytes: u64,
    ) -> Result<PackageOptions> {
        let defaults = ManifestDefaults::from_manifest(manifest);

        let raw_name = first_set(&overrides.name, &defaults.name)
            .ok_or_else(|| DebianError::invalid_package_name("", "No package name provided"))?;
        let name = sanitize_name(&raw_name)?;

        let raw_version = first_set(&overrides.version, &manifest.version)
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let version = self.version_handler.transform(raw_version.trim());

        let revision =
            first_set(&overrides.revision, &defaults.revision).map(|r| r.trim().to_string());
        let full_version = match &revision {
            Some(revision) => self.version_handler.with_revision(&version, revision)?,
            None => version.clone(),
        };

        let arch = overrides
            .arch
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(DebianError::MissingArchitecture)?
            .to_string();

        let maintainer = match &overrides.maintainer {
            Some(maintainer) => Some(maintainer.clone()),
            None => self.author_parser.maintainer(manifest.primary_author())?,
        };

        let (description, product_description) = descriptions(
            first_set(&overrides.description, &defaults.description),
            first_set(&overrides.product_description, &defaults.product_description),
        )?;

        let options = PackageOptions {
            bin: first_set(&overrides.bin, &defaults.bin).or_else(|| Some(name.clone())),
            product_name: first_set(&overrides.product_name, &defaults.product_name)
                .or_else(|| Some(name.clone())),
            generic_name: first_set(&overrides.generic_name, &defaults.generic_name)
                .or_else(|| overrides.product_name.clone())
                .or_else(|| Some(name.clone())),
            name,
            version,
            arch,
            maintainer,
            description,
            product_description,
            size: size_bytes.div_ceil(1024),
            section: overrides.section.clone().unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            priority: overrides.priority.clone().unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            depends: unique(&overrides.depends),
            recommends: unique(&overrides.recommends),
            suggests: unique(&overrides.suggests),
            enhances: unique(&overrides.enhances),
            pre_depends: unique(&overrides.pre_depends),
            lintian_overrides: unique(&overrides.lintian_overrides),
            categories: replace_non_empty(defaults.categories, &overrides.categories),
            mime_type: replace_non_empty(defaults.mime_type, &overrides.mime_type),
            exec_arguments: replace_non_empty(defaults.exec_arguments, &overrides.exec_arguments),
            homepage: overrides.homepage.clone().unwrap_or(defaults.homepage),
            revision,
        };

        debug!(
            "Normalized options for {} (version {full_version}, arch {}, {} KiB)",
            options.name, options.arch, options.size
        );

        Ok(options)
    }
}

/// Resolve and normalize both descriptions
///
/// A lone synopsis doubles as the extended description; a lone extended
/// description provides the synopsis from its first non-empty line.
fn descriptions(
    description: Option<String>,
    product_description: Option<String>,
) -> Result<(Option<String>, Option<String>)> {
    let (description, product_description) = match (description, product_description) {
        (None, None) => return Err(DebianError::MissingDescription),
        (Some(d), None) => (d.clone(), d),
        (None, Some(p)) => {
            let synopsis = p
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or_default()
                .to_string();
            (synopsis, p)
        }
        (Some(d), Some(p)) => (d, p),
    };

    Ok((
        Some(normalize_description(&description)),
        Some(normalize_extended_description(&product_description)),
    ))
}

fn first_set(preferred: &Option<String>, fallback: &Option<String>) -> Option<String> {
    preferred
        .iter()
        .chain(fallback.iter())
        .find(|v| !v.trim().is_empty())
        .cloned()
}

/// Trimmed, non-empty entries without duplicates, in first-seen order
fn unique(items: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !merged.iter().any(|m| m == item) {
            merged.push(item.to_string());
        }
    }
    merged
}

fn replace_non_empty(default: Vec<String>, replacement: &[String]) -> Vec<String> {
    if replacement.is_empty() {
        default
    } else {
        replacement.to_vec()
    }
}
