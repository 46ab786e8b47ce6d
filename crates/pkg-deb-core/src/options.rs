//! Canonical package options and caller overrides

use serde::{Deserialize, Deserializer, Serialize};

/// The canonical, normalized description of a package
///
/// Every pipeline stage reads from this record. It is produced by the
/// options normalizer, which guarantees that `name` is a valid Debian package
/// name, `version` uses Debian pre-release ordering and at least one of the
/// descriptions is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageOptions {
    /// Sanitized package name
    pub name: String,

    /// Debian-ordered version
    pub version: String,

    /// Target architecture
    pub arch: String,

    /// `Name <email>` or `Name`
    pub maintainer: Option<String>,

    /// Single-line synopsis
    pub description: Option<String>,

    /// Extended description, already wrapped and indented
    pub product_description: Option<String>,

    /// Installed size in KiB
    pub size: u64,

    /// Archive section
    pub section: String,

    /// Package priority
    pub priority: String,

    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
    pub enhances: Vec<String>,
    pub pre_depends: Vec<String>,
    pub lintian_overrides: Vec<String>,

    pub bin: Option<String>,
    pub generic_name: Option<String>,
    pub product_name: Option<String>,
    pub categories: Vec<String>,
    pub mime_type: Vec<String>,
    pub exec_arguments: Vec<String>,
    pub homepage: String,
    pub revision: Option<String>,
}

impl PackageOptions {
    /// The `<name>_<version>_<arch>` token used for the staging directory and
    /// the built artifact
    pub fn package_token(&self) -> String {
        format!("{}_{}_{}", self.name, self.version, self.arch)
    }

    /// Look up a field by its template key
    ///
    /// Lists are joined with `", "` (exec arguments with a single space).
    /// Returns `None` for unset optional fields and unknown keys.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let list = |items: &[String]| Some(items.join(", "));

        match key {
            "name" => Some(self.name.clone()),
            "version" => Some(self.version.clone()),
            "arch" => Some(self.arch.clone()),
            "maintainer" => self.maintainer.clone(),
            "description" => self.description.clone(),
            "product_description" => self.product_description.clone(),
            "size" => Some(self.size.to_string()),
            "section" => Some(self.section.clone()),
            "priority" => Some(self.priority.clone()),
            "depends" => list(&self.depends),
            "recommends" => list(&self.recommends),
            "suggests" => list(&self.suggests),
            "enhances" => list(&self.enhances),
            "pre_depends" => list(&self.pre_depends),
            "lintian_overrides" => list(&self.lintian_overrides),
            "bin" => self.bin.clone(),
            "generic_name" => self.generic_name.clone(),
            "product_name" => self.product_name.clone(),
            "categories" => list(&self.categories),
            "mime_type" => list(&self.mime_type),
            "exec_arguments" => Some(self.exec_arguments.join(" ")),
            "homepage" => Some(self.homepage.clone()),
            "revision" => self.revision.clone(),
            _ => None,
        }
    }
}

/// Caller-supplied values that take precedence over manifest defaults
///
/// Scalar fields replace the default when set. Relation lists (`depends`,
/// `recommends`, `suggests`, `enhances`, `pre_depends`) and
/// `lintian_overrides` come only from the caller and are trimmed and
/// de-duplicated; `categories`, `mime_type` and `exec_arguments` replace the
/// defaults when non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackageOverrides {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggests: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enhances: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_depends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lintian_overrides: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mime_type: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exec_arguments: Vec<String>,
}

/// A scalar that YAML may have typed as a number (`version: 2.0`, `revision: 1`)
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

/// Accept a string or a bare number for a textual field
///
/// Whole floats keep one decimal so `2.0` stays `2.0`. Trailing zeros beyond
/// that (`1.10`) are lost by the YAML parser and need quoting.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.1}"),
        Scalar::Float(f) => f.to_string(),
    }))
}
