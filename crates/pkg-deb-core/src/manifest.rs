//! Application manifest (`package.json`) representation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The subset of an application's `package.json` that packaging cares about
///
/// Unknown keys are preserved in [`PackageManifest::extra`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name, possibly scoped (`@scope/name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Short, single-line description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,

    /// Human readable product name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    /// Generic name (e.g. "Text Editor")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,

    /// Project homepage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Package author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Person>,

    /// Additional contributors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Person>,

    /// Debian revision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Every other key of the manifest
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A person entry as found in `author` or `contributors`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Person {
    /// Free text form: `Name <email> (url)`
    Text(String),

    /// Structured form; the name may be missing
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl PackageManifest {
    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// The person the maintainer field is derived from: the author, or the
    /// first contributor when no author is given
    pub fn primary_author(&self) -> Option<&Person> {
        self.author.as_ref().or_else(|| self.contributors.first())
    }

    /// Check whether the manifest carries no information at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
