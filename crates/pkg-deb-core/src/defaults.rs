//! Defaults derived from an application manifest

use serde::{Deserialize, Serialize};

use crate::manifest::PackageManifest;

/// Desktop categories used when the manifest does not say otherwise
pub const DEFAULT_CATEGORIES: &[&str] = &["GNOME", "GTK", "Utility"];

/// Human-readable metadata derived from a [`PackageManifest`]
///
/// This is a pure mapping; nothing here is sanitized or validated yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestDefaults {
    pub name: Option<String>,
    pub bin: Option<String>,
    pub description: Option<String>,
    pub product_description: Option<String>,
    pub product_name: Option<String>,
    pub generic_name: Option<String>,
    pub homepage: String,
    pub categories: Vec<String>,
    pub mime_type: Vec<String>,
    pub exec_arguments: Vec<String>,
    pub revision: Option<String>,
}

impl ManifestDefaults {
    /// Map manifest fields to packaging defaults
    pub fn from_manifest(manifest: &PackageManifest) -> Self {
        let product_name = manifest.product_name.clone().or_else(|| manifest.name.clone());

        Self {
            name: manifest.name.clone(),
            bin: manifest.name.clone(),
            description: manifest.description.clone(),
            product_description: manifest
                .product_description
                .clone()
                .or_else(|| manifest.description.clone()),
            generic_name: manifest.generic_name.clone().or_else(|| product_name.clone()),
            product_name,
            homepage: manifest.homepage.clone().unwrap_or_default(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            mime_type: Vec::new(),
            exec_arguments: Vec::new(),
            revision: manifest.revision.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn manifest(json: &str) -> PackageManifest {
        PackageManifest::from_json(json).unwrap()
    }

    #[test]
    fn test_defaults_with_all_descriptions() {
        let defaults = ManifestDefaults::from_manifest(&manifest(
            r#"{
                "name": "nori-pkg",
                "description": "pkg for Nori-cat.",
                "productDescription": "A nice package for cat.",
                "homepage": "https://github.com/mongodb-js/pkg-deb"
            }"#,
        ));

        assert_eq!(
            defaults,
            ManifestDefaults {
                name: Some("nori-pkg".to_string()),
                bin: Some("nori-pkg".to_string()),
                description: Some("pkg for Nori-cat.".to_string()),
                product_description: Some("A nice package for cat.".to_string()),
                product_name: Some("nori-pkg".to_string()),
                generic_name: Some("nori-pkg".to_string()),
                homepage: "https://github.com/mongodb-js/pkg-deb".to_string(),
                categories: vec!["GNOME".to_string(), "GTK".to_string(), "Utility".to_string()],
                mime_type: vec![],
                exec_arguments: vec![],
                revision: None,
            }
        );
    }

    #[test]
    fn test_defaults_for_empty_manifest() {
        let defaults = ManifestDefaults::from_manifest(&PackageManifest::default());

        assert_eq!(defaults.name, None);
        assert_eq!(defaults.bin, None);
        assert_eq!(defaults.description, None);
        assert_eq!(defaults.product_description, None);
        assert_eq!(defaults.generic_name, None);
        assert_eq!(defaults.homepage, "");
        assert_eq!(defaults.categories.len(), 3);
    }

    #[test]
    fn test_product_description_falls_back_to_description() {
        let defaults = ManifestDefaults::from_manifest(&manifest(
            r#"{
                "name": "nori-pkg",
                "description": "pkg for Nori-cat.",
                "homepage": "https://example.test"
            }"#,
        ));

        assert_eq!(defaults.name.as_deref(), Some("nori-pkg"));
        assert_eq!(defaults.generic_name.as_deref(), Some("nori-pkg"));
        assert_eq!(defaults.product_description.as_deref(), Some("pkg for Nori-cat."));
    }

    #[test]
    fn test_generic_name_is_kept_when_provided() {
        let defaults = ManifestDefaults::from_manifest(&manifest(
            r#"{ "name": "nori-pkg", "genericName": "pkg", "description": "pkg for Nori-cat." }"#,
        ));

        assert_eq!(defaults.generic_name.as_deref(), Some("pkg"));
        assert_eq!(defaults.product_name.as_deref(), Some("nori-pkg"));
    }
}
