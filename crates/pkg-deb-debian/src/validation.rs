//! Validation of rendered control stanzas

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::description::WRAP_WIDTH;
use crate::error::{DebianError, Result};
use crate::name::sanitize_name;

/// Fields every binary package control file must carry
pub const REQUIRED_FIELDS: &[&str] =
    &["Package", "Version", "Architecture", "Maintainer", "Description"];

/// Fields that are expected but not required
const RECOMMENDED_FIELDS: &[&str] = &["Section", "Priority", "Installed-Size"];

/// Control stanza validator
#[derive(Debug)]
pub struct ControlValidator {
    /// Treat warnings as errors
    strict_mode: bool,
}

impl Default for ControlValidator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ControlValidator {
    /// Create a new validator
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Inspect a control stanza and collect findings
    pub fn validate(&self, content: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        let mut current_field: Option<String> = None;

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;

            if line.trim().is_empty() {
                result.errors.push(format!("Line {line_number}: empty line inside stanza"));
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if current_field.is_none() {
                    result
                        .errors
                        .push(format!("Line {line_number}: continuation line without a field"));
                }
                if line.chars().count() > WRAP_WIDTH + 1 {
                    result.warnings.push(format!(
                        "Line {line_number}: continuation line exceeds {} characters",
                        WRAP_WIDTH + 1
                    ));
                }
                continue;
            }

            match line.split_once(':') {
                Some((field, value)) if is_field_name(field) => {
                    if result.fields.iter().any(|(f, _)| f.eq_ignore_ascii_case(field)) {
                        result.errors.push(format!("Line {line_number}: duplicate field {field}"));
                    }
                    result.fields.push((field.to_string(), value.trim().to_string()));
                    current_field = Some(field.to_string());
                }
                _ => {
                    result.errors.push(format!("Line {line_number}: expected `Field: value`"));
                }
            }
        }

        for &field in REQUIRED_FIELDS {
            match result.field(field).map(str::is_empty) {
                Some(false) => {}
                Some(true) => result.errors.push(format!("Required field {field} is empty")),
                None => result.errors.push(format!("Missing required field: {field}")),
            }
        }

        for &field in RECOMMENDED_FIELDS {
            if result.field(field).is_none() {
                result.warnings.push(format!("Missing {field} field"));
            }
        }

        if let Some(package) = result.field("Package").filter(|p| !p.is_empty()) {
            if sanitize_name(package).ok().as_deref() != Some(package) {
                let message = format!("Package name {package:?} is not a valid Debian name");
                result.errors.push(message);
            }
        }

        if let Some(version) = result.field("Version") {
            if !version.starts_with(|c: char| c.is_ascii_digit()) {
                let message = format!("Version {version:?} should start with a digit");
                result.warnings.push(message);
            }
        }

        result.is_valid =
            result.errors.is_empty() && (!self.strict_mode || result.warnings.is_empty());

        debug!("Control validation: {}", result.summary());
        result
    }

    /// Validate and fail on the first problem
    pub fn ensure_valid(&self, content: &str, package_name: &str) -> Result<ValidationResult> {
        let result = self.validate(content);
        if result.is_valid {
            return Ok(result);
        }

        let problems = if result.errors.is_empty() { &result.warnings } else { &result.errors };
        Err(DebianError::invalid_control_file(package_name, problems.join("; ")))
    }
}

fn is_field_name(field: &str) -> bool {
    !field.is_empty()
        && !field.starts_with('#')
        && !field.starts_with('-')
        && field.chars().all(|c| c.is_ascii_graphic() && c != ':')
}

/// Result of control stanza validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the stanza is acceptable
    pub is_valid: bool,
    /// Fields in stanza order
    pub fields: Vec<(String, String)>,
    /// Validation warnings
    pub warnings: Vec<String>,
    /// Validation errors
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a new validation result
    pub fn new() -> Self {
        Self { is_valid: false, fields: Vec::new(), warnings: Vec::new(), errors: Vec::new() }
    }

    /// Value of a field; field names are case-insensitive
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get summary of validation
    pub fn summary(&self) -> String {
        format!(
            "Valid: {}, Fields: {}, Warnings: {}, Errors: {}",
            self.is_valid,
            self.fields.len(),
            self.warnings.len(),
            self.errors.len()
        )
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
