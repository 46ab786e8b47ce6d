//! Control file rendering

use std::path::Path;

use pkg_deb_core::PackageOptions;
use tracing::debug;

use crate::error::Result;
use crate::template::Template;

/// Control stanza used unless a custom template is configured
pub const DEFAULT_CONTROL_TEMPLATE: &str = "\
Package: {{name}}
Version: {{version}}
Section: {{section}}
Priority: {{priority}}
Architecture: {{arch}}
Installed-Size: {{size}}
Maintainer: {{maintainer}}
Homepage: {{homepage?}}
Pre-Depends: {{pre_depends?}}
Depends: {{depends?}}
Recommends: {{recommends?}}
Suggests: {{suggests?}}
Enhances: {{enhances?}}
Description: {{description}}
{{product_description?}}
";

/// Renders `DEBIAN/control` from package options
#[derive(Debug, Clone)]
pub struct ControlRenderer {
    template: Template,
}

impl Default for ControlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlRenderer {
    /// Create a renderer using [`DEFAULT_CONTROL_TEMPLATE`]
    pub fn new() -> Self {
        Self {
            template: Template::parse(DEFAULT_CONTROL_TEMPLATE)
                .expect("Default control template is valid"),
        }
    }

    /// Create a renderer from custom template text
    pub fn with_template(source: &str) -> Result<Self> {
        Ok(Self { template: Template::parse(source)? })
    }

    /// Load a custom template from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading control template from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::with_template(&source)
    }

    /// Render the control stanza; the text always ends with a newline
    pub fn render(&self, options: &PackageOptions) -> Result<String> {
        let mut control = self.template.render(options)?;
        if !control.ends_with('\n') {
            control.push('\n');
        }
        Ok(control)
    }
}
