//! Minimal `{{key}}` template engine used for control files
//!
//! `{{key}}` must resolve to a value; `{{key?}}` may be absent, in which
//! case the whole line containing it is dropped.

use pkg_deb_core::PackageOptions;

use crate::error::{DebianError, Result};

/// Source of values for template placeholders
pub trait TemplateData {
    /// Value for `key`, or `None` when the field is unset or unknown
    fn lookup(&self, key: &str) -> Option<String>;
}

impl TemplateData for PackageOptions {
    fn lookup(&self, key: &str) -> Option<String> {
        PackageOptions::lookup(self, key)
    }
}

impl<K, V> TemplateData for std::collections::BTreeMap<K, V>
where
    K: std::borrow::Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.as_ref().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field { key: String, optional: bool },
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    lines: Vec<Vec<Segment>>,
}

impl Template {
    /// Parse template text
    pub fn parse(source: &str) -> Result<Self> {
        let lines = source
            .lines()
            .enumerate()
            .map(|(index, line)| parse_line(line, index + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { lines })
    }

    /// Keys that must resolve for rendering to succeed, in template order
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields().filter(|(_, optional)| !optional).map(|(key, _)| key).collect()
    }

    /// Render the template
    ///
    /// All required fields are checked before any text is produced; the
    /// first absent one fails with [`DebianError::MissingField`].
    pub fn render(&self, data: &impl TemplateData) -> Result<String> {
        if let Some(missing) = self.required_fields().into_iter().find(|k| data.lookup(k).is_none())
        {
            return Err(DebianError::missing_field(missing));
        }

        let mut output = String::new();
        'lines: for line in &self.lines {
            let mut rendered = String::new();
            for segment in line {
                match segment {
                    Segment::Text(text) => rendered.push_str(text),
                    Segment::Field { key, optional } => match data.lookup(key) {
                        Some(value) if !(*optional && value.is_empty()) => {
                            rendered.push_str(&value)
                        }
                        Some(_) | None if *optional => continue 'lines,
                        _ => return Err(DebianError::missing_field(key.as_str())),
                    },
                }
            }
            output.push_str(&rendered);
            output.push('\n');
        }

        Ok(output)
    }

    fn fields(&self) -> impl Iterator<Item = (&str, bool)> {
        self.lines.iter().flatten().filter_map(|segment| match segment {
            Segment::Field { key, optional } => Some((key.as_str(), *optional)),
            Segment::Text(_) => None,
        })
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Text(rest[..start].to_string()));
        }
        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or_else(|| DebianError::invalid_template(line_number, "Unterminated placeholder"))?;

        let raw = after_open[..end].trim();
        let (key, optional) = match raw.strip_suffix('?') {
            Some(key) => (key.trim_end(), true),
            None => (raw, false),
        };
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DebianError::invalid_template(
                line_number,
                format!("Invalid placeholder name {raw:?}"),
            ));
        }

        segments.push(Segment::Field { key: key.to_string(), optional });
        rest = &after_open[end + 2..];
    }

    if rest.contains("}}") {
        return Err(DebianError::invalid_template(line_number, "Unmatched closing braces"));
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }

    Ok(segments)
}
