//! Maintainer derivation from manifest author metadata

use pkg_deb_core::Person;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DebianError, Result};

/// A parsed author entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub url: Option<String>,
}

impl Author {
    /// Format as a Debian `Maintainer` value; the URL is dropped
    pub fn to_maintainer(&self) -> String {
        match &self.email {
            Some(email) => format!("{} <{}>", self.name, email),
            None => self.name.clone(),
        }
    }
}

/// Parser for free text author strings like `Name <email> (url)`
#[derive(Debug, Clone)]
pub struct AuthorParser {
    author_regex: Regex,
}

impl Default for AuthorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorParser {
    /// Create a new author parser
    pub fn new() -> Self {
        Self {
            author_regex: Regex::new(r"^\s*([^<(]*?)\s*(?:<([^>]*)>)?\s*(?:\(([^)]*)\))?\s*$")
                .expect("Valid regex"),
        }
    }

    /// Parse free text into name, email and url
    pub fn parse(&self, text: &str) -> Result<Author> {
        let captures = self
            .author_regex
            .captures(text)
            .ok_or_else(|| DebianError::invalid_author(text, "Expected `Name <email> (url)`"))?;

        let name = captures.get(1).map_or("", |m| m.as_str()).trim();
        if name.is_empty() {
            return Err(DebianError::invalid_author(text, "Author name is empty"));
        }

        Ok(Author {
            name: name.to_string(),
            email: non_empty(captures.get(2).map(|m| m.as_str())),
            url: non_empty(captures.get(3).map(|m| m.as_str())),
        })
    }

    /// Interpret a manifest person entry
    ///
    /// A structured entry without a name yields `None`; free text without a
    /// name is an error.
    pub fn from_person(&self, person: &Person) -> Result<Option<Author>> {
        match person {
            Person::Text(text) => self.parse(text).map(Some),
            Person::Structured { name, email, url } => {
                Ok(non_empty(name.as_deref()).map(|name| Author {
                    name,
                    email: non_empty(email.as_deref()),
                    url: non_empty(url.as_deref()),
                }))
            }
        }
    }

    /// Derive the `Maintainer` value; no usable author means no maintainer
    pub fn maintainer(&self, author: Option<&Person>) -> Result<Option<String>> {
        let Some(person) = author else {
            return Ok(None);
        };
        Ok(self.from_person(person)?.map(|a| a.to_maintainer()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
