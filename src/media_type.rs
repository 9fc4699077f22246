//! Content-Type header resolution
//!
//! Turns a raw `Content-Type` value into a [`MediaType`]. Well-formed values
//! go through the `mime` parser; anything else is recovered on a best-effort
//! basis: invalid characters inside the type or subtype truncate that half,
//! and malformed parameters are dropped.

use mime::Mime;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to parse media type \"{raw}\"")]
pub struct MediaTypeParseError {
    raw: String,
}

impl MediaTypeParseError {
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Resolved media type: lowercase type/subtype plus parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaType {
    type_: String,
    subtype: String,
    parameters: BTreeMap<String, String>,
}

impl MediaType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_: type_.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
            parameters: BTreeMap::new(),
        }
    }

    /// Media type of a response that declared no content type
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Structured syntax suffix, e.g. `json` for `application/ld+json`
    pub fn suffix(&self) -> Option<&str> {
        self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn is_empty(&self) -> bool {
        self.type_.is_empty() && self.subtype.is_empty()
    }

    /// `type/subtype` string used for allow-list matching; empty when nothing was declared
    pub fn type_subtype(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.type_, self.subtype)
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_subtype())?;
        for (name, value) in &self.parameters {
            write!(f, "; {}={}", name, value)?;
        }
        Ok(())
    }
}

impl From<&Mime> for MediaType {
    fn from(mime: &Mime) -> Self {
        let mut media_type = MediaType::new(mime.type_().as_str(), mime.subtype().as_str());
        if let Some(suffix) = mime.suffix() {
            media_type.subtype = format!("{}+{}", media_type.subtype, suffix.as_str())
                .to_ascii_lowercase();
        }
        for (name, value) in mime.params() {
            media_type = media_type.with_parameter(name.as_str(), value.as_str().trim_matches('"'));
        }
        media_type
    }
}

/// Resolve a raw `Content-Type` header value.
///
/// Empty input yields [`MediaType::empty`]. Only input with no recoverable
/// type at all fails.
pub fn resolve(raw: &str) -> Result<MediaType, MediaTypeParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(MediaType::empty());
    }

    match raw.parse::<Mime>() {
        Ok(mime) => Ok(MediaType::from(&mime)),
        Err(_) => recover(raw),
    }
}

fn recover(raw: &str) -> Result<MediaType, MediaTypeParseError> {
    let mut sections = raw.split(';');
    let essence = sections.next().unwrap_or_default().trim();

    let (type_part, subtype_part) = essence.split_once('/').unwrap_or((essence, ""));
    let type_ = leading_token(type_part.trim());
    let subtype = leading_token(subtype_part.trim());

    if type_.is_empty() {
        return Err(MediaTypeParseError {
            raw: raw.to_string(),
        });
    }

    let mut media_type = MediaType::new(type_, subtype);
    for (name, value) in sections.filter_map(parse_parameter) {
        media_type = media_type.with_parameter(name, value);
    }

    tracing::debug!(raw, media_type = %media_type, "Recovered malformed media type");

    Ok(media_type)
}

/// Longest prefix made of RFC 7230 token characters
fn leading_token(value: &str) -> &str {
    let end = value
        .char_indices()
        .find(|&(_, c)| !is_token_char(c))
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    &value[..end]
}

fn parse_parameter(section: &str) -> Option<(&str, &str)> {
    let (name, value) = section.split_once('=')?;
    let name = name.trim();
    let value = value.trim();

    if name.is_empty() || !name.chars().all(is_token_char) {
        return None;
    }

    let value = match value.strip_prefix('"') {
        Some(quoted) => quoted.strip_suffix('"')?,
        None if !value.is_empty() && value.chars().all(is_token_char) => value,
        None => return None,
    };

    Some((name, value))
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
