use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media_type::MediaType;

/// Model kind a retrieved resource is built as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Generic,
    Page,
    JsonDocument,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Generic => "generic",
            ResourceKind::Page => "page",
            ResourceKind::JsonDocument => "json_document",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PAGE_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];
const JSON_TYPES: &[&str] = &["application/json", "text/json"];

fn models_page(media_type: &MediaType) -> bool {
    PAGE_TYPES.contains(&media_type.type_subtype().as_str())
}

fn models_json(media_type: &MediaType) -> bool {
    JSON_TYPES.contains(&media_type.type_subtype().as_str())
        || (media_type.type_() == "application" && media_type.suffix() == Some("json"))
}

/// Markup is checked before JSON; anything unmatched is generic
pub fn classify(media_type: &MediaType) -> ResourceKind {
    if models_page(media_type) {
        ResourceKind::Page
    } else if models_json(media_type) {
        ResourceKind::JsonDocument
    } else {
        ResourceKind::Generic
    }
}
