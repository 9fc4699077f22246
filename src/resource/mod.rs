//! Resource models and content-type classification
//!
//! - [`ResourceKind`] / [`classify`] - maps a resolved media type to a model kind
//! - [`WebResource`] - the typed result of a retrieval

mod kind;
mod model;

pub use kind::{ResourceKind, classify};
pub use model::{JsonDocument, Resource, WebPage, WebResource};
