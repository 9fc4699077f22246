use bytes::Bytes;
use std::borrow::Cow;
use url::Url;

use super::kind::ResourceKind;
use crate::media_type::MediaType;
use crate::transport::Response;

/// Retrieved resource: effective URI, response and its resolved content type
#[derive(Debug, Clone)]
pub struct Resource {
    uri: Url,
    response: Response,
    content_type: MediaType,
}

impl Resource {
    pub fn new(uri: Url, response: Response, content_type: MediaType) -> Self {
        Self {
            uri,
            response,
            content_type,
        }
    }

    /// URI the resource was finally served from
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn content_type(&self) -> &MediaType {
        &self.content_type
    }

    pub fn body(&self) -> &Bytes {
        &self.response.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn content(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.response.body)
    }
}

/// Markup page (`text/html` and friends)
#[derive(Debug, Clone)]
pub struct WebPage {
    resource: Resource,
}

impl WebPage {
    pub fn character_set(&self) -> Option<&str> {
        self.resource.content_type().parameter("charset")
    }
}

/// JSON document
#[derive(Debug, Clone)]
pub struct JsonDocument {
    resource: Resource,
}

impl JsonDocument {
    pub fn data(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(self.resource.body())
    }
}

#[derive(Debug, Clone)]
pub enum WebResource {
    Generic(Resource),
    Page(WebPage),
    JsonDocument(JsonDocument),
}

impl WebResource {
    /// Build the model matching `kind`
    pub fn build(kind: ResourceKind, resource: Resource) -> Self {
        match kind {
            ResourceKind::Generic => WebResource::Generic(resource),
            ResourceKind::Page => WebResource::Page(WebPage { resource }),
            ResourceKind::JsonDocument => WebResource::JsonDocument(JsonDocument { resource }),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            WebResource::Generic(_) => ResourceKind::Generic,
            WebResource::Page(_) => ResourceKind::Page,
            WebResource::JsonDocument(_) => ResourceKind::JsonDocument,
        }
    }

    pub fn resource(&self) -> &Resource {
        match self {
            WebResource::Generic(resource) => resource,
            WebResource::Page(page) => &page.resource,
            WebResource::JsonDocument(document) => &document.resource,
        }
    }

    pub fn uri(&self) -> &Url {
        self.resource().uri()
    }

    pub fn response(&self) -> &Response {
        self.resource().response()
    }

    pub fn content_type(&self) -> &MediaType {
        self.resource().content_type()
    }

    pub fn body(&self) -> &Bytes {
        self.resource().body()
    }

    pub fn content(&self) -> Cow<'_, str> {
        self.resource().content()
    }

    pub fn as_page(&self) -> Option<&WebPage> {
        match self {
            WebResource::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_json_document(&self) -> Option<&JsonDocument> {
        match self {
            WebResource::JsonDocument(document) => Some(document),
            _ => None,
        }
    }
}
