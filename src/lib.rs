pub mod config;
pub mod media_type;
pub mod observability;
pub mod resource;
pub mod retriever;
pub mod transport;

pub use media_type::{MediaType, MediaTypeParseError};
pub use resource::{ResourceKind, WebResource};
pub use retriever::{Retriever, RetrieverError, TransportError};
pub use transport::{Request, Response, Transport, TransportFailure};
