use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{error, info};
use webresource::Request;
use webresource::config::{Config, ConfigError};
use webresource::retriever::Retriever;

use crate::cli::FetchArgs;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(args: FetchArgs) -> Result<(), AnyError> {
    let config = load_config(&args)?;
    let retriever = Retriever::from_config(&config)?;
    let request = Request::get(args.url).with_headers(parse_headers(&args.headers)?);

    info!(uri = %request.uri, "Fetching");

    let resource = match retriever.retrieve(&request).await {
        Ok(resource) => resource,
        Err(err) => {
            error!(uri = %request.uri, code = err.code(), error = %err, "Retrieval failed");
            return Err(format!("error {}: {}", err.code(), err).into());
        }
    };

    println!("kind:         {}", resource.kind());
    println!("uri:          {}", resource.uri());
    println!("status:       {}", resource.response().status.as_u16());
    println!("content-type: {}", resource.content_type());
    println!("bytes:        {}", resource.body().len());

    Ok(())
}

/// Configuration from file and environment with command-line overrides applied
fn load_config(args: &FetchArgs) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path.clone())?,
        None => Config::load()?,
    };

    config
        .content
        .allowed_content_types
        .extend(args.allowed_content_types.iter().cloned());
    if args.strict {
        config.content.allow_unknown_resource_types = false;
    }

    config.validate()?;
    Ok(config)
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, AnyError> {
    let mut headers = HeaderMap::new();

    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("Invalid header '{}', expected 'Name: value'", header))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    Ok(headers)
}
