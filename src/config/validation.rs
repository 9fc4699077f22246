use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Allowed content type '{entry}' is not a type/subtype pair")]
    InvalidContentType { entry: String },

    #[error("Timeout must be positive: {field} = {value}")]
    InvalidTimeout { field: String, value: u64 },

    #[error("max_redirects must be at least 1")]
    InvalidMaxRedirects,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_http(config)?;
    validate_content(config)?;
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    for (field, value) in [
        ("connect_timeout_secs", config.http.connect_timeout_secs),
        ("request_timeout_secs", config.http.request_timeout_secs),
    ] {
        if value == 0 {
            return Err(ValidationError::InvalidTimeout {
                field: field.to_string(),
                value,
            });
        }
    }

    if config.http.max_redirects == 0 {
        return Err(ValidationError::InvalidMaxRedirects);
    }

    Ok(())
}

fn validate_content(config: &Config) -> Result<(), ValidationError> {
    for entry in &config.content.allowed_content_types {
        let is_pair = entry
            .trim()
            .split_once('/')
            .is_some_and(|(type_, subtype)| !type_.is_empty() && !subtype.is_empty());

        if !is_pair {
            return Err(ValidationError::InvalidContentType {
                entry: entry.clone(),
            });
        }
    }

    if config.content.allowed_content_types.is_empty()
        && !config.content.allow_unknown_resource_types
    {
        tracing::warn!(
            "No allowed content types configured and unknown resource types disallowed; every retrieval will be rejected"
        );
    }

    Ok(())
}
