//! Decoding of libcurl-style failure messages (`cURL error 28: ...`)

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Low-level transport error carrying a libcurl error number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CurlError {
    pub code: i64,
    pub message: String,
}

pub const COULDNT_RESOLVE_HOST: i64 = 6;
pub const COULDNT_CONNECT: i64 = 7;
pub const OPERATION_TIMEDOUT: i64 = 28;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^cURL error (\d+): (.*?)(?: \(see https?://[^)]*\))?$")
            .expect("curl error pattern is valid")
    })
}

impl CurlError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Decode a message such as `cURL error 28: operation timed out`
    pub fn from_message(message: &str) -> Option<Self> {
        let captures = pattern().captures(message.trim())?;
        let code = captures.get(1)?.as_str().parse().ok()?;
        let message = captures.get(2)?.as_str().trim().to_string();

        Some(Self { code, message })
    }

    /// Render in the form [`CurlError::from_message`] understands
    pub fn to_message(&self) -> String {
        format!("cURL error {}: {}", self.code, self.message)
    }
}
