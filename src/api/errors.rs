use thiserror::Error;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", summarize(.body))]
    Http { status: u16, body: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for `Http` errors, left for callers to interpret.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Trims and truncates an error body for display.
fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_truncates_body() {
        let err = ApiError::Http {
            status: 500,
            body: "x".repeat(500),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("Request failed (500): "));
        assert_eq!(rendered.len(), "Request failed (500): ".len() + MAX_ERROR_CHARS);
    }

    #[test]
    fn http_error_display_handles_empty_body() {
        let err = ApiError::Http {
            status: 403,
            body: "   ".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (403): Request failed.");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let err = ApiError::Timeout("slow".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
    }
}
