use thiserror::Error;

/// Failure reported by the remote data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl SourceError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 409 | 422 => SourceError::Validation(truncated),
            401 => SourceError::Server("Unauthorized - token may be expired".to_string()),
            403 => SourceError::Server(format!("Access denied: {}", truncated)),
            404 => SourceError::Server(format!("Resource not found: {}", truncated)),
            429 => SourceError::Server("Rate limited - please wait before retrying".to_string()),
            500..=599 => SourceError::Server(truncated),
            _ => SourceError::Server(format!("Status {}: {}", status, truncated)),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Server(format!("Invalid response: {}", e))
        } else if let Some(status) = e.status() {
            SourceError::from_status(status, "")
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            SourceError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "email invalid"),
            SourceError::Validation(ref m) if m == "email invalid"
        ));
        assert!(matches!(
            SourceError::from_status(StatusCode::BAD_REQUEST, ""),
            SourceError::Validation(_)
        ));
        assert!(matches!(
            SourceError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            SourceError::Server(_)
        ));
        assert!(matches!(
            SourceError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            SourceError::Server(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = SourceError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with(&format!("{} total bytes)", long.len())));
        assert_eq!(SourceError::truncate_body("short"), "short");
    }
}
