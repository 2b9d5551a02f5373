use thiserror::Error;

/// Failure taxonomy for a page fetch.
///
/// The external contract flattens every failure into one `error` string in the
/// JSON envelope, but distinct kinds are kept apart internally so diagnostics
/// (and callers of the library crates) can tell a timeout from a DNS failure.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The browser process could not be configured or started.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Navigation was rejected by the browser (bad URL, blocked scheme, ...).
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Network-level failure (DNS, connection refused/reset, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The page loaded but its content could not be read back.
    #[error("Failed to read page content: {0}")]
    Extraction(String),

    /// The navigation deadline elapsed.
    #[error("Navigation timed out after {0} ms")]
    Timeout(u64),

    /// Anything the browser collaborator reports that fits no other bucket.
    #[error("{0}")]
    Generic(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FetchError::Timeout(20000).to_string(),
            "Navigation timed out after 20000 ms"
        );
        assert_eq!(
            FetchError::Network("net::ERR_NAME_NOT_RESOLVED".into()).to_string(),
            "Network error: net::ERR_NAME_NOT_RESOLVED"
        );
        assert_eq!(FetchError::Generic("boom".into()).to_string(), "boom");
    }
}
