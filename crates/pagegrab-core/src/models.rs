use crate::classify::Classification;
use crate::error::FetchError;

/// What the browser handed back for a successfully rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// HTTP status of the navigation response, 0 if none was observed
    /// (e.g. same-document navigation).
    pub status: u16,
    /// Fully serialized rendered document.
    pub html: String,
}

/// The JSON envelope written to stdout in JSON mode.
///
/// Field order matters: consumers of the original tool parse
/// `{url, status, html, error}` and the serialized form keeps that shape.
///
/// Exactly one of `html` / `error` is set, and `status` is 0 whenever
/// `error` is set. The constructors below are the only way these are built,
/// so the invariant holds by construction.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FetchResult {
    pub url: Option<String>,
    pub status: u16,
    pub html: Option<String>,
    pub error: Option<String>,
}

impl FetchResult {
    /// Envelope for a completed fetch.
    pub fn success(url: &str, page: RenderedPage) -> Self {
        Self {
            url: Some(url.to_string()),
            status: page.status,
            html: Some(page.html),
            error: None,
        }
    }

    /// Envelope for a failed fetch; the tagged error flattens to its
    /// display string here, at the boundary.
    pub fn failure(url: &str, err: &FetchError) -> Self {
        Self {
            url: Some(url.to_string()),
            status: 0,
            html: None,
            error: Some(err.to_string()),
        }
    }

    /// Envelope for an invocation without a URL argument.
    pub fn missing_url() -> Self {
        Self {
            url: None,
            status: 0,
            html: None,
            error: Some("Missing URL argument".to_string()),
        }
    }
}

/// Output of the classify mode: fetch metadata plus the classification
/// verdict and the same-domain link partition.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassifyReport {
    pub url: String,
    pub status: u16,
    pub classification: Classification,
    pub product_urls: Vec<String>,
    pub child_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_exact_shape() {
        let json = serde_json::to_string(&FetchResult::missing_url()).unwrap();
        assert_eq!(
            json,
            r#"{"url":null,"status":0,"html":null,"error":"Missing URL argument"}"#
        );
    }

    #[test]
    fn test_success_envelope() {
        let page = RenderedPage {
            status: 200,
            html: "<!DOCTYPE html><html></html>".into(),
        };
        let result = FetchResult::success("https://example.com", page);
        assert_eq!(result.url.as_deref(), Some("https://example.com"));
        assert_eq!(result.status, 200);
        assert!(result.html.is_some());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_envelope_forces_status_zero() {
        let err = FetchError::Network("net::ERR_NAME_NOT_RESOLVED".into());
        let result = FetchResult::failure("https://nonexistent.invalid", &err);
        assert_eq!(result.status, 0);
        assert!(result.html.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("Network error: net::ERR_NAME_NOT_RESOLVED")
        );
    }

    #[test]
    fn test_html_and_error_are_exclusive() {
        let page = RenderedPage {
            status: 200,
            html: "<html></html>".into(),
        };
        let ok = FetchResult::success("https://example.com", page);
        let err = FetchResult::failure("https://example.com", &FetchError::Timeout(20000));
        assert!(ok.html.is_some() && ok.error.is_none());
        assert!(err.html.is_none() && err.error.is_some());
    }

    #[test]
    fn test_field_order_in_serialized_form() {
        let page = RenderedPage {
            status: 200,
            html: "<html></html>".into(),
        };
        let json = serde_json::to_string(&FetchResult::success("https://example.com", page)).unwrap();
        let url_pos = json.find("\"url\"").unwrap();
        let status_pos = json.find("\"status\"").unwrap();
        let html_pos = json.find("\"html\"").unwrap();
        let error_pos = json.find("\"error\"").unwrap();
        assert!(url_pos < status_pos && status_pos < html_pos && html_pos < error_pos);
    }
}
