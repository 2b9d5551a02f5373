use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use pagegrab_core::error::FetchError;
use pagegrab_core::models::RenderedPage;
use pagegrab_core::traits::Fetcher;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// User agent sent with every navigation — a fixed modern desktop Chrome
/// signature, so sites serve the same markup they would to a real browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Navigation deadline, matching the original tool's 20 s cap.
pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_millis(20_000);

/// Upper bound on browser startup, separate from the navigation deadline.
/// A wedged Chromium spawn must not hang the invocation forever.
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Quiet period after the load event, approximating a network-idle wait:
/// gives late XHRs and lazy-loaded content a chance to land.
const QUIET_PERIOD: Duration = Duration::from_millis(500);

/// How long to wait for the navigation response status after the page loaded.
const STATUS_WAIT: Duration = Duration::from_secs(1);

/// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
///
/// Each [`Fetcher::fetch`] call launches its own Chromium process, navigates,
/// reads the rendered HTML and the navigation response status, and shuts the
/// process down again. The session is released on every exit path — success,
/// error, and timeout — so repeated failing invocations cannot accumulate
/// orphaned browser processes.
///
/// Requires a Chromium / Chrome binary reachable via `$CHROME_BIN`, a set of
/// well-known install locations, or the default lookup done by `chromiumoxide`.
#[derive(Clone)]
pub struct BrowserFetcher {
    timeout: Duration,
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFetcher {
    /// Fetcher with the standard 20 s navigation deadline.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_NAV_TIMEOUT)
    }

    /// Fetcher with a custom navigation deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Launches a headless Chromium and starts polling its CDP handler.
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), FetchError> {
        let mut builder = BrowserConfig::builder();
        // Sandboxing is disabled as a deployment accommodation (containers,
        // CI), not as a security boundary.
        builder = builder.no_sandbox().disable_default_args();

        if let Some(bin) = find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| FetchError::Launch(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<RenderedPage, FetchError> {
        let (mut browser, handler_task) =
            match tokio::time::timeout(LAUNCH_TIMEOUT, self.launch()).await {
                Ok(launched) => launched?,
                Err(_) => return Err(launch_deadline_error(LAUNCH_TIMEOUT)),
            };

        let result = tokio::time::timeout(self.timeout, fetch_inner(&browser, url)).await;

        // Release the session on every path, including timeout and error.
        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser: {e}");
        }
        let _ = browser.wait().await;
        handler_task.abort();

        match result {
            Ok(inner) => inner,
            Err(_) => Err(FetchError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

/// Navigate, wait for the page to settle, and read back status + HTML.
async fn fetch_inner(browser: &Browser, url: &str) -> Result<RenderedPage, FetchError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| FetchError::Launch(format!("Failed to open page: {e}")))?;

    page.execute(SetUserAgentOverrideParams::new(USER_AGENT))
        .await
        .map_err(|e| FetchError::Generic(format!("Failed to set user agent: {e}")))?;

    // Network events carry the HTTP status of the navigation response; the
    // domain has to be enabled before we navigate or we miss it.
    page.execute(EnableParams::default())
        .await
        .map_err(|e| FetchError::Generic(format!("Failed to enable network events: {e}")))?;

    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| FetchError::Generic(format!("Failed to subscribe to responses: {e}")))?;

    // The first Document-typed response is the navigation response, even
    // across redirects. Captured concurrently so nothing is missed while
    // the navigation itself is awaited.
    let (status_tx, status_rx) = oneshot::channel::<u16>();
    let status_task = tokio::spawn(async move {
        while let Some(event) = responses.next().await {
            if is_navigation_response(&event.r#type) {
                let _ = status_tx.send(event.response.status as u16);
                break;
            }
        }
    });

    if let Err(e) = page.goto(url).await {
        status_task.abort();
        return Err(classify_nav_error(&e.to_string()));
    }

    page.wait_for_navigation()
        .await
        .map_err(|e| classify_nav_error(&e.to_string()))?;

    tokio::time::sleep(QUIET_PERIOD).await;

    // 0 when no navigation response was observed, e.g. a same-document
    // navigation or a navigation that resolved without a response object.
    let status = match tokio::time::timeout(STATUS_WAIT, status_rx).await {
        Ok(Ok(status)) => status,
        _ => 0,
    };

    let html = page
        .content()
        .await
        .map_err(|e| FetchError::Extraction(e.to_string()))?;

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close page: {e}");
    }

    Ok(RenderedPage { status, html })
}

/// The navigation response carries the `Document` resource type whatever its
/// mime — Chrome renders `text/plain` and `application/json` documents too,
/// and those must still report their real status.
fn is_navigation_response(resource_type: &ResourceType) -> bool {
    matches!(resource_type, ResourceType::Document)
}

fn launch_deadline_error(deadline: Duration) -> FetchError {
    FetchError::Launch(format!(
        "Browser did not start within {} ms",
        deadline.as_millis()
    ))
}

/// Sort a navigation failure into the internal taxonomy.
///
/// Chromium reports network-level failures as `net::ERR_*` codes inside the
/// error message; everything else from a rejected navigation stays a
/// navigation error.
fn classify_nav_error(msg: &str) -> FetchError {
    if msg.contains("net::ERR") {
        FetchError::Network(msg.to_string())
    } else if msg.to_lowercase().contains("timeout") {
        FetchError::Timeout(DEFAULT_NAV_TIMEOUT.as_millis() as u64)
    } else {
        FetchError::Navigation(msg.to_string())
    }
}

/// Tries to locate the real Chrome/Chromium binary.
///
/// Snap-packaged Chromium exposes a wrapper that strips standard Chrome CLI
/// flags, breaking headless mode, so the real binary buried inside the snap
/// is preferred. `CHROME_BIN` overrides the lookup entirely; if nothing
/// matches, `chromiumoxide` falls back to its own discovery.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    let candidates: &[&str] = &[
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dns_failure_as_network() {
        let err = classify_nav_error("net::ERR_NAME_NOT_RESOLVED at https://nonexistent.invalid");
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn test_classify_connection_refused_as_network() {
        let err = classify_nav_error("net::ERR_CONNECTION_REFUSED");
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[test]
    fn test_classify_timeout() {
        let err = classify_nav_error("Timeout waiting for navigation");
        assert!(matches!(err, FetchError::Timeout(20_000)));
    }

    #[test]
    fn test_classify_other_as_navigation() {
        let err = classify_nav_error("Cannot navigate to invalid URL");
        assert!(matches!(err, FetchError::Navigation(_)));
    }

    #[test]
    fn test_default_timeout_matches_contract() {
        assert_eq!(DEFAULT_NAV_TIMEOUT, Duration::from_millis(20_000));
        let fetcher = BrowserFetcher::new();
        assert_eq!(fetcher.timeout, DEFAULT_NAV_TIMEOUT);
    }

    #[test]
    fn test_navigation_response_is_document_typed_regardless_of_mime() {
        // A text/plain or application/json navigation still arrives as a
        // Document resource and must supply the status.
        assert!(is_navigation_response(&ResourceType::Document));
        assert!(!is_navigation_response(&ResourceType::Xhr));
        assert!(!is_navigation_response(&ResourceType::Stylesheet));
        assert!(!is_navigation_response(&ResourceType::Image));
    }

    #[test]
    fn test_launch_deadline_maps_to_launch_error() {
        let err = launch_deadline_error(LAUNCH_TIMEOUT);
        match err {
            FetchError::Launch(msg) => assert!(msg.contains("30000 ms")),
            other => panic!("expected Launch error, got {other:?}"),
        }
    }

    #[test]
    fn test_user_agent_is_desktop_chrome() {
        assert!(USER_AGENT.starts_with("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(USER_AGENT.contains("Chrome/122.0.0.0"));
    }
}
