/// Smoke-test for `BrowserFetcher`.
///
/// Launches a headless Chromium, fetches <https://example.com>, and verifies
/// the rendered HTML and response status.
///
/// Run with:
///   cargo run --example fetch_smoke
use pagegrab_client::BrowserFetcher;
use pagegrab_core::traits::Fetcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = "https://example.com";
    println!("Fetching {url} …");
    let page = BrowserFetcher::new().fetch(url).await?;

    // Basic sanity checks
    assert_eq!(page.status, 200, "Expected HTTP 200, got {}", page.status);
    assert!(
        page.html.contains("<h1>Example Domain</h1>"),
        "Expected <h1> not found in rendered HTML"
    );

    println!(
        "OK — status {} with {} bytes of rendered HTML",
        page.status,
        page.html.len()
    );
    Ok(())
}
