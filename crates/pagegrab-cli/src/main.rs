use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use url::Url;

use pagegrab_client::BrowserFetcher;
use pagegrab_core::models::{ClassifyReport, FetchResult};
use pagegrab_core::parser::parse_html;
use pagegrab_core::traits::Fetcher;

#[derive(Parser)]
#[command(name = "pagegrab", version, about = "Headless-browser page fetcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL and emit a {url, status, html, error} JSON envelope
    Json {
        /// Target URL to fetch
        url: Option<String>,
    },

    /// Fetch a URL and emit the raw rendered HTML
    Raw {
        /// Target URL to fetch
        url: Option<String>,
    },

    /// Fetch a URL, classify it as a product page, and list same-domain links
    Classify {
        /// Target URL to fetch
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Stdout is reserved for the payload; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pagegrab_cli=info".parse()?)
                .add_directive("pagegrab_client=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Json { url } => cmd_json(url).await?,
        Commands::Raw { url } => cmd_raw(url).await?,
        Commands::Classify { url } => cmd_classify(url).await?,
    };

    std::process::exit(code)
}

/// JSON-envelope mode.
///
/// Always emits a well-formed envelope. A fetch failure is reported through
/// the `error` field with exit code 0; only the missing-URL case exits
/// non-zero. That asymmetry is part of the observed contract this tool
/// preserves.
async fn cmd_json(url: Option<String>) -> Result<i32> {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        eprintln!("{}", serde_json::to_string(&FetchResult::missing_url())?);
        return Ok(1);
    };

    tracing::info!("Fetching {url}");

    let envelope = match BrowserFetcher::new().fetch(&url).await {
        Ok(page) => {
            tracing::info!("Fetched {url} with status {}", page.status);
            FetchResult::success(&url, page)
        }
        Err(e) => {
            tracing::warn!("Fetch failed for {url}: {e}");
            FetchResult::failure(&url, &e)
        }
    };

    write_stdout(serde_json::to_string(&envelope)?.as_bytes())?;
    Ok(0)
}

/// Raw-HTML mode.
///
/// Writes the rendered document bytes to stdout with no wrapping. On any
/// failure nothing is written and the exit code is the only failure signal.
async fn cmd_raw(url: Option<String>) -> Result<i32> {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return Ok(1);
    };

    match BrowserFetcher::new().fetch(&url).await {
        Ok(page) => {
            write_stdout(page.html.as_bytes())?;
            Ok(0)
        }
        Err(e) => {
            tracing::warn!("Fetch failed for {url}: {e}");
            Ok(1)
        }
    }
}

/// Classify mode.
///
/// Fetches like the other modes, then runs the product-page classifier and
/// same-domain link extraction over the rendered HTML and emits one JSON
/// report. Failure behavior follows raw mode: nothing on stdout, exit 1.
async fn cmd_classify(url: Option<String>) -> Result<i32> {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        eprintln!("{}", serde_json::to_string(&FetchResult::missing_url())?);
        return Ok(1);
    };

    tracing::info!("Fetching {url}");

    let page = match BrowserFetcher::new().fetch(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Fetch failed for {url}: {e}");
            return Ok(1);
        }
    };

    let seed_domain = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    let parsed = parse_html(&url, &page.html, &seed_domain);

    tracing::info!(
        "Classified {url}: product page = {}, {} child link(s)",
        parsed.classification.is_product_page,
        parsed.child_urls.len()
    );

    let report = ClassifyReport {
        url: url.clone(),
        status: page.status,
        classification: parsed.classification,
        product_urls: parsed.product_urls,
        child_urls: parsed.child_urls,
    };

    write_stdout(serde_json::to_string(&report)?.as_bytes())?;
    Ok(0)
}

/// Single write to stdout, flushed, no trailing newline.
fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_envelope_matches_contract() {
        let json = serde_json::to_string(&FetchResult::missing_url()).unwrap();
        assert_eq!(
            json,
            r#"{"url":null,"status":0,"html":null,"error":"Missing URL argument"}"#
        );
    }

    #[test]
    fn test_cli_parses_all_modes() {
        let cli = Cli::try_parse_from(["pagegrab", "json", "https://example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Json { url: Some(ref u) } if u == "https://example.com"
        ));

        let cli = Cli::try_parse_from(["pagegrab", "raw", "https://example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Raw { url: Some(ref u) } if u == "https://example.com"
        ));

        let cli = Cli::try_parse_from(["pagegrab", "classify", "https://example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Classify { url: Some(ref u) } if u == "https://example.com"
        ));
    }

    #[test]
    fn test_url_argument_is_optional() {
        let cli = Cli::try_parse_from(["pagegrab", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Json { url: None }));
    }

    #[tokio::test]
    async fn test_json_mode_missing_url_exits_nonzero() {
        assert_eq!(cmd_json(None).await.unwrap(), 1);
        assert_eq!(cmd_json(Some(String::new())).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_raw_mode_missing_url_exits_nonzero() {
        assert_eq!(cmd_raw(None).await.unwrap(), 1);
        assert_eq!(cmd_raw(Some(String::new())).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_classify_mode_missing_url_exits_nonzero() {
        assert_eq!(cmd_classify(None).await.unwrap(), 1);
        assert_eq!(cmd_classify(Some(String::new())).await.unwrap(), 1);
    }
}
