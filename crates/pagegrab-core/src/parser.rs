use std::collections::BTreeSet;

use scraper::{Html, Selector};
use url::Url;

use crate::classify::{Classification, FeatureWeights, classify_page};
use crate::urls::is_dead_end_url;

/// One page's worth of crawl output: the classification verdict plus the
/// same-domain links split into follow-up candidates and product pages.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParsedPage {
    pub classification: Classification,
    pub child_urls: Vec<String>,
    pub product_urls: Vec<String>,
}

/// Classify a rendered page and extract its same-domain links.
///
/// Links are resolved against the page URL, restricted to `seed_domain`,
/// normalized (fragment stripped, no trailing slash), deduplicated, and
/// filtered through [`is_dead_end_url`]. If the page itself classifies as a
/// product page, its own URL lands in `product_urls`.
pub fn parse_html(page_url: &str, html: &str, seed_domain: &str) -> ParsedPage {
    let classification = classify_page(html, page_url, &FeatureWeights::default());

    let mut child_urls = BTreeSet::new();
    let mut product_urls = BTreeSet::new();

    if classification.is_product_page {
        product_urls.insert(page_url.to_string());
    }

    if let (Ok(base), Ok(selector)) = (Url::parse(page_url), Selector::parse("a[href]")) {
        let doc = Html::parse_document(html);
        for anchor in doc.select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(mut link) = base.join(href) else {
                continue;
            };
            if link.host_str() != Some(seed_domain) {
                continue;
            }
            link.set_fragment(None);
            if is_dead_end_url(link.path()) {
                continue;
            }
            child_urls.insert(link.as_str().trim_end_matches('/').to_string());
        }
    }

    ParsedPage {
        classification,
        child_urls: child_urls.into_iter().collect(),
        product_urls: product_urls.into_iter().collect(),
    }
}
