use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::urls::is_product_url;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(₹|\$|€)\s?\d{2,}").expect("hard-coded regex compiles"));

static CTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)add to cart|buy now|select size|select color").expect("hard-coded regex compiles")
});

static SPEC_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)product details|specifications|select size|add to wishlist|know your product")
        .expect("hard-coded regex compiles")
});

static RELATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)similar products|you may also like|recommended").expect("hard-coded regex compiles")
});

/// Additive weights for the product-page heuristics. Negative values are
/// penalties.
#[derive(Debug, Clone)]
pub struct FeatureWeights {
    pub price_present: f64,
    pub no_price_at_all: f64,
    pub exact_one_cta: f64,
    pub multiple_cta: f64,
    pub spec_section: f64,
    pub related_products: f64,
    pub no_inputs_or_forms: f64,
    pub product_url: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            price_present: 0.5,
            no_price_at_all: -2.0,
            exact_one_cta: 1.0,
            multiple_cta: -1.0,
            spec_section: 1.0,
            related_products: 0.5,
            no_inputs_or_forms: -1.0,
            product_url: 2.0,
        }
    }
}

/// Verdict for one page, with the raw score, the sigmoid confidence, and a
/// human-readable trace of every signal that contributed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Classification {
    pub is_product_page: bool,
    pub confidence: f64,
    pub score: f64,
    pub signals: Vec<String>,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Score a rendered page as product page / not, combining content heuristics
/// (price, purchase CTA, spec section, related-products block, input/form
/// presence) with [`is_product_url`] on the page's own URL.
///
/// A page with neither a price nor exactly one purchase CTA is never a
/// product page, whatever the remaining signals add up to.
pub fn classify_page(html: &str, url: &str, weights: &FeatureWeights) -> Classification {
    let doc = Html::parse_document(html);
    let text = visible_text(&doc);

    let mut score = 0.0;
    let mut signals = Vec::new();

    let price = PRICE_RE.find(&text).map(|m| m.as_str().trim().to_string());
    match &price {
        Some(p) => {
            score += weights.price_present;
            signals.push(format!("{:+}: price found '{p}'", weights.price_present));
        }
        None => {
            score += weights.no_price_at_all;
            signals.push(format!("{:+}: no price detected", weights.no_price_at_all));
        }
    }

    let cta_count = CTA_RE.find_iter(&text).count();
    if cta_count == 1 {
        score += weights.exact_one_cta;
        signals.push(format!(
            "{:+}: exactly one purchase CTA",
            weights.exact_one_cta
        ));
    } else {
        score += weights.multiple_cta;
        signals.push(format!(
            "{:+}: purchase CTA count is {cta_count}",
            weights.multiple_cta
        ));
    }

    if SPEC_SECTION_RE.is_match(&text) {
        score += weights.spec_section;
        signals.push(format!(
            "{:+}: product details section found",
            weights.spec_section
        ));
    }

    if RELATED_RE.is_match(&text) {
        score += weights.related_products;
        signals.push(format!(
            "{:+}: related/recommended section found",
            weights.related_products
        ));
    }

    if !has_any(&doc, "input") && !has_any(&doc, "form") {
        score += weights.no_inputs_or_forms;
        signals.push(format!(
            "{:+}: no inputs/forms found",
            weights.no_inputs_or_forms
        ));
    }

    if is_product_url(url) {
        score += weights.product_url;
        signals.push(format!("{:+}: URL matches a product pattern", weights.product_url));
    }

    let mut confidence = sigmoid(score);
    let mut is_product_page = confidence >= 0.8;

    if cta_count != 1 && price.is_none() {
        confidence = 0.0;
        is_product_page = false;
        signals.push("short-circuited: no price and no single purchase CTA".to_string());
    }

    Classification {
        is_product_page,
        confidence: (confidence * 10_000.0).round() / 10_000.0,
        score: (score * 100.0).round() / 100.0,
        signals,
    }
}

/// Document text with script and style contents excluded.
fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    for node in doc.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style"))
        });
        if !hidden {
            out.push_str(&text.text);
            out.push(' ');
        }
    }
    out
}

fn has_any(doc: &Html, css: &str) -> bool {
    match Selector::parse(css) {
        Ok(sel) => doc.select(&sel).next().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"<html><body>
        <h1>Blue Shirt</h1>
        <p>$49.99</p>
        <button>Add to Cart</button>
        <div>Product Details: 100% cotton</div>
        <form><input name="qty" value="1"></form>
    </body></html>"#;

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(sigmoid(4.0) > 0.9);
        assert!(sigmoid(-4.0) < 0.1);
    }

    #[test]
    fn test_product_page_is_detected() {
        let result = classify_page(
            PRODUCT_PAGE,
            "https://myshop.example.com/products/blue-shirt",
            &FeatureWeights::default(),
        );
        assert!(result.is_product_page);
        assert!(result.confidence >= 0.8);
        assert!(result.signals.iter().any(|s| s.contains("price found")));
    }

    #[test]
    fn test_page_without_core_indicators_short_circuits() {
        let html = "<html><body><h1>Our story</h1><p>We make shirts.</p></body></html>";
        let result = classify_page(html, "https://example.com/our-story", &FeatureWeights::default());
        assert!(!result.is_product_page);
        assert_eq!(result.confidence, 0.0);
        assert!(result.signals.iter().any(|s| s.contains("short-circuited")));
    }

    #[test]
    fn test_multiple_ctas_penalized() {
        let html = r#"<html><body>
            <p>$19.99</p>
            <form><button>Buy Now</button><button>Buy Now</button><button>Add to Cart</button></form>
        </body></html>"#;
        let result = classify_page(html, "https://example.com/deals", &FeatureWeights::default());
        assert!(!result.is_product_page);
        // Price is present, so the short-circuit must not fire.
        assert!(result.confidence > 0.0);
        assert!(result.signals.iter().any(|s| s.contains("CTA count is 3")));
    }

    #[test]
    fn test_script_content_is_not_visible_text() {
        let html = r#"<html><body>
            <script>var price = "$49.99";</script>
            <p>No prices here.</p>
        </body></html>"#;
        let result = classify_page(html, "https://example.com/page", &FeatureWeights::default());
        assert!(result.signals.iter().any(|s| s.contains("no price detected")));
    }

    #[test]
    fn test_product_url_contributes_score() {
        let on_product_url = classify_page(
            PRODUCT_PAGE,
            "https://myshop.example.com/products/blue-shirt",
            &FeatureWeights::default(),
        );
        let on_plain_url = classify_page(
            PRODUCT_PAGE,
            "https://example.com/our-story",
            &FeatureWeights::default(),
        );
        assert!(on_product_url.score > on_plain_url.score);
    }
}
