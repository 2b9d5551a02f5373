use std::sync::LazyLock;

use regex::{Regex, RegexSet};
use url::Url;

/// Product URL patterns for major e-commerce platforms, matched against the
/// path when the platform name appears in the domain. Patterns are written
/// for the lowercased URL every check operates on.
static PLATFORM_PRODUCT_PATTERNS: LazyLock<Vec<(&'static str, RegexSet)>> = LazyLock::new(|| {
    let table: &[(&str, &[&str])] = &[
        (
            "amazon",
            &[
                r"/dp/[a-z0-9]{10}",
                r"/gp/product/[a-z0-9]{10}",
                r"/exec/obidos/asin/[a-z0-9]{10}",
                r"/product-reviews/[a-z0-9]{10}",
                r"/[^/]+/dp/[a-z0-9]{10}",
            ],
        ),
        ("ebay", &[r"/itm/[0-9]+", r"/p/[0-9]+", r"/i/[0-9]+", r"/deals/[^/]+/[0-9]+"]),
        (
            "walmart",
            &[r"/ip/[^/]+/[0-9]+", r"/product/[^/]+/[0-9]+", r"/grocery/ip/[^/]+/[0-9]+"],
        ),
        ("target", &[r"/p/[^/]+/-/a-[0-9]+", r"/product/[^/]+/-/a-[0-9]+"]),
        ("etsy", &[r"/listing/[0-9]+", r"/[^/]+/listing/[0-9]+"]),
        ("shopify", &[r"/products/[^/?]+", r"/collections/[^/]+/products/[^/?]+"]),
        (
            "aliexpress",
            &[r"/item/[0-9]+\.html", r"/store/product/[^/]+/[0-9]+\.html"],
        ),
        (
            "alibaba",
            &[r"/product-detail/[^/]+_[0-9]+\.html", r"/p/[^/]+/[0-9]+\.html"],
        ),
    ];
    table
        .iter()
        .map(|(platform, patterns)| {
            (*platform, RegexSet::new(*patterns).expect("hard-coded pattern compiles"))
        })
        .collect()
});

/// Generic product URL shapes seen across storefront engines.
static GENERIC_PRODUCT_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"/product[s]?/[^/?]+",
        r"/item[s]?/[^/?]+",
        r"/p/[^/?]+",
        r"/goods/[^/?]+",
        r"/detail/[^/?]+",
        r"/product-[0-9]+",
        r"/item-[0-9]+",
        r"/[^/]+-p[0-9]+",
        r"/sku[/-][0-9a-z]+",
        r"/catalog/product/view/id/[0-9]+",
        r"/product_info\.php\?products_id=[0-9]+",
        r"\.html$",
        r"/[^/]*[0-9]{6,}[^/]*$",
    ])
    .expect("hard-coded pattern compiles")
});

/// URL shapes that will never lead to a product: account/auth, legal,
/// company info, API/technical assets, admin, search/filter, and
/// non-product actions.
static DEAD_END_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        // account / auth / purchase flow
        r"/login", r"/signin", r"/sign-in", r"/register", r"/signup", r"/sign-up",
        r"/account", r"/profile", r"/my-account", r"/user", r"/member",
        r"/checkout", r"/cart", r"/basket", r"/bag", r"/wishlist", r"/favorites",
        r"/logout", r"/signout", r"/sign-out",
        // legal
        r"/terms", r"/privacy", r"/policy", r"/legal", r"/disclaimer",
        r"/cookies", r"/gdpr", r"/compliance",
        // company info
        r"/about", r"/contact", r"/careers", r"/jobs", r"/investors",
        r"/press", r"/media", r"/news", r"/blog", r"/help", r"/support",
        r"/faq", r"/customer-service", r"/team", r"/company",
        // api / technical
        r"/api/", r"/ajax/", r"/json/", r"/xml/", r"/rss/", r"/feed/",
        r"/webhook", r"/callback", r"/oauth", r"/auth/", r"/token",
        r"\.css", r"\.js", r"\.json", r"\.xml", r"\.txt", r"\.pdf",
        r"\.jpg", r"\.jpeg", r"\.png", r"\.gif", r"\.svg", r"\.ico",
        r"\.woff", r"\.ttf", r"\.eot",
        // admin
        r"/admin", r"/dashboard", r"/cms", r"/wp-admin", r"/backend",
        r"/manage", r"/control-panel", r"/administrator",
        // search / filter
        r"/search", r"/filter", r"/sort", r"/compare", r"/reviews-only",
        r"/questions", r"/q&a", r"/specifications-only",
        // non-product actions
        r"/add-to-cart", r"/buy-now", r"/quick-view", r"/share",
        r"/email-friend", r"/track-order", r"/order-status",
        r"/download", r"/subscribe", r"/unsubscribe",
    ])
    .expect("hard-coded pattern compiles")
});

static NON_PRODUCT_EXTENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(css|js|json|xml|txt|pdf|zip|rar|exe|dmg|pkg)$").expect("hard-coded pattern compiles")
});

static MEDIA_EXTENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(jpg|jpeg|png|gif|svg|ico|webp|mp4|mp3|wav|pdf)$").expect("hard-coded pattern compiles")
});

static NAVIGATION_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"/home$", r"/index$", r"/$", r"/main$",
        r"/sitemap", r"/robots\.txt", r"/favicon\.ico",
        r"/error", r"/404", r"/500", r"/maintenance",
    ])
    .expect("hard-coded pattern compiles")
});

static UTILITY_PATHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(share|social|follow|email|newsletter|subscribe|download|file|attachment|document)")
        .expect("hard-coded pattern compiles")
});

static NON_PRODUCT_FRAGMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"reviews|comments|questions|specs").expect("hard-coded pattern compiles")
});

/// Common product page structures: /category/subcategory/123,
/// /product-name-123, /123-product-name, /product_name_123.
static PRODUCT_STRUCTURES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"/[^/]+/[^/]+/[0-9]+",
        r"/[^/]+-[0-9]+",
        r"/[0-9]+-[^/]+",
        r"/[^/]+_[0-9]+",
    ])
    .expect("hard-coded pattern compiles")
});

const PRODUCT_KEYWORDS: &[&str] = &[
    "product", "item", "goods", "merchandise", "article",
    "catalog", "inventory", "stock", "sku", "model",
    "buy", "shop", "store", "purchase", "order",
];

const CATEGORY_KEYWORDS: &[&str] = &[
    "category", "categories", "collection", "collections",
    "department", "section", "brand", "brands", "sale",
    "deals", "offers", "clearance", "outlet",
];

/// Query parameter name fragments that usually mark tracking, search, or
/// pagination rather than a product page.
const DEAD_END_PARAMS: &[&str] = &[
    "utm_", "gclid", "fbclid", "ref", "campaign", "source",
    "sort", "filter", "page", "limit", "offset", "view",
    "search", "q", "query", "keyword",
];

const PRODUCT_QUERY_PARAMS: &[&str] = &["product_id", "item_id", "sku", "model", "variant"];

const PRODUCT_QUERY_INDICATORS: &[&str] = &["product_id", "item_id", "sku", "pid", "id"];

const STRONG_PRODUCT_INDICATORS: &[&str] = &["product/", "item/", "/p/", "sku", "model"];

const NON_ECOMMERCE_DOMAINS: &[&str] = &[
    "youtube.com", "facebook.com", "twitter.com", "instagram.com",
    "linkedin.com", "pinterest.com", "reddit.com", "wikipedia.org",
    "github.com", "stackoverflow.com", "medium.com", "blog.",
    "news.", "forum.", "community.", "support.", "help.",
];

/// Lowercased pieces of a URL. Accepts both absolute URLs and bare paths
/// ("/cart?ref=nav#reviews"), since link filtering runs on paths alone.
struct UrlParts {
    domain: String,
    path: String,
    query: String,
    fragment: String,
}

fn split_url(raw: &str) -> UrlParts {
    let raw = raw.trim().to_lowercase();
    match Url::parse(&raw) {
        Ok(u) if u.has_host() => UrlParts {
            domain: u
                .host_str()
                .unwrap_or_default()
                .trim_start_matches("www.")
                .to_string(),
            path: u.path().to_string(),
            query: u.query().unwrap_or_default().to_string(),
            fragment: u.fragment().unwrap_or_default().to_string(),
        },
        _ => {
            let (rest, fragment) = raw.split_once('#').unwrap_or((raw.as_str(), ""));
            let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
            UrlParts {
                domain: String::new(),
                path: path.to_string(),
                query: query.to_string(),
                fragment: fragment.to_string(),
            }
        }
    }
}

/// Whether a URL is likely a product page URL.
///
/// Dead-end shapes are rejected first; then platform-specific patterns,
/// generic product patterns backed by product indicators, common product
/// structures, long numeric/alphanumeric IDs, and finally product keywords
/// (unless the URL reads as a category listing without product indicators).
pub fn is_product_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return false;
    }
    if is_dead_end_url(url) {
        return false;
    }

    let full = url.trim().to_lowercase();
    let parts = split_url(url);

    for (platform, patterns) in PLATFORM_PRODUCT_PATTERNS.iter() {
        if parts.domain.contains(platform) && patterns.is_match(&parts.path) {
            return true;
        }
    }

    if GENERIC_PRODUCT_PATTERNS.is_match(&parts.path)
        && has_product_indicators(&parts.path, &parts.query)
    {
        return true;
    }

    if PRODUCT_STRUCTURES.is_match(&parts.path) {
        return true;
    }

    if has_product_numeric_patterns(&parts.path) {
        return true;
    }

    if PRODUCT_KEYWORDS.iter().any(|k| full.contains(k)) {
        let category_without_product = CATEGORY_KEYWORDS.iter().any(|k| full.contains(k))
            && !STRONG_PRODUCT_INDICATORS.iter().any(|i| full.contains(i));
        if !category_without_product {
            return true;
        }
    }

    false
}

/// Whether a URL can never lead to a product page: static assets, auth and
/// legal pages, tracking-parameter-only links, non-commerce domains,
/// navigation/utility pages, and bare category listings.
pub fn is_dead_end_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return true;
    }

    let full = url.trim().to_lowercase();
    let parts = split_url(url);

    if NON_PRODUCT_EXTENSIONS.is_match(&parts.path) || MEDIA_EXTENSIONS.is_match(&parts.path) {
        return true;
    }

    if DEAD_END_PATTERNS.is_match(&full) {
        return true;
    }

    if !parts.query.is_empty() {
        let names: Vec<&str> = parts
            .query
            .split('&')
            .filter_map(|kv| kv.split('=').next())
            .collect();
        let has_dead = names
            .iter()
            .any(|n| DEAD_END_PARAMS.iter().any(|d| n.contains(d)));
        let has_product = names
            .iter()
            .any(|n| PRODUCT_QUERY_INDICATORS.iter().any(|i| n.contains(i)));
        if has_dead && !has_product {
            return true;
        }
    }

    if !parts.fragment.is_empty() && NON_PRODUCT_FRAGMENTS.is_match(&parts.fragment) {
        return true;
    }

    if NON_ECOMMERCE_DOMAINS.iter().any(|d| parts.domain.contains(d)) {
        return true;
    }

    if NAVIGATION_PATTERNS.is_match(&parts.path) || UTILITY_PATHS.is_match(&parts.path) {
        return true;
    }

    let has_category = CATEGORY_KEYWORDS.iter().any(|k| full.contains(k));
    let has_product_kw = PRODUCT_KEYWORDS.iter().any(|k| full.contains(k));
    if has_category && !has_product_kw && !has_product_indicators(&parts.path, &parts.query) {
        return true;
    }

    false
}

/// Product-specific query parameters or product keywords in the path.
fn has_product_indicators(path: &str, query: &str) -> bool {
    if !query.is_empty() && PRODUCT_QUERY_PARAMS.iter().any(|p| query.contains(p)) {
        return true;
    }
    PRODUCT_KEYWORDS.iter().any(|k| path.contains(k))
}

/// Long numeric or alphanumeric path segments often carry product IDs.
fn has_product_numeric_patterns(path: &str) -> bool {
    static LONG_NUMERIC: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/[0-9]{6,}").expect("hard-coded pattern compiles"));
    static ALNUM_CODE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/[a-z0-9]{8,}").expect("hard-coded pattern compiles"));
    LONG_NUMERIC.is_match(path) || ALNUM_CODE.is_match(path)
}
