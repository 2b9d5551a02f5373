pub mod classify;
pub mod error;
pub mod models;
pub mod parser;
pub mod traits;
pub mod urls;

pub use classify::{Classification, FeatureWeights, classify_page};
pub use error::FetchError;
pub use models::{ClassifyReport, FetchResult, RenderedPage};
pub use parser::{ParsedPage, parse_html};
pub use traits::Fetcher;
pub use urls::{is_dead_end_url, is_product_url};
