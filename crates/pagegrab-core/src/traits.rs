use std::future::Future;

use crate::error::FetchError;
use crate::models::RenderedPage;

/// Drives an external collaborator to load a URL and hand back the rendered
/// document plus the navigation response status.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RenderedPage, FetchError>> + Send;
}
