pub mod browser;

pub use browser::BrowserFetcher;
