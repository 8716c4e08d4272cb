pub mod fetcher;
pub mod source;

pub use fetcher::{FetcherOptions, SalesPageFetcher, SalesPageSnapshot};
pub use source::{BulkSalesQuery, PagedSalesQuery};
