//! News search pipeline: URL building, fetching, parsing.
//!
//! This module defines the [`ArticleSource`] trait and the common [`Article`]
//! type.  The pieces are leaves of the load pipeline:
//!
//! * [`query`] — append user search text to the base query URL.
//! * [`fetch`] — blocking HTTP GET with fixed timeouts ([`HttpSource`]).
//! * [`parse`] — JSON response → ordered [`Article`]s.
//! * [`connectivity`] — the network check consulted before each load.
//!
//! None of these know about cycles or the UI; [`crate::load`] strings them
//! together on a worker thread.

mod article;
mod connectivity;
mod fetch;
mod parse;
mod query;

pub use article::{Article, NO_CONTRIBUTORS};
pub use connectivity::{Connectivity, ReachabilityMonitor};
pub use fetch::HttpSource;
pub use parse::{parse_articles, ParsedBatch};
pub use query::build_search_url;

use crate::error::FetchError;

/// Anything that can turn a request URL into a raw response body.
///
/// The load controller calls [`fetch()`](ArticleSource::fetch) on a
/// background thread, so implementations must be [`Send`] + [`Sync`].
pub trait ArticleSource: Send + Sync {
    /// Fetch the body at `url`.  An empty string means "no data".
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
