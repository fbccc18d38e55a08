//! tweetlens fetches a user's Twitter timeline and lets a viewer
//! progressively narrow the displayed set through composable filters.
//!
//! The crate is the headless core of a timeline browser: a presentation
//! layer drives [`TimelineBrowser`] (submit a query, edit filter values,
//! read the visible subset and fetch state) and renders whatever comes
//! back. Requests run asynchronously; a superseded request's response is
//! detected as stale and discarded, never overwriting newer state.

pub mod browser;
pub mod config;
pub mod fetch;
pub mod filters;
pub mod query;
pub mod stats;
pub mod tweet;

pub use browser::TimelineBrowser;
pub use config::Config;
pub use fetch::http::{HttpTimelineClient, TimelineClient, TimelineResponse};
pub use fetch::{FetchCoordinator, FetchError, FetchMessage, FetchState, RequestToken};
pub use filters::{FilterDefinition, FilterRegistry, FilterState, FilterValue};
pub use query::visible;
pub use stats::TimelineStats;
pub use tweet::Tweet;
