//! Paged trending/search movie list with cache-then-fresh reconciliation.
//!
//! - `movie` - Catalog values and the page-number-unique `PageSet`
//! - `fetch` - Fetch contract (`FetchPort`, `PageReply`) and concrete ports
//! - `list` - `ListController` state machine and its observable outputs
//! - `queries` - Recent search queries for suggestions
//! - `config` - TOML configuration

pub mod config;
pub mod fetch;
pub mod list;
pub mod movie;
pub mod queries;
