//! Catalog domain values.
//!
//! - `types` - Movie, Genre, MoviesPage, MovieQuery
//! - `page_set` - Insertion-ordered, page-number-unique page collection

mod page_set;
mod types;

pub use page_set::PageSet;
pub use types::{Genre, Movie, MovieQuery, MoviesPage};
