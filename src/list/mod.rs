//! Paged movie list state machine.
//!
//! [`ListController`] owns pagination state, merges cached and fresh pages,
//! and publishes UI-facing state through [`Observable`] fields. Commands come
//! from the host; fetch callbacks arrive through the controller's own event
//! channel and are applied on the host's context.
//!
//! # Module Structure
//!
//! - `controller` - Commands, fetch issuance, callback handling
//! - `observable` - `watch`-backed publish/subscribe value holder
//! - `item` - Display row derived from a movie

mod controller;
mod item;
mod observable;

pub use controller::ListController;
pub use item::ListItem;
pub use observable::Observable;

use crate::movie::{Movie, MovieQuery};

pub const SCREEN_TITLE: &str = "Movies";
pub const EMPTY_DATA_TITLE: &str = "No movie :(";
pub const ERROR_TITLE: &str = "Error";
pub const SEARCH_BAR_PLACEHOLDER: &str = "Search Movies";

/// Shown when a fetch fails because no network is reachable.
pub const ERR_NO_CONNECTION: &str = "No internet connection";
/// Shown for every other fetch failure.
pub const ERR_LOAD_FAILED: &str = "Failed loading movies";

/// Which listing is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    Trending,
    Search(MovieQuery),
}

/// Kind of load in progress. `None` in the observable means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    FullScreen,
    NextPage,
}

/// Navigation collaborator notified by the controller.
pub trait ListActions {
    fn show_movie_details(&mut self, movie: &Movie);

    /// Present prior queries, most recent first. The host reports a choice
    /// back through [`ListController::select_suggestion`].
    fn show_query_suggestions(&mut self, recent: &[MovieQuery]);

    fn close_query_suggestions(&mut self);
}
