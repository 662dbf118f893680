use crate::movie::Movie;
use std::sync::Arc;

/// Display-ready row for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub title: Arc<str>,
    pub overview: String,
    pub release_date: String,
    pub rating: Option<String>,
    pub poster_path: Option<String>,
}

impl From<&Movie> for ListItem {
    fn from(movie: &Movie) -> Self {
        let release_date = match movie.release_date {
            Some(date) => format!("Release Date: {}", date.format("%B %-d, %Y")),
            None => "Release Date: To be announced".to_string(),
        };
        Self {
            title: Arc::clone(&movie.title),
            overview: movie.overview.clone(),
            release_date,
            rating: movie.vote_average.map(|v| format!("{v:.1}")),
            poster_path: movie.poster_path.clone(),
        }
    }
}
