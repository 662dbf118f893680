use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Data Structures
// ============================================================================

/// Closed set of genres the catalog reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Drama,
    Horror,
    ScienceFiction,
}

/// A single catalog entry.
///
/// Immutable once built. `id` and `title` use `Arc<str>` so that pages can be
/// cloned into caches and observers without copying strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub genre: Genre,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// One fetched batch of movies plus its position in the paginated sequence.
///
/// `page` is 1-based. `total_pages == 0` is a valid "no results" answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesPage {
    pub page: u32,
    pub total_pages: u32,
    pub movies: Vec<Movie>,
}

/// Free-text search query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieQuery {
    pub query: String,
}

impl MovieQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

impl From<&str> for MovieQuery {
    fn from(query: &str) -> Self {
        Self::new(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_deserializes_with_optional_fields_missing() {
        let json = r#"{"id": "603", "title": "The Matrix", "genre": "science_fiction"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(&*movie.id, "603");
        assert_eq!(movie.genre, Genre::ScienceFiction);
        assert!(movie.poster_path.is_none());
        assert!(movie.release_date.is_none());
        assert!(movie.vote_average.is_none());
        assert!(movie.overview.is_empty());
    }

    #[test]
    fn test_movie_release_date_parses_iso() {
        let json = r#"{"id": "1", "title": "Dune", "genre": "adventure", "release_date": "2021-09-15"}"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(2021, 9, 15));
    }

    #[test]
    fn test_unknown_genre_rejected() {
        let json = r#"{"id": "1", "title": "x", "genre": "western"}"#;
        assert!(serde_json::from_str::<Movie>(json).is_err());
    }

    #[test]
    fn test_movie_query_empty() {
        assert!(MovieQuery::new("").is_empty());
        assert!(!MovieQuery::from("dune").is_empty());
    }
}
