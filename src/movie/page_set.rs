//! Insertion-ordered collection of pages keyed by page number.

use super::{Movie, MoviesPage};

/// At most one page per page number.
///
/// Inserting a page whose number is already present drops the old page and
/// appends the new one at the end. Flattening follows insertion order, not
/// page order; pages are requested sequentially, so in practice the two agree.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pages: Vec<MoviesPage>,
}

impl PageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace-or-append by page number.
    pub fn insert(&mut self, page: MoviesPage) {
        self.pages.retain(|p| p.page != page.page);
        self.pages.push(page);
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, page: u32) -> Option<&MoviesPage> {
        self.pages.iter().find(|p| p.page == page)
    }

    /// All movies across pages, in insertion order.
    pub fn movies(&self) -> Vec<Movie> {
        self.pages
            .iter()
            .flat_map(|p| p.movies.iter().cloned())
            .collect()
    }

    /// Movie at a flattened index without building the full list.
    pub fn movie_at(&self, index: usize) -> Option<&Movie> {
        self.pages.iter().flat_map(|p| p.movies.iter()).nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::Genre;
    use proptest::prelude::*;

    fn movie(id: &str) -> Movie {
        Movie {
            id: id.into(),
            title: format!("title {id}").into(),
            genre: Genre::Adventure,
            poster_path: None,
            overview: String::new(),
            release_date: None,
            vote_average: None,
        }
    }

    fn page(number: u32, ids: &[&str]) -> MoviesPage {
        MoviesPage {
            page: number,
            total_pages: 3,
            movies: ids.iter().map(|id| movie(id)).collect(),
        }
    }

    fn ids(movies: &[Movie]) -> Vec<String> {
        movies.iter().map(|m| m.id.to_string()).collect()
    }

    #[test]
    fn test_insert_appends_in_arrival_order() {
        let mut set = PageSet::new();
        set.insert(page(1, &["a", "b"]));
        set.insert(page(2, &["c"]));
        assert_eq!(ids(&set.movies()), vec!["a", "b", "c"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_reinsert_replaces_without_duplication() {
        let mut set = PageSet::new();
        set.insert(page(1, &["cached"]));
        set.insert(page(1, &["a", "b"]));
        assert_eq!(set.len(), 1);
        assert_eq!(ids(&set.movies()), vec!["a", "b"]);
    }

    #[test]
    fn test_replaced_page_moves_to_end() {
        let mut set = PageSet::new();
        set.insert(page(1, &["a"]));
        set.insert(page(2, &["b"]));
        set.insert(page(1, &["a2"]));
        assert_eq!(ids(&set.movies()), vec!["b", "a2"]);
    }

    #[test]
    fn test_movie_at_matches_flattened() {
        let mut set = PageSet::new();
        set.insert(page(1, &["a", "b"]));
        set.insert(page(2, &["c"]));
        assert_eq!(set.movie_at(2).map(|m| &*m.id), Some("c"));
        assert!(set.movie_at(3).is_none());
    }

    #[test]
    fn test_clear() {
        let mut set = PageSet::new();
        set.insert(page(1, &["a"]));
        set.clear();
        assert!(set.is_empty());
        assert!(set.movies().is_empty());
        assert!(set.get(1).is_none());
    }

    proptest! {
        #[test]
        fn prop_one_page_per_number(numbers in proptest::collection::vec(1u32..6, 0..40)) {
            let mut set = PageSet::new();
            for n in &numbers {
                let id = format!("m{n}");
                set.insert(page(*n, &[id.as_str()]));
            }
            let mut distinct = numbers.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(set.len(), distinct.len());
            prop_assert_eq!(set.movies().len(), distinct.len());
            if let Some(last) = numbers.last() {
                prop_assert_eq!(set.pages.last().map(|p| p.page), Some(*last));
            }
        }
    }
}
