//! The `MovieProvider` seam.
//!
//! Strategies never talk to TMDB or the static files directly; they ask a
//! provider. The live implementation is the TMDB REST client, the offline one
//! is `CatalogIndex` itself.

use crate::types::*;
use async_trait::async_trait;

/// Source of movie metadata
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Full movie record with credits, `None` if the movie is unknown
    async fn movie_details(&self, id: MovieId) -> anyhow::Result<Option<Movie>>;

    /// Popular movies, optionally restricted to one genre, most popular first
    async fn popular_movies(
        &self,
        genre: Option<GenreId>,
        limit: usize,
    ) -> anyhow::Result<Vec<MovieSummary>>;

    /// Movies a person appeared in
    async fn person_filmography(&self, person: PersonId) -> anyhow::Result<Vec<MovieSummary>>;

    /// The genre list
    async fn genres(&self) -> anyhow::Result<Vec<Genre>>;

    /// Title search, optionally narrowed to a release year
    async fn search_movies(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<MovieSummary>>;
}

#[async_trait]
impl MovieProvider for CatalogIndex {
    fn name(&self) -> &str {
        "offline_catalog"
    }

    async fn movie_details(&self, id: MovieId) -> anyhow::Result<Option<Movie>> {
        Ok(self.get_movie(id).cloned())
    }

    async fn popular_movies(
        &self,
        genre: Option<GenreId>,
        limit: usize,
    ) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(CatalogIndex::popular_movies(self, genre, limit)
            .into_iter()
            .map(MovieSummary::from)
            .collect())
    }

    async fn person_filmography(&self, person: PersonId) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(self
            .get_filmography(person)
            .iter()
            .filter_map(|id| self.get_movie(*id))
            .map(MovieSummary::from)
            .collect())
    }

    async fn genres(&self) -> anyhow::Result<Vec<Genre>> {
        Ok(CatalogIndex::genres(self).to_vec())
    }

    async fn search_movies(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(self
            .search_titles(query, year)
            .into_iter()
            .map(MovieSummary::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        let crime = Genre { id: 80, name: "Crime".to_string() };
        let pacino = Person { id: 1158, name: "Al Pacino".to_string(), profile_path: None };

        index.insert_genre(crime.clone());
        index.insert_movie(Movie {
            id: 238,
            title: "The Godfather".to_string(),
            release_date: "1972-03-14".to_string(),
            genres: vec![crime.clone()],
            popularity: 90.0,
            cast: vec![pacino.clone()],
            ..Default::default()
        });
        index.insert_movie(Movie {
            id: 949,
            title: "Heat".to_string(),
            release_date: "1995-12-15".to_string(),
            genres: vec![crime],
            popularity: 40.0,
            cast: vec![pacino],
            ..Default::default()
        });
        index.build_secondary_indices();
        index
    }

    #[tokio::test]
    async fn test_offline_provider_details() {
        let provider: Arc<dyn MovieProvider> = Arc::new(sample_index());

        let movie = provider.movie_details(949).await.unwrap().unwrap();
        assert_eq!(movie.title, "Heat");
        assert!(provider.movie_details(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_offline_provider_lists() {
        let index = sample_index();
        let provider: &dyn MovieProvider = &index;

        let popular = provider.popular_movies(Some(80), 10).await.unwrap();
        let ids: Vec<MovieId> = popular.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![238, 949]);

        let films = provider.person_filmography(1158).await.unwrap();
        assert_eq!(films.len(), 2);

        let found = provider.search_movies("godfather", Some(1972)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(provider.search_movies("godfather", Some(1990)).await.unwrap().is_empty());

        assert_eq!(provider.genres().await.unwrap().len(), 1);
    }
}
