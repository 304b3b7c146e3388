//! Raw TMDB response shapes and their mapping onto catalog types.
//!
//! TMDB omits or nulls fields freely, so every field here is defaulted and
//! the conversion fills in the documented fallbacks ("Untitled", empty
//! overview, no credits).

use catalog::{Genre, Movie, MovieSummary, Person};
use serde::Deserialize;

/// Maximum number of billed cast members kept on a movie
pub const MAX_CAST: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct RawMovie {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub popularity: Option<f32>,
    #[serde(default)]
    pub credits: Option<RawCredits>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCredits {
    #[serde(default)]
    pub cast: Vec<RawCastMember>,
    #[serde(default)]
    pub crew: Vec<RawCrewMember>,
}

#[derive(Debug, Deserialize)]
pub struct RawCastMember {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCrewMember {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Paged list response (`movie/popular`, `discover/movie`, `search/movie`)
#[derive(Debug, Default, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub results: Vec<RawMovie>,
}

/// `person/{id}/movie_credits`
#[derive(Debug, Default, Deserialize)]
pub struct RawPersonCredits {
    #[serde(default)]
    pub cast: Vec<RawMovie>,
    #[serde(default)]
    pub crew: Vec<RawMovie>,
}

/// `genre/movie/list`
#[derive(Debug, Default, Deserialize)]
pub struct RawGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        let credits = raw.credits.unwrap_or_default();
        let cast = credits
            .cast
            .into_iter()
            .take(MAX_CAST)
            .map(|c| Person {
                id: c.id,
                name: c.name,
                profile_path: c.profile_path,
            })
            .collect();
        let directors = credits
            .crew
            .into_iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
            .map(|c| Person {
                id: c.id,
                name: c.name,
                profile_path: c.profile_path,
            })
            .collect();

        Movie {
            id: raw.id,
            title: title_or_default(raw.title),
            overview: raw.overview.unwrap_or_default(),
            release_date: raw.release_date.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            genres: raw.genres,
            vote_average: raw.vote_average.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            popularity: raw.popularity.unwrap_or_default(),
            cast,
            directors,
        }
    }
}

impl From<RawMovie> for MovieSummary {
    fn from(raw: RawMovie) -> Self {
        MovieSummary {
            id: raw.id,
            title: title_or_default(raw.title),
            release_date: raw.release_date.unwrap_or_default(),
            popularity: raw.popularity.unwrap_or_default(),
            vote_average: raw.vote_average.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
        }
    }
}

fn title_or_default(title: Option<String>) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => "Untitled".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_mapping() {
        let mut cast = String::new();
        for i in 0..12 {
            if i > 0 {
                cast.push(',');
            }
            cast.push_str(&format!(r#"{{"id": {}, "name": "Actor {}"}}"#, i, i));
        }
        let body = format!(
            r#"{{
                "id": 603,
                "title": "The Matrix",
                "overview": null,
                "release_date": "1999-03-30",
                "genres": [{{"id": 28, "name": "Action"}}],
                "vote_average": 8.2,
                "vote_count": 24000,
                "credits": {{
                    "cast": [{}],
                    "crew": [
                        {{"id": 9339, "name": "Lilly Wachowski", "job": "Director"}},
                        {{"id": 1, "name": "Someone", "job": "Producer"}}
                    ]
                }}
            }}"#,
            cast
        );

        let raw: RawMovie = serde_json::from_str(&body).unwrap();
        let movie = Movie::from(raw);

        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.overview, "");
        assert_eq!(movie.cast.len(), MAX_CAST);
        assert_eq!(movie.directors.len(), 1);
        assert_eq!(movie.directors[0].name, "Lilly Wachowski");
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_missing_title_defaults() {
        let raw: RawMovie = serde_json::from_str(r#"{"id": 5, "title": null}"#).unwrap();
        let summary = MovieSummary::from(raw);
        assert_eq!(summary.title, "Untitled");
        assert_eq!(summary.vote_count, 0);
    }

    #[test]
    fn test_page_mapping() {
        let page: RawPage = serde_json::from_str(
            r#"{"page": 1, "results": [
                {"id": 1, "title": "A", "popularity": 10.5, "genre_ids": [18]},
                {"id": 2, "title": "B", "vote_count": 800}
            ]}"#,
        )
        .unwrap();

        let summaries: Vec<MovieSummary> = page.results.into_iter().map(Into::into).collect();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].popularity, 10.5);
        assert_eq!(summaries[1].vote_count, 800);
    }
}
