//! Read-only queries over the movie catalog
//!
//! All four access patterns are paginated and use bound parameters. The
//! detail query joins the mean rating in from the attached ratings
//! database; attachment happens lazily on the first detail lookup.

use anyhow::Result;
use rusqlite::OptionalExtension;

use crate::db::Database;
use crate::utils::format_budget;

/// Pagination window: 1-indexed page number and page size, both >= 1.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub number: i64,
    pub size: i64,
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// Sort direction for release-date ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// A case-insensitive `desc` sorts descending; anything else,
    /// including an absent parameter, sorts ascending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Summary row returned by the list queries. Genres stay as the raw
/// encoded column text; the budget is already formatted for display.
#[derive(Debug)]
pub struct MovieSummaryRow {
    pub imdb_id: String,
    pub title: String,
    pub genres: Option<String>,
    pub release_date: Option<String>,
    pub budget: String,
}

/// Detail row for a single movie, including the rating mean.
#[derive(Debug)]
pub struct MovieDetailRow {
    pub imdb_id: String,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i64>,
    pub budget: String,
    pub language: Option<String>,
    pub genres: Option<String>,
    pub production_companies: Option<String>,
    pub average_rating: Option<f64>,
}

/// Base SELECT for the movie list queries.
const SUMMARY_SELECT: &str = "SELECT imdbId, title, genres, releaseDate, budget FROM movies";

/// Query layer over the movies and ratings databases.
pub struct CatalogStore {
    db: Database,
}

impl CatalogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List movies in natural row order.
    pub fn list_all(&self, page: Page) -> Result<Vec<MovieSummaryRow>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!("{SUMMARY_SELECT} LIMIT ?1 OFFSET ?2"))?;

        let movies = stmt
            .query_map([page.limit(), page.offset()], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    /// Fetch one movie by its IMDB id, with the mean of its ratings.
    /// Returns `None` when no movie matches.
    pub async fn get_details(&self, imdb_id: &str) -> Result<Option<MovieDetailRow>> {
        self.db.attach_ratings().await?;

        let conn = self.db.conn();
        let movie = conn
            .query_row(
                "SELECT m.imdbId, m.title, m.overview, m.releaseDate, m.runtime,
                        m.budget, m.language, m.genres, m.productionCompanies,
                        (SELECT AVG(r.rating) FROM ratings.ratings r
                         WHERE r.movieId = m.movieId) AS averageRating
                 FROM movies m
                 WHERE m.imdbId = ?1",
                [imdb_id],
                |row| {
                    Ok(MovieDetailRow {
                        imdb_id: row.get(0)?,
                        title: row.get(1)?,
                        overview: row.get(2)?,
                        release_date: row.get(3)?,
                        runtime: row.get(4)?,
                        budget: format_budget(row.get::<_, Option<i64>>(5)?.unwrap_or(0)),
                        language: row.get(6)?,
                        genres: row.get(7)?,
                        production_companies: row.get(8)?,
                        average_rating: row.get(9)?,
                    })
                },
            )
            .optional()?;

        Ok(movie)
    }

    /// List movies released in the given year, ordered by release date.
    pub fn list_by_year(
        &self,
        year: &str,
        sort: SortOrder,
        page: Page,
    ) -> Result<Vec<MovieSummaryRow>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "{SUMMARY_SELECT} WHERE strftime('%Y', releaseDate) = ?1
             ORDER BY releaseDate {} LIMIT ?2 OFFSET ?3",
            sort.as_sql()
        ))?;

        let movies = stmt
            .query_map(
                rusqlite::params![year, page.limit(), page.offset()],
                summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    /// List movies whose encoded genre text contains `genre` as a
    /// case-sensitive substring.
    pub fn list_by_genre(&self, genre: &str, page: Page) -> Result<Vec<MovieSummaryRow>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "{SUMMARY_SELECT} WHERE instr(genres, ?1) > 0 LIMIT ?2 OFFSET ?3"
        ))?;

        let movies = stmt
            .query_map(
                rusqlite::params![genre, page.limit(), page.offset()],
                summary_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(movies)
    }
}

fn summary_from_row(row: &rusqlite::Row) -> rusqlite::Result<MovieSummaryRow> {
    Ok(MovieSummaryRow {
        imdb_id: row.get(0)?,
        title: row.get(1)?,
        genres: row.get(2)?,
        release_date: row.get(3)?,
        budget: format_budget(row.get::<_, Option<i64>>(4)?.unwrap_or(0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CatalogStore {
        CatalogStore::new(Database::sample().await.unwrap())
    }

    fn page(number: i64, size: i64) -> Page {
        Page { number, size }
    }

    #[tokio::test]
    async fn test_list_all_respects_page_size() {
        let store = store().await;
        let movies = store.list_all(page(1, 4)).unwrap();
        assert_eq!(movies.len(), 4);
    }

    #[tokio::test]
    async fn test_list_all_pages_are_disjoint() {
        let store = store().await;
        let first = store.list_all(page(1, 3)).unwrap();
        let second = store.list_all(page(2, 3)).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        for movie in &second {
            assert!(first.iter().all(|m| m.imdb_id != movie.imdb_id));
        }
    }

    #[tokio::test]
    async fn test_list_all_past_the_end_is_empty() {
        let store = store().await;
        assert!(store.list_all(page(4, 10)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_details_known_id() {
        let store = store().await;
        let movie = store.get_details("tt0111161").await.unwrap().unwrap();

        assert_eq!(movie.imdb_id, "tt0111161");
        assert_eq!(movie.title, "The Shawshank Redemption");
        assert_eq!(movie.budget, "$25,000,000");
        assert_eq!(movie.runtime, Some(142));
        assert_eq!(movie.average_rating, Some(4.0));
    }

    #[tokio::test]
    async fn test_get_details_unknown_id() {
        let store = store().await;
        assert!(store.get_details("tt9999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_details_without_ratings() {
        let store = store().await;
        let movie = store.get_details("tt0068646").await.unwrap().unwrap();
        assert_eq!(movie.average_rating, None);
    }

    #[tokio::test]
    async fn test_get_details_null_budget() {
        let store = store().await;
        let movie = store.get_details("tt0071562").await.unwrap().unwrap();
        assert_eq!(movie.budget, "$0");
    }

    #[tokio::test]
    async fn test_list_by_year_ascending_unless_desc() {
        let store = store().await;

        for sort in [
            SortOrder::from_param(None),
            SortOrder::from_param(Some("asc")),
            SortOrder::from_param(Some("sideways")),
        ] {
            let movies = store.list_by_year("1994", sort, page(1, 50)).unwrap();
            let dates: Vec<_> = movies
                .iter()
                .map(|m| m.release_date.as_deref().unwrap())
                .collect();
            assert_eq!(dates, ["1994-07-06", "1994-09-10", "1994-09-23"]);
        }
    }

    #[tokio::test]
    async fn test_list_by_year_descending() {
        let store = store().await;
        let movies = store
            .list_by_year("1994", SortOrder::from_param(Some("DESC")), page(1, 50))
            .unwrap();

        let ids: Vec<_> = movies.iter().map(|m| m.imdb_id.as_str()).collect();
        assert_eq!(ids, ["tt0111161", "tt0110912", "tt0109830"]);
    }

    #[tokio::test]
    async fn test_list_by_year_no_matches() {
        let store = store().await;
        let movies = store
            .list_by_year("1985", SortOrder::Asc, page(1, 50))
            .unwrap();
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_genre_substring_match() {
        let store = store().await;
        let movies = store.list_by_genre("Dram", page(1, 50)).unwrap();

        assert_eq!(movies.len(), 5);
        assert!(movies.iter().any(|m| m.imdb_id == "tt0111161"));
        assert!(movies.iter().all(|m| m.imdb_id != "tt0110912"));
    }

    #[tokio::test]
    async fn test_list_by_genre_is_case_sensitive() {
        let store = store().await;
        assert!(store.list_by_genre("drama", page(1, 50)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_genre_paginates() {
        let store = store().await;
        let movies = store.list_by_genre("Drama", page(2, 2)).unwrap();
        assert_eq!(movies.len(), 2);
    }
}
