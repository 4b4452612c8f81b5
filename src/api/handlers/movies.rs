//! Movie catalog handlers
//!
//! Validates query parameters, runs the catalog queries, and shapes rows
//! into response objects. List entries use camelCase fields while the
//! detail object uses snake_case, matching the published API surface.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{AppError, AppState};
use crate::db::catalog::{MovieDetailRow, MovieSummaryRow, Page, SortOrder};
use crate::utils::decode_string_list;

/// Query parameters accepted by the list endpoints. Parsed by hand so a
/// bad value reports the violated constraint rather than a bare
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
    sort: Option<String>,
}

impl ListParams {
    fn pagination(&self) -> Result<Page, AppError> {
        let number = parse_positive("page", self.page.as_deref(), 1)?;
        let size = parse_positive("pageSize", self.page_size.as_deref(), 50)?;
        Ok(Page { number, size })
    }

    fn sort_order(&self) -> Result<SortOrder, AppError> {
        match self.sort.as_deref() {
            None => Ok(SortOrder::Asc),
            Some(value)
                if value.eq_ignore_ascii_case("asc") || value.eq_ignore_ascii_case("desc") =>
            {
                Ok(SortOrder::from_param(Some(value)))
            }
            Some(_) => Err(AppError::bad_request("sort must be 'asc' or 'desc'")),
        }
    }
}

fn parse_positive(name: &str, value: Option<&str>, default: i64) -> Result<i64, AppError> {
    let Some(value) = value else {
        return Ok(default);
    };

    value
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| AppError::bad_request(format!("{name} must be an integer >= 1")))
}

/// Movie list entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub release_date: Option<String>,
    pub budget: String,
}

impl From<MovieSummaryRow> for MovieSummary {
    fn from(row: MovieSummaryRow) -> Self {
        Self {
            imdb_id: row.imdb_id,
            title: row.title,
            genres: decode_string_list(row.genres.as_deref()),
            release_date: row.release_date,
            budget: row.budget,
        }
    }
}

/// Movie detail object
#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i64>,
    pub genres: Vec<String>,
    pub original_language: String,
    pub production_companies: Vec<String>,
    pub average_rating: Option<f64>,
    pub budget: String,
}

impl From<MovieDetailRow> for MovieDetail {
    fn from(row: MovieDetailRow) -> Self {
        Self {
            imdb_id: row.imdb_id,
            title: row.title,
            description: row.overview,
            release_date: row.release_date,
            runtime: row.runtime,
            genres: decode_string_list(row.genres.as_deref()),
            original_language: row
                .language
                .filter(|lang| !lang.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            production_companies: decode_string_list(row.production_companies.as_deref()),
            average_rating: row.average_rating,
            budget: row.budget,
        }
    }
}

/// List movies
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let page = params.pagination()?;
    let movies = state.catalog.list_all(page)?;

    Ok(Json(movies.into_iter().map(MovieSummary::from).collect()))
}

/// Get a single movie by IMDB id
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetail>, AppError> {
    let movie = state
        .catalog
        .get_details(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Movie not found"))?;

    Ok(Json(MovieDetail::from(movie)))
}

/// List movies released in a given year
pub async fn by_year(
    State(state): State<AppState>,
    Path(year): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let sort = params.sort_order()?;
    let page = params.pagination()?;
    let movies = state.catalog.list_by_year(&year, sort, page)?;

    Ok(Json(movies.into_iter().map(MovieSummary::from).collect()))
}

/// List movies matching a genre
pub async fn by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let page = params.pagination()?;
    let movies = state.catalog.list_by_genre(&genre, page)?;

    Ok(Json(movies.into_iter().map(MovieSummary::from).collect()))
}
