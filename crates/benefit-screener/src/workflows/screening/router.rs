use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;

use super::domain::{ClientId, Household};
use super::repository::HouseholdRepository;
use super::service::{HouseholdMutation, ScreeningService};

/// Optional evaluation date; today when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn resolve(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Router builder exposing screening and household recomputation endpoints.
pub fn screening_router<R>(service: Arc<ScreeningService<R>>) -> Router
where
    R: HouseholdRepository + 'static,
{
    Router::new()
        .route("/api/v1/screenings", post(screen_handler::<R>))
        .route(
            "/api/v1/households/:client_id",
            get(household_handler::<R>),
        )
        .route(
            "/api/v1/households/:client_id/evaluate",
            post(evaluate_handler::<R>),
        )
        .route(
            "/api/v1/households/:client_id/mutations",
            post(mutation_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn screen_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Query(query): Query<AsOfQuery>,
    axum::Json(household): axum::Json<Household>,
) -> Response
where
    R: HouseholdRepository + 'static,
{
    let report = service.screen(household, query.resolve());
    (StatusCode::OK, axum::Json(report)).into_response()
}

pub(crate) async fn household_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(client_id): Path<String>,
) -> Response
where
    R: HouseholdRepository + 'static,
{
    match service.get(&ClientId(client_id)) {
        Ok(household) => (StatusCode::OK, axum::Json(household)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(client_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    R: HouseholdRepository + 'static,
{
    let client_id = ClientId(client_id);
    match service.recompute(&client_id, query.resolve()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => {
            warn!(client = %client_id, error = %err, "recompute failed");
            AppError::from(err).into_response()
        }
    }
}

pub(crate) async fn mutation_handler<R>(
    State(service): State<Arc<ScreeningService<R>>>,
    Path(client_id): Path<String>,
    Query(query): Query<AsOfQuery>,
    axum::Json(mutation): axum::Json<HouseholdMutation>,
) -> Response
where
    R: HouseholdRepository + 'static,
{
    let client_id = ClientId(client_id);
    match service.apply_mutation(&client_id, mutation, query.resolve()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => {
            warn!(client = %client_id, error = %err, "household mutation rejected");
            AppError::from(err).into_response()
        }
    }
}
