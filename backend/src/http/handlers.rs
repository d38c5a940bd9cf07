//! HTTP handlers for the REST API.
//!
//! Each handler decodes and validates its input, then delegates to the
//! [`PersonLogic`](crate::services::PersonLogic) held in [`AppState`].

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, FromRequestParts, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use std::convert::Infallible;

use super::dto::{HealthResponse, IdQuery, PersonPayload};
use super::error::AppError;
use super::state::AppState;
use crate::context::Context;
use crate::models::{Person, PersonId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// The caller's [`Context`], taken from the request extensions.
///
/// Requests that carry no context get a background context that is never
/// cancelled and has no deadline.
#[derive(Debug, Clone)]
pub struct RequestContext(pub Context);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::background);
        Ok(RequestContext(ctx))
    }
}

fn decode_person(payload: Result<Json<PersonPayload>, JsonRejection>) -> Result<Person, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::Decode(e.body_text()))?;
    payload.validate().map_err(|missing| {
        AppError::Validation(format!("missing required field(s): {}", missing.join(", ")))
    })
}

fn parse_id(query: Result<Query<IdQuery>, QueryRejection>) -> Result<PersonId, AppError> {
    let Query(query) = query.map_err(|e| AppError::InvalidId(e.body_text()))?;
    query.parse().map_err(AppError::InvalidId)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Person CRUD
// =============================================================================

/// GET /person/persons/
///
/// List all persons ordered by id.
pub async fn list_persons(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
) -> HandlerResult<Vec<Person>> {
    let persons = state.logic.get(&ctx).await?;
    Ok(Json(persons))
}

/// GET /person/persons/getById/?id=<id>
pub async fn get_person(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> HandlerResult<Person> {
    let id = parse_id(query)?;
    let person = state.logic.get_by_id(&ctx, id).await.map_err(AppError::Lookup)?;
    Ok(Json(person))
}

/// POST /person/persons/
///
/// Store a new person. The response echoes the input with the assigned id.
pub async fn create_person(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = decode_person(payload)?;
    let id = state.logic.add(&ctx, person.clone()).await?;
    tracing::info!(id = %id, "person created");
    Ok((StatusCode::CREATED, Json(person.with_id(id))))
}

/// PUT /person/persons/
///
/// Overwrite the person identified by the body's `id`.
pub async fn update_person(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    payload: Result<Json<PersonPayload>, JsonRejection>,
) -> HandlerResult<Person> {
    let person = decode_person(payload)?;
    state.logic.update(&ctx, person.clone()).await?;
    Ok(Json(person))
}

/// DELETE /person/persons/?id=<id>
pub async fn delete_person(
    State(state): State<AppState>,
    RequestContext(ctx): RequestContext,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(query)?;
    state.logic.delete(&ctx, id).await?;
    tracing::info!(id = %id, "person deleted");
    Ok(StatusCode::NO_CONTENT)
}
