use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use adly_db::models::AdRow;
use adly_types::api::Claims;
use adly_types::models::{Ad, AdFields, AdStatus};
use adly_types::validate::{AdInput, validate_ad};

use crate::auth::{AppState, run_db};
use crate::error::ApiError;

// -- Owner-scoped operations, shared by the JSON API and the pages --

pub(crate) async fn fetch_ads(state: &AppState, owner: Uuid) -> Result<Vec<Ad>, ApiError> {
    let owner_id = owner.to_string();
    let rows = run_db(state, move |db| db.list_ads(&owner_id)).await?;
    Ok(rows.into_iter().map(ad_from_row).collect())
}

pub(crate) async fn fetch_ad(state: &AppState, owner: Uuid, id: String) -> Result<Ad, ApiError> {
    let owner_id = owner.to_string();
    run_db(state, move |db| db.get_ad(&id, &owner_id))
        .await?
        .map(ad_from_row)
        .ok_or(ApiError::NotFound)
}

/// Validate, then insert with the caller as owner.
pub(crate) async fn store_new_ad(state: &AppState, owner: Uuid, fields: AdFields) -> Result<Ad, ApiError> {
    let errors = validate_ad(&fields);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let id = Uuid::new_v4().to_string();
    let owner_id = owner.to_string();
    let row = run_db(state, move |db| db.insert_ad(&id, &owner_id, &fields)).await?;
    info!("Ad {} created by {}", row.id, owner);
    Ok(ad_from_row(row))
}

/// Validate, then replace every editable field of an ad the caller owns.
pub(crate) async fn store_update(
    state: &AppState,
    owner: Uuid,
    id: String,
    fields: AdFields,
) -> Result<Ad, ApiError> {
    let errors = validate_ad(&fields);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let owner_id = owner.to_string();
    let row = run_db(state, move |db| db.update_ad(&id, &owner_id, &fields))
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("Ad {} updated by {}", row.id, owner);
    Ok(ad_from_row(row))
}

pub(crate) async fn remove_ad(state: &AppState, owner: Uuid, id: String) -> Result<(), ApiError> {
    let owner_id = owner.to_string();
    let ad_id = id.clone();
    let deleted = run_db(state, move |db| db.delete_ad(&ad_id, &owner_id)).await?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    info!("Ad {} deleted by {}", id, owner);
    Ok(())
}

// -- JSON handlers --

/// GET /api/ads
pub async fn list_ads(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Ad>>, ApiError> {
    Ok(Json(fetch_ads(&state, claims.sub).await?))
}

/// Missing fields and unknown statuses come back as field errors, like a
/// form post, instead of a deserialization failure.
fn checked_body(body: Result<Json<AdInput>, JsonRejection>) -> Result<AdFields, ApiError> {
    let Json(input) = body?;
    input.check().map_err(ApiError::Validation)
}

/// POST /api/ads
pub async fn create_ad(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<AdInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = checked_body(body)?;
    let ad = store_new_ad(&state, claims.sub, fields).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

/// GET /api/ads/{id}
pub async fn get_ad(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Ad>, ApiError> {
    Ok(Json(fetch_ad(&state, claims.sub, id).await?))
}

/// PUT /api/ads/{id}
pub async fn update_ad(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<AdInput>, JsonRejection>,
) -> Result<Json<Ad>, ApiError> {
    let fields = checked_body(body)?;
    Ok(Json(store_update(&state, claims.sub, id, fields).await?))
}

/// DELETE /api/ads/{id}
pub async fn delete_ad(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    remove_ad(&state, claims.sub, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn ad_from_row(row: AdRow) -> Ad {
    Ad {
        status: row.status.parse().unwrap_or_else(|e| {
            warn!("Corrupt status on ad '{}': {}", row.id, e);
            AdStatus::Inactive
        }),
        user_id: row.owner_id.parse().unwrap_or_else(|e| {
            warn!("Corrupt owner_id '{}' on ad '{}': {}", row.owner_id, row.id, e);
            Uuid::default()
        }),
        created_at: row
            .created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .or_else(|_| {
                // Rows written by hand may use SQLite's "YYYY-MM-DD HH:MM:SS".
                chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on ad '{}': {}", row.created_at, row.id, e);
                chrono::DateTime::default()
            }),
        id: row.id,
        title: row.title,
        description: row.description,
        destination_url: row.destination_url,
    }
}
