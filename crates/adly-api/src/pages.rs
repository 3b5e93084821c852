use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use adly_types::api::Claims;
use adly_types::models::AdStatus;
use adly_types::routes::Route;
use adly_types::validate::{AdInput, FieldErrors};

use crate::ads::{fetch_ad, fetch_ads, remove_ad, store_new_ad, store_update};
use crate::auth::AppState;
use crate::error::{ApiError, NOT_FOUND_MESSAGE};
use crate::html::{self, FormView};
use crate::middleware::current_user;

const CREATE_HEADING: &str = "Create New Ad";
const CREATE_INTRO: &str = "Fill out the form below to create a new advertisement.";
const EDIT_HEADING: &str = "Edit Ad";
const EDIT_INTRO: &str = "Update your advertisement details below.";

#[derive(Debug, Deserialize)]
pub struct SignInQuery {
    pub error: Option<String>,
}

/// GET /
pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, ApiError> {
    let authenticated = current_user(&state, &headers).await?.is_some();
    Ok(Redirect::to(&Route::landing_target(authenticated).path()))
}

/// GET /sign-in
pub async fn sign_in(Query(query): Query<SignInQuery>) -> impl IntoResponse {
    html::sign_in_page(query.error.as_deref())
}

/// GET /dashboard
pub async fn dashboard(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> Response {
    match fetch_ads(&state, claims.sub).await {
        Ok(ads) => html::dashboard_page(&ads, None).into_response(),
        Err(e) => {
            warn!("Dashboard fetch failed for {}: {}", claims.sub, e);
            (StatusCode::INTERNAL_SERVER_ERROR, html::dashboard_page(&[], Some("Failed to fetch ads")))
                .into_response()
        }
    }
}

/// GET /dashboard/create
pub async fn create_form() -> impl IntoResponse {
    let values = AdInput {
        status: Some(AdStatus::default().as_str().to_string()),
        ..Default::default()
    };
    render_form(CREATE_HEADING, CREATE_INTRO, Route::CreateAd, "Create Ad", &values, &FieldErrors::new(), None)
}

/// POST /dashboard/create
pub async fn create_submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(input): Form<AdInput>,
) -> Response {
    let route = Route::CreateAd;
    let fields = match input.check() {
        Ok(fields) => fields,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_form(CREATE_HEADING, CREATE_INTRO, route, "Create Ad", &input, &errors, None),
            )
                .into_response();
        }
    };

    match store_new_ad(&state, claims.sub, fields).await {
        Ok(_) => Redirect::to(&Route::Dashboard.path()).into_response(),
        Err(e) => {
            let message = format!("Failed to save ad: {}", e);
            (
                e.status(),
                render_form(CREATE_HEADING, CREATE_INTRO, route, "Create Ad", &input, &errors_of(&e), Some(&message)),
            )
                .into_response()
        }
    }
}

/// GET /dashboard/edit/{id}
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match fetch_ad(&state, claims.sub, id.clone()).await {
        Ok(ad) => render_form(
            EDIT_HEADING,
            EDIT_INTRO,
            Route::EditAd(id),
            "Update Ad",
            &AdInput::from_fields(&ad.fields()),
            &FieldErrors::new(),
            None,
        )
        .into_response(),
        Err(e) => load_failure(e),
    }
}

/// POST /dashboard/edit/{id}
pub async fn edit_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Form(input): Form<AdInput>,
) -> Response {
    let route = Route::EditAd(id.clone());
    let fields = match input.check() {
        Ok(fields) => fields,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_form(EDIT_HEADING, EDIT_INTRO, route, "Update Ad", &input, &errors, None),
            )
                .into_response();
        }
    };

    match store_update(&state, claims.sub, id, fields).await {
        Ok(_) => Redirect::to(&Route::Dashboard.path()).into_response(),
        Err(ApiError::NotFound) => not_found(),
        Err(e) => {
            let message = format!("Failed to save ad: {}", e);
            (
                e.status(),
                render_form(EDIT_HEADING, EDIT_INTRO, route, "Update Ad", &input, &errors_of(&e), Some(&message)),
            )
                .into_response()
        }
    }
}

/// GET /dashboard/delete/{id}: the confirmation step.
pub async fn delete_confirm(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match fetch_ad(&state, claims.sub, id).await {
        Ok(ad) => html::delete_confirm_page(&ad).into_response(),
        Err(e) => load_failure(e),
    }
}

/// POST /dashboard/delete/{id}: confirmed; delete and go back to the list.
pub async fn delete_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match remove_ad(&state, claims.sub, id).await {
        Ok(()) => Redirect::to(&Route::Dashboard.path()).into_response(),
        Err(ApiError::NotFound) => not_found(),
        Err(e) => {
            warn!("Delete failed for {}: {}", claims.sub, e);
            // Keep showing whatever can still be listed.
            let ads = fetch_ads(&state, claims.sub).await.unwrap_or_default();
            (e.status(), html::dashboard_page(&ads, Some("Failed to delete ad"))).into_response()
        }
    }
}

fn render_form(
    heading: &str,
    intro: &str,
    route: Route,
    submit_label: &str,
    values: &AdInput,
    errors: &FieldErrors,
    submit_error: Option<&str>,
) -> axum::response::Html<String> {
    html::form_page(FormView {
        heading,
        intro,
        action: route.path(),
        submit_label,
        values,
        errors,
        submit_error,
    })
}

fn errors_of(e: &ApiError) -> FieldErrors {
    match e {
        ApiError::Validation(errors) => errors.clone(),
        _ => FieldErrors::new(),
    }
}

fn load_failure(e: ApiError) -> Response {
    match e {
        ApiError::NotFound => not_found(),
        other => {
            warn!("Failed to load ad: {}", other);
            (other.status(), html::error_page("Failed to load ad")).into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, html::not_found_page(NOT_FOUND_MESSAGE)).into_response()
}
