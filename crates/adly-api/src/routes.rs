use axum::{
    Json, Router,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::auth::{self, AppState};
use crate::middleware::{require_auth, require_session};
use crate::{ads, pages};

/// Every route of the app, with state applied. Tracing and CORS layers are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::landing))
        .route("/sign-in", get(pages::sign_in))
        .route("/auth/google", get(auth::google_start))
        .route("/auth/callback", get(auth::oauth_callback))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/health", get(health));

    let api_routes = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/api/ads", get(ads::list_ads).post(ads::create_ad))
        .route(
            "/api/ads/{id}",
            get(ads::get_ad).put(ads::update_ad).delete(ads::delete_ad),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let page_routes = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/create", get(pages::create_form).post(pages::create_submit))
        .route("/dashboard/edit/{id}", get(pages::edit_form).post(pages::edit_submit))
        .route("/dashboard/delete/{id}", get(pages::delete_confirm).post(pages::delete_submit))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(page_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
