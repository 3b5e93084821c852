use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

pub use adly_types::api::Claims;
use adly_types::routes::Route;

use crate::auth::{AppState, SESSION_COOKIE, decode_token, run_db};
use crate::error::ApiError;

/// Resolve the caller from a `Bearer` token or, failing that, the session
/// cookie.
pub fn session_claims(headers: &HeaderMap, jwt_secret: &str) -> Option<Claims> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        return decode_token(jwt_secret, token);
    }

    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    decode_token(jwt_secret, cookie.value())
}

/// Claims of a caller whose account still exists. A signed token for a user
/// that is no longer stored counts as signed out.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<Option<Claims>, ApiError> {
    let Some(claims) = session_claims(headers, &state.jwt_secret) else {
        return Ok(None);
    };
    let user_id = claims.sub.to_string();
    match run_db(state, move |db| db.get_user_by_id(&user_id)).await? {
        Some(_) => Ok(Some(claims)),
        None => {
            warn!("Session for unknown user {}", claims.sub);
            Ok(None)
        }
    }
}

/// API guard: 401 without a valid session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = current_user(&state, req.headers()).await?.ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Page guard: bounce to the sign-in page without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = current_user(&state, req.headers()).await?;
    match claims {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        None => Ok(Redirect::to(&Route::SignIn.path()).into_response()),
    }
}
