use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use tracing::{error, info, warn};
use uuid::Uuid;

use adly_db::Database;
use adly_types::api::{Claims, OAuthCallbackQuery, SessionResponse};
use adly_types::routes::Route;

use crate::error::ApiError;
use crate::oauth::IdentityProvider;

pub use adly_types::api::SESSION_COOKIE;
pub const STATE_COOKIE: &str = "adly_oauth_state";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub provider: IdentityProvider,
    /// Adds `Secure` to cookies; off for plain-http local runs.
    pub secure_cookies: bool,
}

/// Run a blocking DB call off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
        .map_err(ApiError::Internal)
}

/// GET /auth/google: start the sign-in redirect.
pub async fn google_start(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let nonce = random_state();
    let url = state
        .provider
        .authorize_url(&nonce)
        .map_err(|e| ApiError::Internal(e.into()))?;

    let cookie = Cookie::build((STATE_COOKIE, nonce))
        .path("/auth")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Redirect::to(url.as_str())))
}

/// GET /auth/callback: finish sign-in and establish the session cookie.
///
/// Every failure lands back on the sign-in page with a readable `error`.
pub async fn oauth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> impl IntoResponse {
    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path("/auth"));

    match finish_sign_in(&state, expected, query).await {
        Ok((token, email)) => {
            info!("Signed in {} via {}", email, state.provider.name());
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(state.secure_cookies)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to(&Route::Dashboard.path()))
        }
        Err(message) => {
            warn!("Sign-in failed: {}", message);
            (jar, Redirect::to(&sign_in_error_target(&message)))
        }
    }
}

async fn finish_sign_in(
    state: &AppState,
    expected_state: Option<String>,
    query: OAuthCallbackQuery,
) -> Result<(String, String), String> {
    if let Some(err) = query.error {
        return Err(format!("Sign-in was cancelled ({})", err));
    }
    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        return Err("Sign-in response was incomplete".into());
    };
    if expected_state.as_deref() != Some(returned_state.as_str()) {
        return Err("Sign-in session expired, please try again".into());
    }

    let identity = state
        .provider
        .exchange(&code)
        .await
        .map_err(|e| e.to_string())?;

    let new_id = Uuid::new_v4().to_string();
    let subject = identity.subject.clone();
    let email = identity.email.clone();
    let user = run_db(state, move |db| db.upsert_user(&new_id, &subject, &email))
        .await
        .map_err(|e| {
            error!("Failed to upsert user: {:?}", e);
            "Could not record your account".to_string()
        })?;

    let user_id: Uuid = user.id.parse().map_err(|e| {
        error!("Corrupt user id '{}': {}", user.id, e);
        "Could not record your account".to_string()
    })?;

    let token = create_token(&state.jwt_secret, state.session_ttl, user_id, &user.email)
        .map_err(|e| {
            error!("Failed to sign session token: {}", e);
            "Could not start a session".to_string()
        })?;

    Ok((token, user.email))
}

fn sign_in_error_target(message: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    format!("{}?{}", Route::SignIn.path(), query)
}

/// POST /auth/sign-out
pub async fn sign_out(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/")),
        Redirect::to(&Route::SignIn.path()),
    )
}

/// GET /auth/session: the caller's identity plus a bearer token for API
/// clients that started from a browser session.
pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionResponse>, ApiError> {
    let token = create_token(&state.jwt_secret, state.session_ttl, claims.sub, &claims.email)?;
    Ok(Json(SessionResponse {
        user_id: claims.sub,
        email: claims.email,
        token,
    }))
}

pub fn create_token(
    secret: &str,
    ttl: chrono::Duration,
    user_id: Uuid,
    email: &str,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and expiry.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

fn random_state() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(bytes)
}
