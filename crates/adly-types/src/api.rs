use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validate::FieldErrors;

// -- JWT Claims --

/// Session claims. Shared by the server (issues and checks them) and the
/// client (reads `sub` to know who it is acting as).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

/// HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "adly_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// -- Errors --

/// Not-found and not-owned are deliberately the same message.
pub const NOT_FOUND_MESSAGE: &str = "Ad not found or you do not have permission to edit it.";

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}
