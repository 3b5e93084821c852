use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub use adly_types::api::NOT_FOUND_MESSAGE;
use adly_types::api::ErrorBody;
use adly_types::validate::FieldErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Body that could not be read as JSON of the expected shape.
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Malformed { status, .. } => *status,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let fields = match &self {
            Self::Validation(fields) => Some(fields.clone()),
            Self::Internal(e) => {
                error!("Request failed: {:#}", e);
                None
            }
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
                fields,
            }),
        )
            .into_response()
    }
}
