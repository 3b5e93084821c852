use thiserror::Error;

use adly_types::api::NOT_FOUND_MESSAGE;
use adly_types::validate::FieldErrors;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    /// Absent and not-owned are indistinguishable.
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        fields: Option<FieldErrors>,
    },
}
