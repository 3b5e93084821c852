use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub const DEV_CODE: &str = "dev";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider rejected the sign-in: {0}")]
    Rejected(String),
}

/// Identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Stable per-provider id, prefixed with the provider name.
    pub subject: String,
    pub email: String,
}

/// `Dev` signs in one fixed identity without any network call, for local
/// runs and tests.
pub enum IdentityProvider {
    Google(GoogleOAuth),
    Dev(DevSignIn),
}

impl IdentityProvider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google(_) => "google",
            Self::Dev(_) => "dev",
        }
    }

    /// Where to send the browser to start signing in.
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        match self {
            Self::Google(google) => google.authorize_url(state),
            Self::Dev(dev) => dev.authorize_url(state),
        }
    }

    /// Trade the callback `code` for the user's identity.
    pub async fn exchange(&self, code: &str) -> Result<ProviderUser, OAuthError> {
        match self {
            Self::Google(google) => google.exchange(code).await,
            Self::Dev(dev) => dev.exchange(code),
        }
    }
}

pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
}

impl GoogleOAuth {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Result<Self, OAuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            http,
        })
    }

    fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )?;
        Ok(url)
    }

    async fn exchange(&self, code: &str) -> Result<ProviderUser, OAuthError> {
        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: UserInfo = self
            .http
            .get(GOOGLE_USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if info.email_verified == Some(false) {
            return Err(OAuthError::Rejected("email address is not verified".into()));
        }

        Ok(ProviderUser {
            subject: format!("google|{}", info.sub),
            email: info.email.unwrap_or_default(),
        })
    }
}

/// Signs in `email` without talking to anyone.
pub struct DevSignIn {
    email: String,
    redirect_uri: String,
}

impl DevSignIn {
    pub fn new(email: String, redirect_uri: String) -> Self {
        Self { email, redirect_uri }
    }

    fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        let url = Url::parse_with_params(&self.redirect_uri, &[("code", DEV_CODE), ("state", state)])?;
        Ok(url)
    }

    fn exchange(&self, code: &str) -> Result<ProviderUser, OAuthError> {
        if code != DEV_CODE {
            return Err(OAuthError::Rejected("unknown sign-in code".into()));
        }
        Ok(ProviderUser {
            subject: format!("dev|{}", self.email),
            email: self.email.clone(),
        })
    }
}
