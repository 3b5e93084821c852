use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use adly_types::api::{ErrorBody, SESSION_COOKIE, SessionResponse};
use adly_types::models::{Ad, AdFields};

use crate::error::ClientError;
use crate::session::SessionUser;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub trait AdStore {
    /// All of the user's ads, newest first.
    fn list_ads(&self, session: &SessionUser) -> impl Future<Output = Result<Vec<Ad>, ClientError>> + Send;

    fn get_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<Ad, ClientError>> + Send;

    fn create_ad(
        &self,
        session: &SessionUser,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send;

    fn update_ad(
        &self,
        session: &SessionUser,
        id: &str,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send;

    fn delete_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl<S: AdStore> AdStore for &S {
    fn list_ads(&self, session: &SessionUser) -> impl Future<Output = Result<Vec<Ad>, ClientError>> + Send {
        (**self).list_ads(session)
    }

    fn get_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).get_ad(session, id)
    }

    fn create_ad(
        &self,
        session: &SessionUser,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).create_ad(session, fields)
    }

    fn update_ad(
        &self,
        session: &SessionUser,
        id: &str,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).update_ad(session, id, fields)
    }

    fn delete_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).delete_ad(session, id)
    }
}

impl<S: AdStore> AdStore for Arc<S> {
    fn list_ads(&self, session: &SessionUser) -> impl Future<Output = Result<Vec<Ad>, ClientError>> + Send {
        (**self).list_ads(session)
    }

    fn get_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).get_ad(session, id)
    }

    fn create_ad(
        &self,
        session: &SessionUser,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).create_ad(session, fields)
    }

    fn update_ad(
        &self,
        session: &SessionUser,
        id: &str,
        fields: &AdFields,
    ) -> impl Future<Output = Result<Ad, ClientError>> + Send {
        (**self).update_ad(session, id, fields)
    }

    fn delete_ad(&self, session: &SessionUser, id: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        (**self).delete_ad(session, id)
    }
}

/// `AdStore` over the server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpAdStore {
    base: Url,
    http: Client,
}

impl HttpAdStore {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { base, http })
    }

    /// GET /auth/session with the cookie set by the sign-in redirect.
    pub async fn fetch_session(&self, session_cookie: &str) -> Result<SessionUser, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("/auth/session")?)
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, session_cookie))
            .send()
            .await?;
        let session: SessionResponse = check(resp).await?.json().await?;
        Ok(session.into())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn ad_endpoint(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("/api/ads")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(id);
        Ok(url)
    }
}

impl AdStore for HttpAdStore {
    async fn list_ads(&self, session: &SessionUser) -> Result<Vec<Ad>, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("/api/ads")?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        let ads: Vec<Ad> = check(resp).await?.json().await?;
        debug!("Fetched {} ads for {}", ads.len(), session.id);
        Ok(ads)
    }

    async fn get_ad(&self, session: &SessionUser, id: &str) -> Result<Ad, ClientError> {
        let resp = self
            .http
            .get(self.ad_endpoint(id)?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn create_ad(&self, session: &SessionUser, fields: &AdFields) -> Result<Ad, ClientError> {
        let resp = self
            .http
            .post(self.endpoint("/api/ads")?)
            .bearer_auth(&session.token)
            .json(fields)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn update_ad(&self, session: &SessionUser, id: &str, fields: &AdFields) -> Result<Ad, ClientError> {
        let resp = self
            .http
            .put(self.ad_endpoint(id)?)
            .bearer_auth(&session.token)
            .json(fields)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn delete_ad(&self, session: &SessionUser, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.ad_endpoint(id)?)
            .bearer_auth(&session.token)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

/// Map a non-2xx answer onto `ClientError`.
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthenticated),
        _ => {
            let (message, fields) = match resp.json::<ErrorBody>().await {
                Ok(body) => (body.error, body.fields),
                Err(_) => (status.to_string(), None),
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
                fields,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpAdStore {
        HttpAdStore::new(Url::parse("http://localhost:3000/").unwrap()).unwrap()
    }

    #[test]
    fn ad_ids_are_path_escaped() {
        let url = store().ad_endpoint("a b/c").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/ads/a%20b%2Fc");
    }

    #[test]
    fn endpoints_are_rooted_at_the_server() {
        assert_eq!(store().endpoint("/api/ads").unwrap().as_str(), "http://localhost:3000/api/ads");
    }
}
