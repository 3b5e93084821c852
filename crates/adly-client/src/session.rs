use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use adly_types::api::SessionResponse;

use crate::error::ClientError;
use crate::store::HttpAdStore;

/// Identity resolved from the sign-in flow plus the bearer token the API
/// expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl From<SessionResponse> for SessionUser {
    fn from(resp: SessionResponse) -> Self {
        Self {
            id: resp.user_id,
            email: resp.email,
            token: resp.token,
        }
    }
}

/// Created once at app start. Components hold a `SessionSubscription`;
/// `teardown` signs out and closes the channel for all of them.
pub struct AuthContext {
    server: Url,
    session_tx: watch::Sender<Option<SessionUser>>,
}

impl AuthContext {
    pub fn init(server: Url) -> Self {
        let (session_tx, _) = watch::channel(None);
        debug!("Auth context initialised for {}", server);
        Self { server, session_tx }
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.session_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.session_tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.session_tx.receiver_count()
    }

    /// Where to send the browser to start the Google sign-in redirect.
    pub fn sign_in_with_google(&self) -> Result<Url, ClientError> {
        Ok(self.server.join("/auth/google")?)
    }

    pub fn establish(&self, user: SessionUser) {
        info!("Signed in as {} ({})", user.email, user.id);
        self.session_tx.send_replace(Some(user));
    }

    /// Trade the session cookie left by the sign-in redirect for a bearer
    /// session and publish it.
    pub async fn resume(&self, store: &HttpAdStore, session_cookie: &str) -> Result<SessionUser, ClientError> {
        let user = store.fetch_session(session_cookie).await?;
        self.establish(user.clone());
        Ok(user)
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.session_tx.send_replace(None) {
            info!("Signed out {}", user.email);
        }
    }

    /// Sign out and close the channel. Waiting subscribers wake up and see
    /// the context is gone.
    pub fn teardown(self) {
        self.sign_out();
        debug!("Auth context torn down ({} subscribers left)", self.subscriber_count());
    }
}

/// A component's view of the session. Unsubscribes on drop.
#[derive(Debug, Clone)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<SessionUser>>,
}

impl SessionSubscription {
    pub fn current(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next sign-in or sign-out. False once the context has
    /// been torn down.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Resolve as soon as someone is signed in; `None` if the context is
    /// torn down first.
    pub async fn signed_in(&mut self) -> Option<SessionUser> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(user) => user.clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            token: "token".into(),
        }
    }

    fn context() -> AuthContext {
        AuthContext::init(Url::parse("http://localhost:3000").unwrap())
    }

    #[test]
    fn sign_in_url_points_at_google_start() {
        let auth = context();
        assert_eq!(auth.sign_in_with_google().unwrap().as_str(), "http://localhost:3000/auth/google");
    }

    #[tokio::test]
    async fn subscribers_see_sign_in_and_sign_out() {
        let auth = context();
        let mut sub = auth.subscribe();
        assert_eq!(sub.current(), None);

        let user = alice();
        auth.establish(user.clone());
        assert!(sub.changed().await);
        assert_eq!(sub.current(), Some(user));

        auth.sign_out();
        assert!(sub.changed().await);
        assert_eq!(sub.current(), None);
    }

    #[tokio::test]
    async fn dropping_a_subscription_unsubscribes() {
        let auth = context();
        let a = auth.subscribe();
        let b = auth.subscribe();
        assert_eq!(auth.subscriber_count(), 2);
        drop(a);
        assert_eq!(auth.subscriber_count(), 1);
        drop(b);
        assert_eq!(auth.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn teardown_wakes_waiting_subscribers() {
        let auth = context();
        let mut sub = auth.subscribe();
        let waiter = tokio::spawn(async move { sub.signed_in().await });
        auth.teardown();
        assert_eq!(waiter.await.unwrap(), None);
    }

    #[tokio::test]
    async fn signed_in_resolves_on_establish() {
        let auth = context();
        let mut sub = auth.subscribe();
        let user = alice();
        let waiter = tokio::spawn(async move { sub.signed_in().await });
        auth.establish(user.clone());
        assert_eq!(waiter.await.unwrap(), Some(user));
    }
}
