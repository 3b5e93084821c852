use tracing::{info, warn};

use adly_types::models::Ad;

use crate::session::SessionSubscription;
use crate::store::AdStore;

pub const FETCH_FAILED: &str = "Failed to fetch ads";
pub const DELETE_FAILED: &str = "Failed to delete ad";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(String),
    Failed,
    /// `confirm_delete` without a pending `request_delete`.
    NothingPending,
}

/// The session user's ads. A confirmed delete drops the row locally once
/// the backend accepts it, without re-fetching.
pub struct Dashboard<S> {
    store: S,
    session: SessionSubscription,
    ads: Vec<Ad>,
    loading: bool,
    error: Option<String>,
    pending_delete: Option<String>,
}

impl<S: AdStore> Dashboard<S> {
    pub fn new(store: S, session: SessionSubscription) -> Self {
        Self {
            store,
            session,
            ads: Vec::new(),
            loading: true,
            error: None,
            pending_delete: None,
        }
    }

    pub fn ads(&self) -> &[Ad] {
        &self.ads
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Banner text, if the last fetch or delete failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Fetch the list. Does nothing without a session and returns false.
    pub async fn mount(&mut self) -> bool {
        let Some(user) = self.session.current() else {
            return false;
        };

        self.loading = true;
        match self.store.list_ads(&user).await {
            Ok(ads) => {
                self.ads = ads;
                self.error = None;
            }
            Err(e) => {
                warn!("Failed to fetch ads for {}: {}", user.id, e);
                self.error = Some(FETCH_FAILED.into());
            }
        }
        self.loading = false;
        true
    }

    /// Wait for a session, then fetch. False if the auth context goes away
    /// first.
    pub async fn mount_when_signed_in(&mut self) -> bool {
        if self.session.signed_in().await.is_none() {
            return false;
        }
        self.mount().await
    }

    /// Ask to delete a listed ad. Returns false for ids not on the list.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if !self.ads.iter().any(|ad| ad.id == id) {
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> DeleteOutcome {
        let Some(id) = self.pending_delete.take() else {
            return DeleteOutcome::NothingPending;
        };
        let Some(user) = self.session.current() else {
            warn!("Delete of {} confirmed without a session", id);
            self.error = Some(DELETE_FAILED.into());
            return DeleteOutcome::Failed;
        };

        match self.store.delete_ad(&user, &id).await {
            Ok(()) => {
                self.ads.retain(|ad| ad.id != id);
                info!("Deleted ad {}", id);
                DeleteOutcome::Removed(id)
            }
            Err(e) => {
                warn!("Failed to delete ad {}: {}", id, e);
                self.error = Some(DELETE_FAILED.into());
                DeleteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::session::AuthContext;
    use crate::testing::{Call, FakeStore, session};

    use super::*;

    fn auth() -> AuthContext {
        AuthContext::init(Url::parse("http://localhost:3000").unwrap())
    }

    #[tokio::test]
    async fn no_fetch_without_session() {
        let store = FakeStore::default();
        let auth = auth();
        let mut dashboard = Dashboard::new(&store, auth.subscribe());

        assert!(!dashboard.mount().await);
        assert!(dashboard.is_loading());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn lists_only_own_ads_newest_first() {
        let store = FakeStore::default();
        let alice = session("alice@example.com");
        let old = store.seed(alice.id, "Old", 30);
        let new = store.seed(alice.id, "New", 1);
        store.seed(session("bob@example.com").id, "Bob's", 5);

        let auth = auth();
        auth.establish(alice.clone());
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        assert!(dashboard.mount().await);

        let ids: Vec<_> = dashboard.ads().iter().map(|ad| ad.id.clone()).collect();
        assert_eq!(ids, vec![new.id, old.id]);
        assert!(!dashboard.is_loading());
        assert_eq!(store.calls(), vec![Call::List(alice.id)]);
    }

    #[tokio::test]
    async fn mounts_once_session_arrives() {
        let store = FakeStore::default();
        let alice = session("alice@example.com");
        store.seed(alice.id, "Mine", 1);

        let auth = auth();
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        auth.establish(alice);
        assert!(dashboard.mount_when_signed_in().await);
        assert_eq!(dashboard.ads().len(), 1);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let store = FakeStore::default();
        let alice = session("alice@example.com");
        let ad = store.seed(alice.id, "Doomed", 1);

        let auth = auth();
        auth.establish(alice.clone());
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        dashboard.mount().await;

        assert!(dashboard.request_delete(&ad.id));
        dashboard.cancel_delete();
        assert_eq!(dashboard.confirm_delete().await, DeleteOutcome::NothingPending);
        assert_eq!(dashboard.ads().len(), 1);

        assert!(dashboard.request_delete(&ad.id));
        assert_eq!(dashboard.ads().len(), 1);
        assert_eq!(dashboard.confirm_delete().await, DeleteOutcome::Removed(ad.id.clone()));
        assert!(dashboard.ads().is_empty());
        // Removed locally, no second list call.
        assert_eq!(store.calls(), vec![Call::List(alice.id), Call::Delete(alice.id, ad.id)]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_row() {
        let store = FakeStore::default();
        let alice = session("alice@example.com");
        let ad = store.seed(alice.id, "Sticky", 1);

        let auth = auth();
        auth.establish(alice);
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        dashboard.mount().await;

        store.fail_with(Some("connection reset"));
        dashboard.request_delete(&ad.id);
        assert_eq!(dashboard.confirm_delete().await, DeleteOutcome::Failed);
        assert_eq!(dashboard.error(), Some(DELETE_FAILED));
        assert_eq!(dashboard.ads().len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_displayed_rows() {
        let store = FakeStore::default();
        let alice = session("alice@example.com");
        store.seed(alice.id, "Shown", 1);

        let auth = auth();
        auth.establish(alice);
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        dashboard.mount().await;

        store.fail_with(Some("timeout"));
        dashboard.mount().await;
        assert_eq!(dashboard.error(), Some(FETCH_FAILED));
        assert_eq!(dashboard.ads().len(), 1);
        assert!(!dashboard.is_loading());
    }

    #[test]
    fn unknown_ids_cannot_be_queued() {
        let store = FakeStore::default();
        let auth = auth();
        let mut dashboard = Dashboard::new(&store, auth.subscribe());
        assert!(!dashboard.request_delete("missing"));
        assert_eq!(dashboard.pending_delete(), None);
    }
}
