use tracing::{info, warn};

use adly_types::api::NOT_FOUND_MESSAGE;

use crate::error::ClientError;
use crate::form::{AdForm, SubmitOutcome};
use crate::session::SessionSubscription;
use crate::store::AdStore;

pub const LOAD_FAILED: &str = "Failed to load ad";

pub struct CreatePage<S> {
    store: S,
    session: SessionSubscription,
    form: AdForm,
}

impl<S: AdStore> CreatePage<S> {
    pub fn new(store: S, session: SessionSubscription) -> Self {
        Self {
            store,
            session,
            form: AdForm::new(),
        }
    }

    pub fn form(&self) -> &AdForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AdForm {
        &mut self.form
    }

    /// Insert the ad with the session user as owner.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let user = self.session.current();
        let store = &self.store;
        self.form
            .submit(|fields| async move {
                let user = user.ok_or(ClientError::Unauthenticated)?;
                let ad = store.create_ad(&user, &fields).await?;
                info!("Created ad {} for {}", ad.id, user.id);
                Ok(())
            })
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditView {
    Loading,
    Ready,
    /// Absent or owned by someone else.
    NotFound(String),
    Error(String),
}

pub struct EditPage<S> {
    store: S,
    session: SessionSubscription,
    id: String,
    view: EditView,
    form: Option<AdForm>,
}

impl<S: AdStore> EditPage<S> {
    pub fn new(store: S, session: SessionSubscription, id: impl Into<String>) -> Self {
        Self {
            store,
            session,
            id: id.into(),
            view: EditView::Loading,
            form: None,
        }
    }

    pub fn view(&self) -> &EditView {
        &self.view
    }

    pub fn form(&self) -> Option<&AdForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut AdForm> {
        self.form.as_mut()
    }

    /// Fetch the ad and pre-fill the form. Stays `Loading` without a session.
    pub async fn load(&mut self) -> &EditView {
        let Some(user) = self.session.current() else {
            return &self.view;
        };

        self.view = match self.store.get_ad(&user, &self.id).await {
            Ok(ad) => {
                self.form = Some(AdForm::for_ad(&ad));
                EditView::Ready
            }
            Err(ClientError::NotFound) => EditView::NotFound(NOT_FOUND_MESSAGE.into()),
            Err(e) => {
                warn!("Failed to load ad {}: {}", self.id, e);
                EditView::Error(LOAD_FAILED.into())
            }
        };
        &self.view
    }

    /// Full-field update of this ad, scoped to the session user.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(form) = self.form.as_mut() else {
            return SubmitOutcome::Ignored;
        };
        let user = self.session.current();
        let store = &self.store;
        let id = self.id.as_str();
        form.submit(|fields| async move {
            let user = user.ok_or(ClientError::Unauthenticated)?;
            store.update_ad(&user, id, &fields).await?;
            info!("Updated ad {} for {}", id, user.id);
            Ok(())
        })
        .await
    }
}
