use std::sync::Mutex;

use chrono::{Duration, Utc};
use uuid::Uuid;

use adly_types::models::{Ad, AdFields, AdStatus};

use crate::error::ClientError;
use crate::session::SessionUser;
use crate::store::AdStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(Uuid),
    Get(Uuid, String),
    Create(Uuid, AdFields),
    Update(Uuid, String, AdFields),
    Delete(Uuid, String),
}

#[derive(Default)]
pub struct FakeStore {
    ads: Mutex<Vec<Ad>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<String>>,
}

impl FakeStore {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every following call fails with `message` until cleared.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn seed(&self, owner: Uuid, title: &str, age_minutes: i64) -> Ad {
        let ad = Ad {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: format!("{} description", title),
            destination_url: "https://example.com".into(),
            status: AdStatus::Active,
            user_id: owner,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        };
        self.ads.lock().unwrap().push(ad.clone());
        ad
    }

    pub fn stored(&self, id: &str) -> Option<Ad> {
        self.ads.lock().unwrap().iter().find(|ad| ad.id == id).cloned()
    }

    fn record(&self, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(ClientError::Api {
                status: 500,
                message,
                fields: None,
            }),
            None => Ok(()),
        }
    }
}

pub fn session(email: &str) -> SessionUser {
    SessionUser {
        id: Uuid::new_v4(),
        email: email.into(),
        token: format!("token-for-{}", email),
    }
}

impl AdStore for FakeStore {
    async fn list_ads(&self, session: &SessionUser) -> Result<Vec<Ad>, ClientError> {
        self.record(Call::List(session.id))?;
        let mut ads: Vec<Ad> = self
            .ads
            .lock()
            .unwrap()
            .iter()
            .filter(|ad| ad.user_id == session.id)
            .cloned()
            .collect();
        ads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ads)
    }

    async fn get_ad(&self, session: &SessionUser, id: &str) -> Result<Ad, ClientError> {
        self.record(Call::Get(session.id, id.to_string()))?;
        self.stored(id)
            .filter(|ad| ad.user_id == session.id)
            .ok_or(ClientError::NotFound)
    }

    async fn create_ad(&self, session: &SessionUser, fields: &AdFields) -> Result<Ad, ClientError> {
        self.record(Call::Create(session.id, fields.clone()))?;
        let ad = Ad {
            id: Uuid::new_v4().to_string(),
            title: fields.title.clone(),
            description: fields.description.clone(),
            destination_url: fields.destination_url.clone(),
            status: fields.status,
            user_id: session.id,
            created_at: Utc::now(),
        };
        self.ads.lock().unwrap().push(ad.clone());
        Ok(ad)
    }

    async fn update_ad(&self, session: &SessionUser, id: &str, fields: &AdFields) -> Result<Ad, ClientError> {
        self.record(Call::Update(session.id, id.to_string(), fields.clone()))?;
        let mut ads = self.ads.lock().unwrap();
        let ad = ads
            .iter_mut()
            .find(|ad| ad.id == id && ad.user_id == session.id)
            .ok_or(ClientError::NotFound)?;
        ad.title = fields.title.clone();
        ad.description = fields.description.clone();
        ad.destination_url = fields.destination_url.clone();
        ad.status = fields.status;
        Ok(ad.clone())
    }

    async fn delete_ad(&self, session: &SessionUser, id: &str) -> Result<(), ClientError> {
        self.record(Call::Delete(session.id, id.to_string()))?;
        let mut ads = self.ads.lock().unwrap();
        let before = ads.len();
        ads.retain(|ad| !(ad.id == id && ad.user_id == session.id));
        if ads.len() == before { Err(ClientError::NotFound) } else { Ok(()) }
    }
}
