use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Publication state of an ad. New ads are `Active` unless the owner
/// picks otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Active,
    Inactive,
}

impl AdStatus {
    pub const ALL: [AdStatus; 2] = [AdStatus::Active, AdStatus::Inactive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ad status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for AdStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// The user-editable part of an ad. Create and update both send the full
/// set; there are no partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdFields {
    pub title: String,
    pub description: String,
    pub destination_url: String,
    #[serde(default)]
    pub status: AdStatus,
}

/// A persisted ad. `user_id` is the owner; `created_at` is assigned by the
/// store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub title: String,
    pub description: String,
    pub destination_url: String,
    pub status: AdStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    pub fn fields(&self) -> AdFields {
        AdFields {
            title: self.title.clone(),
            description: self.description.clone(),
            destination_url: self.destination_url.clone(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_active_when_missing() {
        let fields: AdFields = serde_json::from_str(
            r#"{"title":"Spring sale","description":"Everything half off","destination_url":"https://shop.example"}"#,
        )
        .unwrap();
        assert_eq!(fields.status, AdStatus::Active);
    }

    #[test]
    fn status_parses_lowercase_names_only() {
        assert_eq!("inactive".parse::<AdStatus>(), Ok(AdStatus::Inactive));
        assert!("Active".parse::<AdStatus>().is_err());
        assert_eq!(serde_json::to_string(&AdStatus::Inactive).unwrap(), r#""inactive""#);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = serde_json::from_str::<AdFields>(
            r#"{"title":"t","description":"d","destination_url":"u","user_id":"x"}"#,
        );
        assert!(res.is_err());
    }
}
