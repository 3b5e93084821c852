use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::{AdFields, AdStatus};

pub const TITLE_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";
pub const DESCRIPTION_TOO_SHORT: &str = "Description must be at least 10 characters";
pub const URL_REQUIRED: &str = "Destination URL is required";
pub const URL_INVALID: &str = "Please enter a valid URL (including http:// or https://)";
pub const STATUS_INVALID: &str = "Status must be active or inactive";

/// An input of the ad form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    DestinationUrl,
    Status,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::DestinationUrl => "destination_url",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name → message. Empty means the candidate is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Drops the error for one field, returning whether there was one.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Raw input of the ad form, exactly as typed. A missing input is an empty
/// string (or no status) so it surfaces as a validation message instead of
/// a rejected request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub destination_url: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl AdInput {
    pub fn from_fields(fields: &AdFields) -> Self {
        Self {
            title: fields.title.clone(),
            description: fields.description.clone(),
            destination_url: fields.destination_url.clone(),
            status: Some(fields.status.as_str().to_string()),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::DestinationUrl => &self.destination_url,
            Field::Status => self.status.as_deref().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Title => self.title = value,
            Field::Description => self.description = value,
            Field::DestinationUrl => self.destination_url = value,
            Field::Status => self.status = Some(value),
        }
    }

    /// Typed fields, or every problem found (status included).
    pub fn check(&self) -> Result<AdFields, FieldErrors> {
        let (status, status_error) = match parse_status(self.status.as_deref()) {
            Ok(status) => (status, None),
            Err(message) => (AdStatus::default(), Some(message)),
        };
        let fields = AdFields {
            title: self.title.clone(),
            description: self.description.clone(),
            destination_url: self.destination_url.clone(),
            status,
        };

        let mut errors = validate_ad(&fields);
        if let Some(message) = status_error {
            errors.insert(Field::Status, message);
        }
        if errors.is_empty() { Ok(fields) } else { Err(errors) }
    }
}

/// Validate a candidate ad. The client runs this before every submit and
/// the server again before every write.
pub fn validate_ad(fields: &AdFields) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(msg) = check_text(&fields.title, TITLE_MIN_CHARS, TITLE_REQUIRED, TITLE_TOO_SHORT) {
        errors.insert(Field::Title, msg);
    }
    if let Some(msg) = check_text(
        &fields.description,
        DESCRIPTION_MIN_CHARS,
        DESCRIPTION_REQUIRED,
        DESCRIPTION_TOO_SHORT,
    ) {
        errors.insert(Field::Description, msg);
    }
    if let Some(msg) = check_destination_url(&fields.destination_url) {
        errors.insert(Field::DestinationUrl, msg);
    }

    errors
}

/// Parse the raw status input of a form. Missing or blank means `Active`.
pub fn parse_status(raw: Option<&str>) -> Result<AdStatus, &'static str> {
    match raw.map(str::trim) {
        None | Some("") => Ok(AdStatus::default()),
        Some(s) => s.parse().map_err(|_| STATUS_INVALID),
    }
}

/// True when `input` parses as an absolute URL with both scheme and host.
pub fn is_absolute_url(input: &str) -> bool {
    match Url::parse(input.trim()) {
        Ok(url) => url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

fn check_text(
    value: &str,
    min_chars: usize,
    required: &'static str,
    too_short: &'static str,
) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Some(required)
    } else if trimmed.chars().count() < min_chars {
        Some(too_short)
    } else {
        None
    }
}

fn check_destination_url(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(URL_REQUIRED)
    } else if !is_absolute_url(value) {
        Some(URL_INVALID)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, description: &str, url: &str) -> AdFields {
        AdFields {
            title: title.into(),
            description: description.into(),
            destination_url: url.into(),
            status: AdStatus::Active,
        }
    }

    fn valid() -> AdFields {
        fields("Summer sale", "Forty percent off all sandals", "https://shop.example.com/sale")
    }

    #[test]
    fn valid_ad_has_no_errors() {
        assert!(validate_ad(&valid()).is_empty());
    }

    #[test]
    fn short_title_is_rejected() {
        let errors = validate_ad(&AdFields { title: "AB".into(), ..valid() });
        assert_eq!(errors.get(Field::Title), Some(TITLE_TOO_SHORT));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn title_length_counts_trimmed_chars() {
        for (title, ok) in [("   ab   ", false), ("abc", true), ("  abc  ", true), ("ééé", true), ("é ", false)] {
            let errors = validate_ad(&AdFields { title: title.into(), ..valid() });
            assert_eq!(errors.get(Field::Title).is_none(), ok, "title {title:?}");
        }
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = validate_ad(&fields("  ", "\t", " "));
        assert_eq!(errors.get(Field::Title), Some(TITLE_REQUIRED));
        assert_eq!(errors.get(Field::Description), Some(DESCRIPTION_REQUIRED));
        assert_eq!(errors.get(Field::DestinationUrl), Some(URL_REQUIRED));
    }

    #[test]
    fn description_needs_ten_chars() {
        let errors = validate_ad(&AdFields { description: " too short ".into(), ..valid() });
        assert_eq!(errors.get(Field::Description), Some(DESCRIPTION_TOO_SHORT));

        let errors = validate_ad(&AdFields { description: "exactly10!".into(), ..valid() });
        assert!(errors.get(Field::Description).is_none());
    }

    #[test]
    fn relative_or_garbage_urls_are_rejected() {
        for url in ["not-a-url", "/path/only", "example.com", "http://", "mailto:someone@example.com"] {
            let errors = validate_ad(&AdFields { destination_url: url.into(), ..valid() });
            assert_eq!(errors.get(Field::DestinationUrl), Some(URL_INVALID), "url {url:?}");
        }
    }

    #[test]
    fn absolute_urls_are_accepted() {
        for url in ["https://example.com", "http://localhost:8080/x?y=1", "ftp://files.example.org/a"] {
            assert!(is_absolute_url(url), "url {url:?}");
        }
    }

    #[test]
    fn missing_status_defaults_to_active() {
        assert_eq!(parse_status(None), Ok(AdStatus::Active));
        assert_eq!(parse_status(Some("")), Ok(AdStatus::Active));
        assert_eq!(parse_status(Some("inactive")), Ok(AdStatus::Inactive));
        assert_eq!(parse_status(Some("paused")), Err(STATUS_INVALID));
    }

    #[test]
    fn input_check_reports_bad_status_with_other_errors() {
        let input = AdInput {
            title: "AB".into(),
            description: "Long enough description".into(),
            destination_url: "https://example.com".into(),
            status: Some("paused".into()),
        };
        let errors = input.check().unwrap_err();
        assert_eq!(errors.get(Field::Title), Some(TITLE_TOO_SHORT));
        assert_eq!(errors.get(Field::Status), Some(STATUS_INVALID));
    }

    #[test]
    fn input_check_yields_typed_fields() {
        let mut input = AdInput::from_fields(&valid());
        input.set(Field::Status, "inactive");
        let fields = input.check().unwrap();
        assert_eq!(fields.status, AdStatus::Inactive);
        assert_eq!(input.get(Field::Title), "Summer sale");
    }

    #[test]
    fn field_errors_serialize_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::DestinationUrl, URL_INVALID);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["destination_url"], URL_INVALID);
        assert!(errors.clear(Field::DestinationUrl));
        assert!(!errors.clear(Field::DestinationUrl));
    }
}
