//! State of one create or edit form.
//!
//! ```text
//! Idle -> Validating -> Invalid -> Idle                  (field errors shown)
//!                    -> Submitting -> Success            (navigate to dashboard)
//!                    -> Submitting -> Failed -> Idle     (submit error shown)
//! ```

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, warn};

use adly_types::models::{Ad, AdFields, AdStatus};
use adly_types::routes::Route;
use adly_types::validate::{AdInput, Field, FieldErrors};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the caller should move on to this page.
    Navigate(Route),
    Invalid,
    Failed(String),
    /// Already submitting or already saved.
    Ignored,
}

pub struct AdForm {
    input: AdInput,
    errors: FieldErrors,
    submit_error: Option<String>,
    phase: watch::Sender<FormPhase>,
}

impl Default for AdForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AdForm {
    /// Blank form for a new ad.
    pub fn new() -> Self {
        Self::with_input(AdInput {
            status: Some(AdStatus::default().as_str().to_string()),
            ..Default::default()
        })
    }

    /// Form pre-filled from an existing ad.
    pub fn for_ad(ad: &Ad) -> Self {
        Self::with_input(AdInput::from_fields(&ad.fields()))
    }

    fn with_input(input: AdInput) -> Self {
        let (phase, _) = watch::channel(FormPhase::Idle);
        Self {
            input,
            errors: FieldErrors::new(),
            submit_error: None,
            phase,
        }
    }

    pub fn phase(&self) -> FormPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<FormPhase> {
        self.phase.subscribe()
    }

    /// Inputs are disabled while a save is in flight.
    pub fn is_disabled(&self) -> bool {
        self.phase() == FormPhase::Submitting
    }

    pub fn input(&self) -> &AdInput {
        &self.input
    }

    pub fn value(&self, field: Field) -> &str {
        self.input.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Returns false when the input is disabled and the change was dropped.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_disabled() {
            return false;
        }
        self.input.set(field, value);
        self.errors.clear(field);
        true
    }

    /// Validate, then hand the fields to `persist` exactly once if they are
    /// valid. Values survive every outcome.
    pub async fn submit<F, Fut>(&mut self, persist: F) -> SubmitOutcome
    where
        F: FnOnce(AdFields) -> Fut,
        Fut: Future<Output = Result<(), ClientError>>,
    {
        if matches!(self.phase(), FormPhase::Submitting | FormPhase::Success) {
            return SubmitOutcome::Ignored;
        }

        self.set_phase(FormPhase::Validating);
        self.submit_error = None;
        let fields = match self.input.check() {
            Ok(fields) => fields,
            Err(errors) => {
                debug!("Ad form has {} invalid fields", errors.len());
                self.errors = errors;
                self.set_phase(FormPhase::Invalid);
                self.set_phase(FormPhase::Idle);
                return SubmitOutcome::Invalid;
            }
        };
        self.errors = FieldErrors::new();

        self.set_phase(FormPhase::Submitting);
        match persist(fields).await {
            Ok(()) => {
                self.set_phase(FormPhase::Success);
                SubmitOutcome::Navigate(Route::Dashboard)
            }
            Err(e) => {
                let message = format!("Failed to save ad: {}", e);
                warn!("{}", message);
                if let ClientError::Api { fields: Some(fields), .. } = e {
                    self.errors = fields;
                }
                self.submit_error = Some(message.clone());
                self.set_phase(FormPhase::Failed);
                self.set_phase(FormPhase::Idle);
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn set_phase(&self, phase: FormPhase) {
        self.phase.send_replace(phase);
    }
}
