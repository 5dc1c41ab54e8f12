use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{ProfileError, ProfileOutput, ProfileResult};
use crate::draft::{DraftField, ProfileDraft};
use crate::form::FormState;

/// Body of the profile update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub name: String,
    /// Serialized as `null` when absent.
    pub age: Option<u32>,
    pub gender: String,
    pub education_level: String,
    pub country: String,
    pub state: String,
    pub city: String,
}

#[must_use]
pub fn build_payload(draft: &ProfileDraft) -> ProfilePayload {
    ProfilePayload {
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        name: format!("{} {}", draft.first_name, draft.last_name)
            .trim()
            .to_string(),
        age: parse_age(&draft.age),
        gender: draft.gender.clone(),
        education_level: draft.education_level.clone(),
        country: draft.country.clone(),
        state: draft.subdivision.clone(),
        city: draft.city.clone(),
    }
}

/// Empty, non-numeric and zero ages are absent rather than errors.
#[must_use]
pub fn parse_age(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|age| *age > 0)
}

/// Numeric age text that has no whole-number form, such as `"29.5"` or `"-3"`.
///
/// [`parse_age`] would drop it, so the gate holds the submission instead.
#[must_use]
pub fn is_unsendable_age(raw: &str) -> bool {
    let raw = raw.trim();
    parse_age(raw).is_none()
        && raw
            .parse::<f64>()
            .is_ok_and(|age| age.is_finite() && age.abs() > 0.0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Failed {
        message: String,
    },
    Succeeded,
}

impl SubmissionStatus {
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("a submission is already in flight")]
    InFlight,

    #[error("profile already submitted")]
    AlreadySubmitted,

    #[error("required fields missing: {0:?}")]
    MissingFields(Vec<DraftField>),

    #[error("submission rejected: {message}")]
    Rejected { message: String },

    #[error("settled without a submission in flight")]
    NotInFlight,
}

/// What the caller should do after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// First success: advance the wizard.
    Advance,
    /// A repeated success; navigation already happened.
    Duplicate,
}

/// Guards the single in-flight profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionGate {
    status: SubmissionStatus,
    navigated: bool,
}

impl SubmissionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !matches!(
            self.status,
            SubmissionStatus::InFlight | SubmissionStatus::Succeeded
        )
    }

    /// Moves to `InFlight` and returns the request body, or explains why
    /// no request may be issued. A rejected call leaves the gate untouched.
    pub fn try_begin(
        &mut self,
        form: &FormState,
        enforce_required: bool,
    ) -> Result<ProfilePayload, SubmissionError> {
        match self.status {
            SubmissionStatus::InFlight => return Err(SubmissionError::InFlight),
            SubmissionStatus::Succeeded => return Err(SubmissionError::AlreadySubmitted),
            SubmissionStatus::Idle | SubmissionStatus::Failed { .. } => {}
        }

        if enforce_required {
            let missing = form.missing_required();
            if !missing.is_empty() {
                return Err(SubmissionError::MissingFields(missing));
            }
        }

        self.status = SubmissionStatus::InFlight;
        Ok(build_payload(&form.draft))
    }

    /// Records the outcome of the update call.
    pub fn settle(
        &mut self,
        outcome: ProfileResult,
        fallback_message: &str,
    ) -> Result<Settled, SubmissionError> {
        if self.navigated {
            return Ok(Settled::Duplicate);
        }
        if !self.status.is_in_flight() {
            return Err(SubmissionError::NotInFlight);
        }

        match outcome {
            Ok(ProfileOutput::Updated) => {
                self.status = SubmissionStatus::Succeeded;
                self.navigated = true;
                Ok(Settled::Advance)
            }
            Ok(ProfileOutput::Current(_)) => {
                Err(self.fail(&ProfileError::UnexpectedReply, fallback_message))
            }
            Err(error) => Err(self.fail(&error, fallback_message)),
        }
    }

    fn fail(&mut self, error: &ProfileError, fallback_message: &str) -> SubmissionError {
        let message = error.user_message(fallback_message);
        self.status = SubmissionStatus::Failed {
            message: message.clone(),
        };
        SubmissionError::Rejected { message }
    }

    /// Clears a shown failure so the form returns to its resting state.
    pub fn dismiss_error(&mut self) {
        if matches!(self.status, SubmissionStatus::Failed { .. }) {
            self.status = SubmissionStatus::Idle;
        }
    }
}
