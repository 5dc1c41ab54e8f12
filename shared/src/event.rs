use serde::{Deserialize, Serialize};

use crate::capabilities::ProfileResult;
use crate::config::FormConfig;
use crate::draft::DraftField;
use crate::form::FormEvent;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub enum Event {
    #[default]
    Noop,

    /// The form opened. A missing config keeps the defaults.
    SessionStarted {
        config: Option<FormConfig>,
    },
    ProfileFetched(ProfileResult),

    Form(FormEvent),

    SubmitRequested,
    ProfileSaved(ProfileResult),
    DismissError,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::SessionStarted { .. } => "session_started",
            Self::ProfileFetched(_) => "profile_fetched",
            Self::Form(event) => event.name(),
            Self::SubmitRequested => "submit_requested",
            Self::ProfileSaved(_) => "profile_saved",
            Self::DismissError => "dismiss_error",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::Form(
                FormEvent::CountryChanged { .. }
                    | FormEvent::SubdivisionSelected { .. }
                    | FormEvent::SubdivisionTyped { .. }
                    | FormEvent::CityChanged { .. }
                    | FormEvent::FieldChanged { .. }
            ) | Self::SubmitRequested
                | Self::DismissError
        )
    }

    // Shorthands for shells binding inputs.

    #[must_use]
    pub fn field(field: DraftField, value: impl Into<String>) -> Self {
        Self::Form(FormEvent::FieldChanged {
            field,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn country(country: impl Into<String>) -> Self {
        Self::Form(FormEvent::CountryChanged {
            country: country.into(),
        })
    }

    #[must_use]
    pub fn subdivision_selected(code: impl Into<String>) -> Self {
        Self::Form(FormEvent::SubdivisionSelected { code: code.into() })
    }

    #[must_use]
    pub fn subdivision_typed(value: impl Into<String>) -> Self {
        Self::Form(FormEvent::SubdivisionTyped {
            value: value.into(),
        })
    }

    #[must_use]
    pub fn city(city: impl Into<String>) -> Self {
        Self::Form(FormEvent::CityChanged { city: city.into() })
    }
}
