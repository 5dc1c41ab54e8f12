// lib.rs - Onboarding personal-information form core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod config;
pub mod draft;
pub mod event;
pub mod form;
pub mod location;
pub mod model;
pub mod submission;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::FormConfig;
pub use draft::{DraftField, Profile, ProfileDraft};
pub use event::Event;
pub use form::{FormEvent, FormState, SelectionContext};
pub use location::{LocationIndex, LocationReference};
pub use model::Model;
pub use submission::{ProfilePayload, SubmissionStatus};

pub const COUNTRY_PLACEHOLDER: &str = "Select your country";
pub const SUBDIVISION_PLACEHOLDER: &str = "Select your state";
pub const EDUCATION_PLACEHOLDER: &str = "Select your education";
pub const CITY_PLACEHOLDER: &str = "Select your city";
pub const CITY_AWAITING_SUBDIVISION: &str = "Please select a state first";
pub const SUBMIT_LABEL: &str = "Next: Career Assessment →";
pub const SUBMITTING_LABEL: &str = "Saving...";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            label: label.into(),
            disabled: true,
        }
    }
}

/// How the shell renders the state and city inputs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationInput {
    FreeText {
        value: String,
    },
    Dropdown {
        options: Vec<SelectOption>,
        selected: String,
        placeholder: String,
        disabled: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub wizard_step: u8,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub gender_options: Vec<SelectOption>,
    pub education_level: String,
    pub education_options: Vec<SelectOption>,
    pub country: String,
    pub country_options: Vec<SelectOption>,
    pub subdivision: LocationInput,
    pub city: LocationInput,
    pub missing_fields: Vec<DraftField>,
    pub error: Option<String>,
    pub is_submitting: bool,
    pub submit_enabled: bool,
    pub submit_label: String,
}

pub mod app {
    use super::*;
    use crate::capabilities::ProfileOutput;
    use crate::draft::{EDUCATION_OPTIONS, GENDER_OPTIONS};
    use crate::form::reduce;
    use crate::submission::{Settled, SubmissionError};
    use tracing::{debug, info, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn apply_form(model: &mut Model, event: FormEvent) {
            let state = std::mem::take(&mut model.form);
            model.form = reduce(state, event, LocationIndex::bundled());
        }

        fn country_options() -> Vec<SelectOption> {
            std::iter::once(SelectOption::placeholder(COUNTRY_PLACEHOLDER))
                .chain(
                    LocationIndex::bundled()
                        .countries()
                        .iter()
                        .map(|c| SelectOption::new(c.name.clone(), c.name.clone())),
                )
                .collect()
        }

        fn subdivision_input(model: &Model) -> LocationInput {
            let selection = &model.form.selection;
            if !selection.is_cascading() {
                return LocationInput::FreeText {
                    value: model.form.draft.subdivision.clone(),
                };
            }

            LocationInput::Dropdown {
                options: selection
                    .available_subdivisions
                    .iter()
                    .map(|s| SelectOption::new(s.code.clone(), s.name.clone()))
                    .collect(),
                selected: selection
                    .selected_subdivision_code
                    .clone()
                    .unwrap_or_default(),
                placeholder: SUBDIVISION_PLACEHOLDER.to_string(),
                disabled: false,
            }
        }

        fn city_input(model: &Model) -> LocationInput {
            let selection = &model.form.selection;
            if !selection.is_cascading() {
                return LocationInput::FreeText {
                    value: model.form.draft.city.clone(),
                };
            }

            let placeholder = if selection.selected_subdivision_code.is_some() {
                CITY_PLACEHOLDER
            } else {
                CITY_AWAITING_SUBDIVISION
            };

            LocationInput::Dropdown {
                options: selection
                    .available_cities
                    .iter()
                    .map(|c| SelectOption::new(c.name.clone(), c.name.clone()))
                    .collect(),
                selected: model.form.draft.city.clone(),
                placeholder: placeholder.to_string(),
                disabled: selection.available_cities.is_empty(),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            if event.is_user_initiated() {
                debug!(event = event_name, "user action");
            } else {
                debug!(event = event_name, "event");
            }

            match event {
                Event::Noop => {}

                Event::SessionStarted { config } => {
                    if let Some(config) = config {
                        match config.validate() {
                            Ok(()) => model.config = config,
                            Err(e) => warn!(error = %e, "invalid form config; keeping defaults"),
                        }
                    }

                    if model.profile_requested {
                        debug!("profile already requested for this session");
                    } else {
                        model.profile_requested = true;
                        caps.profile.fetch_current(Event::ProfileFetched);
                    }

                    caps.render.render();
                }

                Event::ProfileFetched(result) => match result {
                    Ok(ProfileOutput::Current(Some(profile))) => {
                        Self::apply_form(model, FormEvent::ProfileLoaded { profile });
                        caps.render.render();
                    }
                    Ok(ProfileOutput::Current(None)) => {
                        debug!("no existing profile; form keeps its defaults");
                    }
                    Ok(ProfileOutput::Updated) => {
                        warn!("profile fetch answered with an update acknowledgement");
                    }
                    Err(e) => {
                        warn!(error = %e, "profile fetch failed; form keeps its defaults");
                    }
                },

                Event::Form(form_event) => {
                    Self::apply_form(model, form_event);
                    caps.render.render();
                }

                Event::SubmitRequested => {
                    match model
                        .submission
                        .try_begin(&model.form, model.config.enforce_required_fields)
                    {
                        Ok(payload) => {
                            info!("submitting profile update");
                            caps.profile.update(payload, Event::ProfileSaved);
                            caps.render.render();
                        }
                        Err(SubmissionError::MissingFields(fields)) => {
                            debug!(?fields, "submit blocked by empty required fields");
                        }
                        Err(e) => {
                            debug!(error = %e, "submit ignored");
                        }
                    }
                }

                Event::ProfileSaved(result) => {
                    match model
                        .submission
                        .settle(result, &model.config.fallback_error_message)
                    {
                        Ok(Settled::Advance) => {
                            info!(route = %model.config.next_step_route, "profile saved; advancing wizard");
                            caps.navigator.go_to(model.config.next_step_route.clone());
                        }
                        Ok(Settled::Duplicate) => {
                            debug!("duplicate save completion ignored");
                        }
                        Err(SubmissionError::Rejected { message }) => {
                            warn!(%message, "profile save failed");
                        }
                        Err(e) => {
                            warn!(error = %e, "unexpected save completion");
                        }
                    }
                    caps.render.render();
                }

                Event::DismissError => {
                    model.submission.dismiss_error();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let draft = &model.form.draft;
            let is_submitting = model.is_submitting();

            ViewModel {
                wizard_step: model.config.wizard_step,
                first_name: draft.first_name.clone(),
                last_name: draft.last_name.clone(),
                age: draft.age.clone(),
                gender: draft.gender.clone(),
                gender_options: GENDER_OPTIONS
                    .iter()
                    .map(|g| SelectOption::new(*g, *g))
                    .collect(),
                education_level: draft.education_level.clone(),
                education_options: std::iter::once(SelectOption::placeholder(
                    EDUCATION_PLACEHOLDER,
                ))
                .chain(EDUCATION_OPTIONS.iter().map(|e| SelectOption::new(*e, *e)))
                .collect(),
                country: draft.country.clone(),
                country_options: Self::country_options(),
                subdivision: Self::subdivision_input(model),
                city: Self::city_input(model),
                missing_fields: model.form.missing_required(),
                error: model.error_message().map(str::to_string),
                is_submitting,
                submit_enabled: model.submission.can_submit(),
                submit_label: if is_submitting {
                    SUBMITTING_LABEL
                } else {
                    SUBMIT_LABEL
                }
                .to_string(),
            }
        }
    }
}
