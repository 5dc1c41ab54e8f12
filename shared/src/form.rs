//! Location-aware form state and the reducer that keeps it consistent.
//!
//! All reconciliation runs through [`reduce`]: a trigger is applied first,
//! then the derived subdivision resolution, so no trigger ever observes a
//! stale selection.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::draft::{DraftField, Profile, ProfileDraft};
use crate::location::{City, LocationReference, Subdivision};
use crate::submission::is_unsendable_age;

/// Derived location state. Rebuilt from the draft and the reference data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    /// Set only when the draft's country carries subdivision data.
    pub country_code: Option<String>,
    pub selected_subdivision_code: Option<String>,
    pub available_subdivisions: Vec<Subdivision>,
    pub available_cities: Vec<City>,
}

impl SelectionContext {
    /// Whether subdivision and city are dropdowns rather than free text.
    #[must_use]
    pub fn is_cascading(&self) -> bool {
        self.country_code.is_some()
    }

    fn for_country<L>(country: &str, locations: &L) -> Self
    where
        L: LocationReference + ?Sized,
    {
        let Some(code) = locations.country_code(country) else {
            return Self::default();
        };
        let subdivisions = locations.subdivisions_of(code);
        if subdivisions.is_empty() {
            return Self::default();
        }

        Self {
            country_code: Some(code.to_string()),
            selected_subdivision_code: None,
            available_subdivisions: subdivisions.to_vec(),
            available_cities: Vec::new(),
        }
    }

    fn subdivision_by_name(&self, name: &str) -> Option<&Subdivision> {
        self.available_subdivisions.iter().find(|s| s.name == name)
    }

    fn subdivision_by_code(&self, code: &str) -> Option<&Subdivision> {
        self.available_subdivisions.iter().find(|s| s.code == code)
    }

    fn offers_city(&self, name: &str) -> bool {
        self.available_cities.iter().any(|c| c.name == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub draft: ProfileDraft,
    pub selection: SelectionContext,
    pub(crate) profile_applied: bool,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn profile_applied(&self) -> bool {
        self.profile_applied
    }

    /// Required fields that cannot be submitted as they stand, in form order.
    ///
    /// Besides blank fields this reports an age that is numeric but not a
    /// whole number of years, and for a cascading country a subdivision
    /// that did not resolve to a code or a city outside its city list.
    #[must_use]
    pub fn missing_required(&self) -> Vec<DraftField> {
        let blank = self.draft.missing_required();
        DraftField::REQUIRED
            .iter()
            .copied()
            .filter(|field| blank.contains(field) || self.is_unusable(*field))
            .collect()
    }

    fn is_unusable(&self, field: DraftField) -> bool {
        let selection = &self.selection;
        match field {
            DraftField::Age => is_unsendable_age(&self.draft.age),
            DraftField::Subdivision => {
                selection.is_cascading() && selection.selected_subdivision_code.is_none()
            }
            DraftField::City => selection.is_cascading() && !selection.offers_city(&self.draft.city),
            _ => false,
        }
    }
}

/// Triggers that change the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    ProfileLoaded { profile: Profile },
    CountryChanged { country: String },
    SubdivisionSelected { code: String },
    SubdivisionTyped { value: String },
    CityChanged { city: String },
    FieldChanged { field: DraftField, value: String },
}

impl FormEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProfileLoaded { .. } => "profile_loaded",
            Self::CountryChanged { .. } => "country_changed",
            Self::SubdivisionSelected { .. } => "subdivision_selected",
            Self::SubdivisionTyped { .. } => "subdivision_typed",
            Self::CityChanged { .. } => "city_changed",
            Self::FieldChanged { .. } => "field_changed",
        }
    }
}

/// Applies one event and the derived resolution that follows it.
#[must_use]
pub fn reduce<L>(mut state: FormState, event: FormEvent, locations: &L) -> FormState
where
    L: LocationReference + ?Sized,
{
    match event {
        FormEvent::ProfileLoaded { profile } => {
            if state.profile_applied {
                debug!("profile already applied to this session; ignoring reload");
                return state;
            }
            state.profile_applied = true;
            state.draft.fill_from(&profile);
            state.selection = SelectionContext::for_country(&state.draft.country, locations);
            resolve_subdivision(&mut state, locations);
        }

        FormEvent::CountryChanged { country } => {
            state.draft.country = country;
            state.draft.subdivision.clear();
            state.draft.city.clear();
            state.selection = SelectionContext::for_country(&state.draft.country, locations);
            // Subdivision was just cleared, so resolution is a no-op here.
            resolve_subdivision(&mut state, locations);
        }

        FormEvent::SubdivisionSelected { code } => {
            let Some(country_code) = state.selection.country_code.clone() else {
                warn!(code = %code, "subdivision selected for a free-text country; ignoring");
                return state;
            };

            state.draft.city.clear();
            match state.selection.subdivision_by_code(&code).map(|s| s.name.clone()) {
                Some(name) => {
                    state.draft.subdivision = name;
                    state.selection.available_cities =
                        locations.cities_of(&country_code, &code).to_vec();
                    state.selection.selected_subdivision_code = Some(code);
                }
                None => {
                    debug!(code = %code, "unknown subdivision code selected");
                    state.draft.subdivision.clear();
                    state.selection.available_cities.clear();
                    state.selection.selected_subdivision_code = None;
                }
            }
        }

        FormEvent::SubdivisionTyped { value } => {
            if state.selection.is_cascading() {
                warn!("free-text subdivision entered for a cascading country; ignoring");
                return state;
            }
            state.draft.subdivision = value;
        }

        FormEvent::CityChanged { city } => {
            state.draft.city = city;
        }

        FormEvent::FieldChanged { field, value } => {
            if field.is_personal() {
                *state.draft.value_mut(field) = value;
                return state;
            }
            let routed = match field {
                DraftField::Country => FormEvent::CountryChanged { country: value },
                DraftField::Subdivision => FormEvent::SubdivisionTyped { value },
                _ => FormEvent::CityChanged { city: value },
            };
            return reduce(state, routed, locations);
        }
    }

    state
}

/// Matches the draft's subdivision name against the loaded list.
///
/// A miss leaves the selection empty; the draft text is kept as is.
fn resolve_subdivision<L>(state: &mut FormState, locations: &L)
where
    L: LocationReference + ?Sized,
{
    let Some(country_code) = state.selection.country_code.clone() else {
        return;
    };
    if state.draft.subdivision.is_empty() {
        return;
    }

    match state.selection.subdivision_by_name(&state.draft.subdivision) {
        Some(subdivision) => {
            let code = subdivision.code.clone();
            state.selection.available_cities = locations.cities_of(&country_code, &code).to_vec();
            state.selection.selected_subdivision_code = Some(code);
        }
        None => {
            debug!(
                subdivision = %state.draft.subdivision,
                country = %country_code,
                "subdivision not found in reference data"
            );
            state.selection.selected_subdivision_code = None;
            state.selection.available_cities.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationIndex;

    fn index() -> &'static LocationIndex {
        LocationIndex::bundled()
    }

    fn apply(state: FormState, events: impl IntoIterator<Item = FormEvent>) -> FormState {
        events
            .into_iter()
            .fold(state, |state, event| reduce(state, event, index()))
    }

    fn country(name: &str) -> FormEvent {
        FormEvent::CountryChanged {
            country: name.into(),
        }
    }

    fn select(code: &str) -> FormEvent {
        FormEvent::SubdivisionSelected { code: code.into() }
    }

    mod profile_load_tests {
        use super::*;

        #[test]
        fn test_load_resolves_known_subdivision() {
            let profile = Profile {
                country: Some("India".into()),
                state: Some("Karnataka".into()),
                city: Some("Mysore".into()),
                ..Profile::default()
            };
            let state = apply(FormState::new(), [FormEvent::ProfileLoaded { profile }]);

            assert_eq!(state.selection.selected_subdivision_code.as_deref(), Some("KA"));
            assert_eq!(
                state.selection.available_cities,
                index().cities_of("IN", "KA").to_vec()
            );
            assert_eq!(state.draft.city, "Mysore");
            assert_eq!(state.draft.subdivision, "Karnataka");
        }

        #[test]
        fn test_load_with_unknown_subdivision_leaves_selection_empty() {
            let profile = Profile {
                country: Some("India".into()),
                state: Some("karnataka".into()),
                city: Some("Mysore".into()),
                ..Profile::default()
            };
            let state = apply(FormState::new(), [FormEvent::ProfileLoaded { profile }]);

            assert!(state.selection.is_cascading());
            assert!(!state.selection.available_subdivisions.is_empty());
            assert!(state.selection.selected_subdivision_code.is_none());
            assert!(state.selection.available_cities.is_empty());
            assert_eq!(state.draft.subdivision, "karnataka");
            assert_eq!(state.draft.city, "Mysore");
        }

        #[test]
        fn test_load_free_text_country() {
            let profile = Profile {
                country: Some("Japan".into()),
                state: Some("Tokyo".into()),
                city: Some("Shibuya".into()),
                ..Profile::default()
            };
            let state = apply(FormState::new(), [FormEvent::ProfileLoaded { profile }]);

            assert_eq!(state.selection, SelectionContext::default());
            assert_eq!(state.draft.subdivision, "Tokyo");
            assert_eq!(state.draft.city, "Shibuya");
        }

        #[test]
        fn test_second_load_is_ignored() {
            let first = Profile {
                first_name: Some("Asha".into()),
                ..Profile::default()
            };
            let second = Profile {
                first_name: Some("Other".into()),
                ..Profile::default()
            };
            let state = apply(
                FormState::new(),
                [
                    FormEvent::ProfileLoaded { profile: first },
                    FormEvent::ProfileLoaded { profile: second },
                ],
            );
            assert_eq!(state.draft.first_name, "Asha");
            assert!(state.profile_applied());
        }

        #[test]
        fn test_load_overwrites_earlier_edits() {
            let state = apply(
                FormState::new(),
                [
                    FormEvent::FieldChanged {
                        field: DraftField::FirstName,
                        value: "typed".into(),
                    },
                    FormEvent::ProfileLoaded {
                        profile: Profile::default(),
                    },
                ],
            );
            assert!(state.draft.first_name.is_empty());
        }
    }

    mod country_tests {
        use super::*;

        #[test]
        fn test_india_populates_subdivisions() {
            let state = apply(FormState::new(), [country("India")]);
            assert_eq!(state.selection.country_code.as_deref(), Some("IN"));
            assert_eq!(
                state.selection.available_subdivisions,
                index().subdivisions_of("IN").to_vec()
            );
            assert!(state.selection.available_cities.is_empty());
        }

        #[test]
        fn test_switch_away_discards_codes() {
            let state = apply(
                FormState::new(),
                [
                    country("India"),
                    select("MH"),
                    FormEvent::CityChanged {
                        city: "Pune".into(),
                    },
                    country("Germany"),
                ],
            );
            assert_eq!(state.selection, SelectionContext::default());
            assert!(state.draft.subdivision.is_empty());
            assert!(state.draft.city.is_empty());
            assert_eq!(state.draft.country, "Germany");
        }

        #[test]
        fn test_reselecting_same_country_still_clears() {
            let state = apply(
                FormState::new(),
                [country("India"), select("GA"), country("India")],
            );
            assert!(state.selection.selected_subdivision_code.is_none());
            assert!(state.selection.available_cities.is_empty());
            assert!(state.draft.subdivision.is_empty());
        }

        #[test]
        fn test_field_changed_country_routes_through_country_change() {
            let state = apply(
                FormState::new(),
                [
                    FormEvent::SubdivisionTyped {
                        value: "Bavaria".into(),
                    },
                    FormEvent::FieldChanged {
                        field: DraftField::Country,
                        value: "India".into(),
                    },
                ],
            );
            assert!(state.draft.subdivision.is_empty());
            assert!(state.selection.is_cascading());
        }
    }

    mod subdivision_tests {
        use super::*;

        #[test]
        fn test_select_sets_name_and_cities() {
            let state = apply(FormState::new(), [country("India"), select("TN")]);
            assert_eq!(state.draft.subdivision, "Tamil Nadu");
            assert_eq!(state.selection.selected_subdivision_code.as_deref(), Some("TN"));
            assert!(state
                .selection
                .available_cities
                .iter()
                .any(|c| c.name == "Chennai"));
        }

        #[test]
        fn test_select_clears_city() {
            let state = apply(
                FormState::new(),
                [
                    country("India"),
                    select("KA"),
                    FormEvent::CityChanged {
                        city: "Udupi".into(),
                    },
                    select("KL"),
                ],
            );
            assert!(state.draft.city.is_empty());
            assert_eq!(state.draft.subdivision, "Kerala");
        }

        #[test]
        fn test_select_unknown_code() {
            let state = apply(FormState::new(), [country("India"), select("KA"), select("ZZ")]);
            assert!(state.draft.subdivision.is_empty());
            assert!(state.selection.available_cities.is_empty());
            assert!(state.selection.selected_subdivision_code.is_none());
        }

        #[test]
        fn test_select_ignored_for_free_text_country() {
            let before = apply(FormState::new(), [country("France")]);
            let after = reduce(before.clone(), select("KA"), index());
            assert_eq!(before, after);
        }

        #[test]
        fn test_typed_subdivision_ignored_for_cascading_country() {
            let state = apply(
                FormState::new(),
                [
                    country("India"),
                    FormEvent::SubdivisionTyped {
                        value: "Somewhere".into(),
                    },
                ],
            );
            assert!(state.draft.subdivision.is_empty());
        }

        #[test]
        fn test_free_text_accepted_verbatim() {
            let state = apply(
                FormState::new(),
                [
                    country("Japan"),
                    FormEvent::SubdivisionTyped {
                        value: "  Tokyo ".into(),
                    },
                    FormEvent::CityChanged {
                        city: "Minato-ku".into(),
                    },
                ],
            );
            assert_eq!(state.draft.subdivision, "  Tokyo ");
            assert_eq!(state.draft.city, "Minato-ku");
            assert!(state.selection.available_subdivisions.is_empty());
            assert!(state.selection.available_cities.is_empty());
        }
    }

    mod required_tests {
        use super::*;

        fn personal() -> Vec<FormEvent> {
            [
                (DraftField::FirstName, "Asha"),
                (DraftField::LastName, "Rao"),
                (DraftField::Age, "29"),
                (DraftField::EducationLevel, "High School"),
            ]
            .into_iter()
            .map(|(field, value)| FormEvent::FieldChanged {
                field,
                value: value.into(),
            })
            .collect()
        }

        #[test]
        fn test_unresolved_loaded_state_is_missing() {
            let profile = Profile {
                country: Some("India".into()),
                state: Some("karnataka".into()),
                city: Some("Mysore".into()),
                ..Profile::default()
            };
            let state = apply(FormState::new(), [FormEvent::ProfileLoaded { profile }]);
            let state = apply(state, personal());

            assert_eq!(state.draft.subdivision, "karnataka");
            assert!(state.draft.missing_required().is_empty());
            assert_eq!(
                state.missing_required(),
                vec![DraftField::Subdivision, DraftField::City]
            );
        }

        #[test]
        fn test_city_outside_selected_state_is_missing() {
            let mut events = personal();
            events.extend([
                country("India"),
                select("KA"),
                FormEvent::CityChanged {
                    city: "Chennai".into(),
                },
            ]);
            let state = apply(FormState::new(), events);
            assert_eq!(state.missing_required(), vec![DraftField::City]);

            let state = reduce(
                state,
                FormEvent::CityChanged {
                    city: "Mysore".into(),
                },
                index(),
            );
            assert!(state.missing_required().is_empty());
        }

        #[test]
        fn test_free_text_location_only_needs_text() {
            let mut events = personal();
            events.extend([
                country("Japan"),
                FormEvent::SubdivisionTyped {
                    value: "Tokyo".into(),
                },
                FormEvent::CityChanged {
                    city: "Shibuya".into(),
                },
            ]);
            let state = apply(FormState::new(), events);
            assert!(state.missing_required().is_empty());
        }

        #[test]
        fn test_fractional_age_is_missing() {
            let mut events = personal();
            events.push(FormEvent::FieldChanged {
                field: DraftField::Age,
                value: "29.5".into(),
            });
            let state = apply(FormState::new(), events);
            assert!(state.missing_required().contains(&DraftField::Age));
        }

        #[test]
        fn test_field_changed_city_assigns_directly() {
            let state = apply(
                FormState::new(),
                [FormEvent::FieldChanged {
                    field: DraftField::City,
                    value: "Lyon".into(),
                }],
            );
            assert_eq!(state.draft.city, "Lyon");
            assert_eq!(state.selection, SelectionContext::default());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_country() -> impl Strategy<Value = String> {
            let names: Vec<String> = index().countries().iter().map(|c| c.name.clone()).collect();
            prop_oneof![
                proptest::sample::select(names),
                "[A-Za-z ]{0,12}".prop_map(String::from),
            ]
        }

        fn any_event() -> impl Strategy<Value = FormEvent> {
            let codes: Vec<String> = index()
                .subdivisions_of("IN")
                .iter()
                .map(|s| s.code.clone())
                .collect();
            prop_oneof![
                any_country().prop_map(|country| FormEvent::CountryChanged { country }),
                proptest::sample::select(codes).prop_map(|code| FormEvent::SubdivisionSelected { code }),
                "[A-Za-z ]{0,12}".prop_map(|value| FormEvent::SubdivisionTyped { value }),
                "[A-Za-z ]{0,12}".prop_map(|city| FormEvent::CityChanged { city }),
            ]
        }

        proptest! {
            #[test]
            fn country_change_always_clears_location(
                events in proptest::collection::vec(any_event(), 0..12),
                next in any_country(),
            ) {
                let state = apply(FormState::new(), events);
                let state = reduce(state, FormEvent::CountryChanged { country: next }, index());

                prop_assert!(state.draft.subdivision.is_empty());
                prop_assert!(state.draft.city.is_empty());
                prop_assert!(state.selection.selected_subdivision_code.is_none());
                prop_assert!(state.selection.available_cities.is_empty());
            }

            #[test]
            fn selection_matches_country(events in proptest::collection::vec(any_event(), 0..16)) {
                let state = apply(FormState::new(), events);
                let wired = index()
                    .country_code(&state.draft.country)
                    .is_some_and(|code| index().has_subdivision_data(code));

                if wired {
                    prop_assert!(!state.selection.available_subdivisions.is_empty());
                } else {
                    prop_assert_eq!(&state.selection, &SelectionContext::default());
                }
            }

            #[test]
            fn selected_subdivision_resolves_to_draft_name(
                events in proptest::collection::vec(any_event(), 0..16),
            ) {
                let state = apply(FormState::new(), events);
                if let Some(code) = state.selection.selected_subdivision_code.as_deref() {
                    let sub = state.selection.subdivision_by_code(code);
                    prop_assert!(sub.is_some());
                    prop_assert_eq!(&sub.unwrap().name, &state.draft.subdivision);
                }
            }
        }
    }
}
