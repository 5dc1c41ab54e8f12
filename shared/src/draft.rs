use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_GENDER: &str = "Prefer not to say";

pub const GENDER_OPTIONS: &[&str] = &[DEFAULT_GENDER, "Male", "Female", "Other"];

pub const EDUCATION_OPTIONS: &[&str] = &[
    "High School",
    "Some College",
    "Associate's Degree",
    "Bachelor's Degree",
    "Master's Degree",
    "Doctorate (Ph.D.)",
];

/// The in-progress personal information record.
///
/// Every value is kept as the user typed it; conversion to the wire shape
/// happens in [`crate::submission::build_payload`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub education_level: String,
    pub country: String,
    pub subdivision: String,
    pub city: String,
}

impl Default for ProfileDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            age: String::new(),
            gender: DEFAULT_GENDER.to_string(),
            education_level: String::new(),
            country: String::new(),
            subdivision: String::new(),
            city: String::new(),
        }
    }
}

impl ProfileDraft {
    /// Overwrites every field from a loaded profile.
    pub fn fill_from(&mut self, profile: &Profile) {
        let (split_first, split_last) = profile.split_name();

        self.first_name = non_empty(profile.first_name.as_deref()).unwrap_or(split_first);
        self.last_name = non_empty(profile.last_name.as_deref()).unwrap_or(split_last);
        self.age = match profile.age {
            Some(age) if age > 0 => age.to_string(),
            _ => String::new(),
        };
        self.gender =
            non_empty(profile.gender.as_deref()).unwrap_or_else(|| DEFAULT_GENDER.to_string());
        self.education_level = non_empty(profile.education_level.as_deref()).unwrap_or_default();
        self.country = non_empty(profile.country.as_deref()).unwrap_or_default();
        self.subdivision = non_empty(profile.state.as_deref()).unwrap_or_default();
        self.city = non_empty(profile.city.as_deref()).unwrap_or_default();
    }

    #[must_use]
    pub fn value(&self, field: DraftField) -> &str {
        match field {
            DraftField::FirstName => &self.first_name,
            DraftField::LastName => &self.last_name,
            DraftField::Age => &self.age,
            DraftField::Gender => &self.gender,
            DraftField::EducationLevel => &self.education_level,
            DraftField::Country => &self.country,
            DraftField::Subdivision => &self.subdivision,
            DraftField::City => &self.city,
        }
    }

    pub fn value_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::FirstName => &mut self.first_name,
            DraftField::LastName => &mut self.last_name,
            DraftField::Age => &mut self.age,
            DraftField::Gender => &mut self.gender,
            DraftField::EducationLevel => &mut self.education_level,
            DraftField::Country => &mut self.country,
            DraftField::Subdivision => &mut self.subdivision,
            DraftField::City => &mut self.city,
        }
    }

    /// Required fields that are still blank, in form order.
    ///
    /// Gender always carries a value and is not required.
    #[must_use]
    pub fn missing_required(&self) -> Vec<DraftField> {
        DraftField::REQUIRED
            .iter()
            .copied()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Identifies a single input on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    FirstName,
    LastName,
    Age,
    Gender,
    EducationLevel,
    Country,
    Subdivision,
    City,
}

impl DraftField {
    pub const REQUIRED: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Age,
        Self::EducationLevel,
        Self::Country,
        Self::Subdivision,
        Self::City,
    ];

    /// Fields that are plain assignments with no location side effects.
    #[must_use]
    pub const fn is_personal(self) -> bool {
        matches!(
            self,
            Self::FirstName | Self::LastName | Self::Age | Self::Gender | Self::EducationLevel
        )
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::EducationLevel => "Education Level",
            Self::Country => "Country",
            Self::Subdivision => "State / Province",
            Self::City => "City",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Profile record as delivered by the profile source. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// An age the source sent in an unusable shape loads as `None`.
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Profile {
    /// First token of `name`, and the remaining tokens joined by single spaces.
    fn split_name(&self) -> (String, String) {
        let Some(name) = self.name.as_deref() else {
            return (String::new(), String::new());
        };
        let mut parts = name.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        let rest = parts.collect::<Vec<_>>().join(" ");
        (first, rest)
    }
}

/// Accepts whole numbers and numeric strings; anything else is `None`.
///
/// Binary formats carry the strict `Option<u32>` shape.
fn deserialize_lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    if !deserializer.is_human_readable() {
        return Option::<u32>::deserialize(deserializer);
    }

    let age = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(age)
}
