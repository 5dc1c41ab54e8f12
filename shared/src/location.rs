use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::error;

// ============================================================================
// Reference dataset
// ============================================================================

/// Bundled country/state/city table. Only India carries subdivision data.
const BUNDLED_LOCATIONS: &str = include_str!("../data/locations.json");

static BUNDLED_INDEX: LazyLock<LocationIndex> = LazyLock::new(|| {
    LocationIndex::from_json(BUNDLED_LOCATIONS).unwrap_or_else(|e| {
        error!(error = %e, "bundled location dataset is invalid; falling back to empty index");
        LocationIndex::default()
    })
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subdivision {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub name: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationDataError {
    #[error("malformed location dataset: {0}")]
    Malformed(String),

    #[error("duplicate country code: {code}")]
    DuplicateCountry { code: String },

    #[error("duplicate subdivision code {subdivision} in country {country}")]
    DuplicateSubdivision { country: String, subdivision: String },

    #[error("empty {what} in country {country}")]
    EmptyField { country: String, what: &'static str },
}

/// Lookups the form needs from a reference dataset.
///
/// Implemented by [`LocationIndex`]; tests and alternative shells may supply
/// their own tables without touching the reducer.
pub trait LocationReference {
    /// Code for a country display name, exact match.
    fn country_code(&self, country_name: &str) -> Option<&str>;

    fn subdivisions_of(&self, country_code: &str) -> &[Subdivision];

    fn cities_of(&self, country_code: &str, subdivision_code: &str) -> &[City];

    fn has_subdivision_data(&self, country_code: &str) -> bool {
        !self.subdivisions_of(country_code).is_empty()
    }
}

// On-disk shape of the bundled JSON.
#[derive(Deserialize)]
struct RawDataset {
    countries: Vec<RawCountry>,
}

#[derive(Deserialize)]
struct RawCountry {
    name: String,
    code: String,
    #[serde(default)]
    subdivisions: Vec<RawSubdivision>,
}

#[derive(Deserialize)]
struct RawSubdivision {
    name: String,
    code: String,
    #[serde(default)]
    cities: Vec<String>,
}

/// Immutable, process-wide location table.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    countries: Vec<Country>,
    subdivisions: HashMap<String, Vec<Subdivision>>,
    cities: HashMap<(String, String), Vec<City>>,
}

impl LocationIndex {
    /// The dataset compiled into the crate, parsed on first use.
    #[must_use]
    pub fn bundled() -> &'static Self {
        &BUNDLED_INDEX
    }

    pub fn from_json(json: &str) -> Result<Self, LocationDataError> {
        let raw: RawDataset =
            serde_json::from_str(json).map_err(|e| LocationDataError::Malformed(e.to_string()))?;

        let mut index = Self::default();

        for country in raw.countries {
            if country.code.trim().is_empty() || country.name.trim().is_empty() {
                return Err(LocationDataError::EmptyField {
                    country: country.name,
                    what: "country name or code",
                });
            }
            if index.countries.iter().any(|c| c.code == country.code) {
                return Err(LocationDataError::DuplicateCountry { code: country.code });
            }

            let mut subdivisions = Vec::with_capacity(country.subdivisions.len());
            for sub in country.subdivisions {
                if sub.code.trim().is_empty() || sub.name.trim().is_empty() {
                    return Err(LocationDataError::EmptyField {
                        country: country.code,
                        what: "subdivision name or code",
                    });
                }
                if subdivisions.iter().any(|s: &Subdivision| s.code == sub.code) {
                    return Err(LocationDataError::DuplicateSubdivision {
                        country: country.code,
                        subdivision: sub.code,
                    });
                }

                let cities = sub.cities.into_iter().map(|name| City { name }).collect();
                index
                    .cities
                    .insert((country.code.clone(), sub.code.clone()), cities);
                subdivisions.push(Subdivision {
                    name: sub.name,
                    code: sub.code,
                });
            }

            if !subdivisions.is_empty() {
                index.subdivisions.insert(country.code.clone(), subdivisions);
            }
            index.countries.push(Country {
                name: country.name,
                code: country.code,
            });
        }

        Ok(index)
    }

    /// Selectable countries, in dataset order.
    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }
}

impl LocationReference for LocationIndex {
    fn country_code(&self, country_name: &str) -> Option<&str> {
        self.countries
            .iter()
            .find(|c| c.name == country_name)
            .map(|c| c.code.as_str())
    }

    fn subdivisions_of(&self, country_code: &str) -> &[Subdivision] {
        self.subdivisions
            .get(country_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn cities_of(&self, country_code: &str, subdivision_code: &str) -> &[City] {
        self.cities
            .get(&(country_code.to_string(), subdivision_code.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
