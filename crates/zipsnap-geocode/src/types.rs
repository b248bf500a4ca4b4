use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Countries the lookup service is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Us,
    Ca,
    De,
    Fr,
    Br,
    In,
    Jp,
    Cm,
}

impl Country {
    pub const ALL: [Country; 8] = [
        Country::Us,
        Country::Ca,
        Country::De,
        Country::Fr,
        Country::Br,
        Country::In,
        Country::Jp,
        Country::Cm,
    ];

    /// Lowercase code used in request paths
    pub fn code(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Ca => "ca",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Br => "br",
            Self::In => "in",
            Self::Jp => "jp",
            Self::Cm => "cm",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Ca => "Canada",
            Self::De => "Germany",
            Self::Fr => "France",
            Self::Br => "Brazil",
            Self::In => "India",
            Self::Jp => "Japan",
            Self::Cm => "Cameroon",
        }
    }

    /// Example postal code shown as an input hint
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Us => "90210",
            Self::Ca => "K1A",
            Self::De => "10115",
            Self::Fr => "75001",
            Self::Br => "01000-000",
            Self::In => "110001",
            Self::Jp => "100-0001",
            Self::Cm => "60005",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported country code: {0}")]
pub struct UnknownCountry(pub String);

impl FromStr for Country {
    type Err = UnknownCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Country::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| UnknownCountry(s.to_string()))
    }
}

/// A single place within a postal code area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "place name")]
    pub place_name: String,

    #[serde(default)]
    pub state: String,

    #[serde(rename = "state abbreviation", default)]
    pub state_abbreviation: String,

    /// Decimal degrees as sent upstream; absent for some regions
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<String>,

    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<String>,
}

impl Place {
    /// Parsed `(latitude, longitude)`, if both are present and numeric.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.longitude.as_deref()?.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }

    /// Link to the place on Google Maps.
    pub fn maps_url(&self) -> Option<String> {
        let (lat, lon) = self.coordinates()?;
        Some(format!("https://www.google.com/maps?q={},{}", lat, lon))
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Body of a successful upstream response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiLocation {
    #[serde(rename = "post code")]
    pub post_code: String,

    pub country: String,

    #[serde(rename = "country abbreviation", default)]
    pub country_abbreviation: String,

    #[serde(default)]
    pub places: Vec<Place>,
}

/// The result of one successful lookup.
///
/// Identity is `(postal_code, country)`; the timestamp is capture time and
/// takes no part in it. Records are never mutated once built: a repeat
/// lookup produces a new record that replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "post code")]
    pub postal_code: String,

    pub country: String,

    #[serde(rename = "country abbreviation", default)]
    pub country_abbreviation: String,

    pub places: Vec<Place>,

    pub timestamp: DateTime<Utc>,

    /// `{country_code}/{postal_code}` as typed by the user
    #[serde(rename = "searchQuery")]
    pub search_query: String,

    #[serde(
        rename = "isFavorite",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_favorite: bool,
}

impl LocationRecord {
    /// Build a record from an upstream response captured at `captured_at`.
    ///
    /// Returns `None` when the response carries no places.
    pub fn capture(
        api: ApiLocation,
        country: Country,
        postal_code: &str,
        captured_at: DateTime<Utc>,
    ) -> Option<Self> {
        if api.places.is_empty() {
            return None;
        }

        Some(Self {
            postal_code: api.post_code,
            country: api.country,
            country_abbreviation: api.country_abbreviation,
            places: api.places,
            timestamp: captured_at,
            search_query: format!("{}/{}", country.code(), postal_code),
            is_favorite: false,
        })
    }

    /// Identity key used for de-duplication.
    pub fn key(&self) -> (&str, &str) {
        (&self.postal_code, &self.country)
    }

    pub fn same_key(&self, other: &LocationRecord) -> bool {
        self.key() == other.key()
    }

    /// First place in the response; the one shown and exported.
    pub fn primary_place(&self) -> Option<&Place> {
        self.places.first()
    }

    /// Country the record belongs to, derived from its abbreviation.
    pub fn country_code(&self) -> Option<Country> {
        self.country_abbreviation.parse().ok()
    }

    /// Copy of this record tagged as a favorite.
    pub fn as_favorite(&self) -> Self {
        Self {
            is_favorite: true,
            ..self.clone()
        }
    }
}
