//! Postal code format hints.
//!
//! Only some countries have a known pattern. The rest are reported as
//! `Unchecked`; callers decide what that means. Lookups are never rejected on
//! a pattern mismatch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Country;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCheck {
    Valid,
    Invalid,
    /// No pattern is known for this country.
    Unchecked,
}

// Literal patterns; `test_every_pattern_compiles` covers them.
#[allow(clippy::expect_used)]
static US_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid US zip regex"));
#[allow(clippy::expect_used)]
static CA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]\d[A-Za-z][ -]?\d[A-Za-z]\d$").expect("valid CA postal regex")
});
#[allow(clippy::expect_used)]
static DE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid DE postal regex"));

fn pattern_for(country: Country) -> Option<&'static Regex> {
    match country {
        Country::Us => Some(&*US_PATTERN),
        Country::Ca => Some(&*CA_PATTERN),
        Country::De => Some(&*DE_PATTERN),
        _ => None,
    }
}

pub fn validate_postal_code(country: Country, postal_code: &str) -> PatternCheck {
    match pattern_for(country) {
        Some(re) if re.is_match(postal_code.trim()) => PatternCheck::Valid,
        Some(_) => PatternCheck::Invalid,
        None => PatternCheck::Unchecked,
    }
}
