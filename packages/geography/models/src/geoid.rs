//! Census tract GEOID parsing and validation.
//!
//! A tract GEOID is an 11-digit string: 2-digit state FIPS + 3-digit
//! county FIPS + 6-digit tract code. Malformed GEOIDs are a hard error
//! at load time; the rest of the pipeline assumes validity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a GEOID string fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tract GEOID '{value}': expected 11 digits (state+county+tract)")]
pub struct InvalidGeoidError {
    /// The rejected input.
    pub value: String,
}

/// A validated 11-digit census tract GEOID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geoid(String);

impl Geoid {
    /// Parses and validates a tract GEOID.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGeoidError`] if the input is not exactly 11 ASCII
    /// digits.
    pub fn parse(value: &str) -> Result<Self, InvalidGeoidError> {
        let trimmed = value.trim();
        if trimmed.len() == 11 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidGeoidError {
                value: value.to_string(),
            })
        }
    }

    /// The full 11-digit GEOID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit state FIPS code (first 2 digits).
    #[must_use]
    pub fn state_fips(&self) -> &str {
        &self.0[..2]
    }

    /// Three-digit county FIPS code (digits 3-5).
    #[must_use]
    pub fn county_fips(&self) -> &str {
        &self.0[2..5]
    }

    /// Five-digit county GEOID (state + county).
    #[must_use]
    pub fn county_geoid(&self) -> &str {
        &self.0[..5]
    }

    /// Six-digit tract code (last 6 digits).
    #[must_use]
    pub fn tract_code(&self) -> &str {
        &self.0[5..]
    }
}

impl std::fmt::Display for Geoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Geoid {
    type Err = InvalidGeoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Geoid {
    type Error = InvalidGeoidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Geoid> for String {
    fn from(geoid: Geoid) -> Self {
        geoid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_geoid() {
        let geoid = Geoid::parse("06037101110").unwrap();
        assert_eq!(geoid.state_fips(), "06");
        assert_eq!(geoid.county_fips(), "037");
        assert_eq!(geoid.county_geoid(), "06037");
        assert_eq!(geoid.tract_code(), "101110");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            Geoid::parse(" 06037101110 ").unwrap().as_str(),
            "06037101110"
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Geoid::parse("0603710111").is_err());
        assert!(Geoid::parse("060371011100").is_err());
        assert!(Geoid::parse("").is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(Geoid::parse("06037A01110").is_err());
    }

    #[test]
    fn orders_lexicographically() {
        let a = Geoid::parse("06037101110").unwrap();
        let b = Geoid::parse("06037101210").unwrap();
        assert!(a < b);
    }
}
