use std::fmt;

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utilities::constants::UNKNOWN_SERIES_CODE;

lazy_static! {
    // "RA02-FR001" -> "RA02", "BLMM-EN045" -> "BLMM"
    static ref SERIES_PREFIX: Regex =
        Regex::new(r"^([A-Z0-9]+)-[A-Z]{1,3}\d+").expect("series prefix pattern is valid");
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardNumber {
    raw: String,
}

impl CardNumber {
    pub fn new(number: &str) -> Result<Self, String> {
        let number = number.trim();

        if number.is_empty() {
            return Err("Card number cannot be empty".to_string());
        }
        if !number.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            warn!("{} is not a valid card number", number);
            return Err(format!(
                "Card number {:?} may only contain letters, digits and dashes",
                number
            ));
        }

        Ok(Self {
            raw: number.to_uppercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn series_code(&self) -> String {
        series_code_of(&self.raw)
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Series code of a card number: the alphanumeric prefix before the region
/// separator, or `UNKNOWN` when the number does not have that shape.
pub fn series_code_of(number: &str) -> String {
    SERIES_PREFIX
        .captures(number.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_SERIES_CODE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_code_is_prefix_before_region() {
        assert_eq!(series_code_of("RA02-FR001"), "RA02");
        assert_eq!(series_code_of("BLMM-FR105"), "BLMM");
        assert_eq!(series_code_of("MP24-EN010"), "MP24");
        assert_eq!(series_code_of("LOB-E001"), "LOB");
    }

    #[test]
    fn test_unparsable_numbers_map_to_unknown() {
        assert_eq!(series_code_of("FR001"), "UNKNOWN");
        assert_eq!(series_code_of("RA02FR001"), "UNKNOWN");
        assert_eq!(series_code_of(""), "UNKNOWN");
    }

    #[test]
    fn test_card_number_normalises_case_and_rejects_garbage() {
        let number = CardNumber::new(" ra02-fr001 ").unwrap();
        assert_eq!(number.as_str(), "RA02-FR001");
        assert_eq!(number.series_code(), "RA02");
        assert!(CardNumber::new("").is_err());
        assert!(CardNumber::new("RA02 FR001").is_err());
    }
}
