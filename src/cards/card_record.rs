use serde::{Deserialize, Serialize};

use super::cardnumber::CardNumber;
use crate::utilities::constants::RARITY_TRUNCATION_MARKER;

/// One row of a scraped card list: a numbered card and every rarity it was
/// printed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub number: CardNumber,
    pub name: String,
    pub rarities: Vec<String>,
}

impl CardRecord {
    pub fn new(number: CardNumber, name: String, rarities: Vec<String>) -> Self {
        Self {
            number,
            name,
            rarities,
        }
    }

    pub fn series_code(&self) -> String {
        self.number.series_code()
    }

    pub fn is_truncated(&self) -> bool {
        self.rarities
            .last()
            .map(|r| r == RARITY_TRUNCATION_MARKER)
            .unwrap_or(false)
    }

    pub fn rarity_label(&self) -> String {
        self.rarities.join(" / ")
    }

    /// Rarities that end up in the interchange CSV (no truncation marker).
    pub fn exported_rarities(&self) -> impl Iterator<Item = &str> {
        self.rarities
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty() && *r != RARITY_TRUNCATION_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_marker_is_not_exported() {
        let record = CardRecord::new(
            CardNumber::new("RA02-FR001").unwrap(),
            "Carte A".to_string(),
            vec!["Rare".to_string(), "Secret Rare".to_string(), "...".to_string()],
        );
        assert!(record.is_truncated());
        assert_eq!(record.rarity_label(), "Rare / Secret Rare / ...");
        assert_eq!(
            record.exported_rarities().collect::<Vec<_>>(),
            vec!["Rare", "Secret Rare"]
        );
    }
}
