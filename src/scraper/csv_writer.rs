use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::cards::card_record::CardRecord;
use crate::error::Result;
use crate::utilities::constants::CSV_HEADER;
use crate::utilities::file_management::ensure_parent_dir;

/// Writes the interchange CSV: one row per (card, rarity). Returns the number
/// of data rows written.
pub fn write_cards_csv<W: Write>(cards: &[CardRecord], writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for card in cards {
        let series_code = card.series_code();
        if card.is_truncated() {
            warn!("{} lists more rarities than kept: {}", card.number, card.rarity_label());
        }
        for rarity in card.exported_rarities() {
            writer.write_record([
                series_code.as_str(),
                card.name.as_str(),
                rarity,
                card.number.as_str(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

pub fn write_cards_csv_file(cards: &[CardRecord], path: &Path) -> Result<usize> {
    ensure_parent_dir(path)?;
    let file = std::fs::File::create(path)?;
    let rows = write_cards_csv(cards, file)?;
    info!(
        "{} rows for {} cards written to {}",
        rows,
        cards.len(),
        path.display()
    );
    Ok(rows)
}
