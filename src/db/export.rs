use std::path::Path;

use itertools::Itertools;
use log::info;

use super::db::Database;
use super::records::StatusFilter;
use crate::error::Result;
use crate::utilities::constants::{EXPORT_HEADER, EXPORT_OWNED_STATUS};
use crate::utilities::file_management::ensure_parent_dir;

/// Writes every owned copy to `path`, ordered by series name, card number and
/// rarity name. Returns the number of data rows.
pub fn export_owned_csv(db: &Database, path: &Path) -> Result<usize> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADER)?;

    let owned: Vec<_> = db
        .copies(StatusFilter::Owned)?
        .into_iter()
        .sorted_by(|a, b| {
            (&a.series_name, &a.number, &a.rarity).cmp(&(&b.series_name, &b.number, &b.rarity))
        })
        .collect();
    for copy in &owned {
        writer.write_record([
            copy.series_name.as_str(),
            copy.number.as_str(),
            copy.name.as_str(),
            copy.rarity.as_str(),
            EXPORT_OWNED_STATUS,
        ])?;
    }
    writer.flush()?;

    info!("{} owned copies exported to {}", owned.len(), path.display());
    Ok(owned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::helpers::db_with_ra02;

    #[test]
    fn test_export_lists_owned_copies_only() {
        let db = db_with_ra02();
        let id = db.ownership("RA02-FR002", "Common").unwrap().unwrap().id;
        db.set_owned_by_ids(&[id], true).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports/owned.csv");
        assert_eq!(export_owned_csv(&db, &path).unwrap(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Série,Numéro,Nom,Rareté,Statut\n\
             25th Anniversary Rarity Collection II,RA02-FR002,Carte B,Common,Possédé\n"
        );
    }

    #[test]
    fn test_export_orders_by_series_name_then_number_then_rarity() {
        let db = db_with_ra02();
        let series_id = db.add_series("ZZ01", "1st Anniversary Pack", None).unwrap();
        let card_id = db.add_card("ZZ01-FR001", "Carte Z", series_id).unwrap();
        let rare = db.get_or_create_rarity("Rare").unwrap();
        db.link_card_rarity(card_id, rare).unwrap();

        let ids: Vec<i64> = [
            ("RA02-FR001", "Secret Rare"),
            ("RA02-FR001", "Rare"),
            ("ZZ01-FR001", "Rare"),
        ]
        .iter()
        .map(|(number, rarity)| db.ownership(number, rarity).unwrap().unwrap().id)
        .collect();
        db.set_owned_by_ids(&ids, true).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owned.csv");
        assert_eq!(export_owned_csv(&db, &path).unwrap(), 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "1st Anniversary Pack,ZZ01-FR001,Carte Z,Rare,Possédé",
                "25th Anniversary Rarity Collection II,RA02-FR001,Carte A,Rare,Possédé",
                "25th Anniversary Rarity Collection II,RA02-FR001,Carte A,Secret Rare,Possédé",
            ]
        );
    }

    #[test]
    fn test_export_with_nothing_owned_writes_header() {
        let db = db_with_ra02();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owned.csv");
        assert_eq!(export_owned_csv(&db, &path).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Série,Numéro,Nom,Rareté,Statut\n"
        );
    }
}
