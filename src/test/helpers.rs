use std::path::{Path, PathBuf};

use crate::db::Database;

pub static RA02_NAME: &str = "25th Anniversary Rarity Collection II";

pub static RA02_URL: &str =
    "https://yugipedia.com/wiki/Set_Card_Lists:25th_Anniversary_Rarity_Collection_II_(TCG-FR)";

pub static RA02_CSV: &str = "Code_Serie,Nom_Carte,Rareté,Numéro_Carte
RA02,Carte A,Rare,RA02-FR001
RA02,Carte A,Secret Rare,RA02-FR001
RA02,Carte B,Common,RA02-FR002
";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// RA02 with two cards and three not-owned copies, built through the storage
/// API directly.
pub fn db_with_ra02() -> Database {
    let db = Database::open_in_memory().unwrap();
    let series_id = db.add_series("RA02", RA02_NAME, Some(RA02_URL)).unwrap();

    let card_a = db.add_card("RA02-FR001", "Carte A", series_id).unwrap();
    let card_b = db.add_card("RA02-FR002", "Carte B", series_id).unwrap();

    for (card, rarity) in [
        (card_a, "Rare"),
        (card_a, "Secret Rare"),
        (card_b, "Common"),
    ] {
        let rarity_id = db.get_or_create_rarity(rarity).unwrap();
        db.link_card_rarity(card, rarity_id).unwrap();
    }
    db
}
