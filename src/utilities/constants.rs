pub const DEFAULT_DB_PATH: &str = "database/collection.db";
pub const DEFAULT_STAGING_DIR: &str = "converter/staging";
pub const DEFAULT_CATALOG_PATH: &str = "urls_catalog.json";
pub const DEFAULT_CACHE_DIR: &str = "converter/cache";
pub const DEFAULT_REGION: &str = "FR";

pub const COLUMN_SERIES_CODE: &str = "Code_Serie";
pub const COLUMN_CARD_NAME: &str = "Nom_Carte";
pub const COLUMN_RARITY: &str = "Rareté";
pub const COLUMN_CARD_NUMBER: &str = "Numéro_Carte";
pub const CSV_HEADER: [&str; 4] = [
    COLUMN_SERIES_CODE,
    COLUMN_CARD_NAME,
    COLUMN_RARITY,
    COLUMN_CARD_NUMBER,
];

pub const EXPORT_HEADER: [&str; 5] = ["Série", "Numéro", "Nom", "Rareté", "Statut"];
pub const EXPORT_OWNED_STATUS: &str = "Possédé";

pub const UNKNOWN_SERIES_CODE: &str = "UNKNOWN";
pub const NAME_NOT_FOUND: &str = "Name not found";
pub const RARITY_NOT_FOUND: &str = "Rarity not found";
pub const RARITY_TRUNCATION_MARKER: &str = "...";
pub const MAX_RARITIES_PER_CARD: usize = 8;

pub const DEFAULT_CONDITION: &str = "NM";

pub const KNOWN_SET_LISTS: [(&str, &str); 4] = [
    (
        "BLMM",
        "https://yugipedia.com/wiki/Set_Card_Lists:Battles_of_Legend:_Monster_Mayhem_(TCG-FR)",
    ),
    (
        "BLMR",
        "https://yugipedia.com/wiki/Set_Card_Lists:Battles_of_Legend:_Monstrous_Revenge_(TCG-FR)",
    ),
    (
        "BLAR",
        "https://yugipedia.com/wiki/Set_Card_Lists:Battles_of_Legend:_Armageddon_(TCG-FR)",
    ),
    (
        "RA02",
        "https://yugipedia.com/wiki/Set_Card_Lists:25th_Anniversary_Rarity_Collection_II_(TCG-FR)",
    ),
];
