/// Rarities seeded into a fresh database, with their display order.
pub const KNOWN_RARITIES: [(&str, i64); 11] = [
    ("Common", 1),
    ("Rare", 2),
    ("Super Rare", 3),
    ("Ultra Rare", 4),
    ("Secret Rare", 5),
    ("Ultimate Rare", 6),
    ("Ghost Rare", 7),
    ("Starlight Rare", 8),
    ("Collector's Rare", 9),
    ("Platinum Secret Rare", 10),
    ("Quarter Century Secret Rare", 11),
];

pub fn looks_like_rarity(text: &str) -> bool {
    text.contains("Rare") || text.contains("Common")
}
