use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub source_url: Option<String>,
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rarity {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
}

/// Ownership state of one (card, rarity) copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipRecord {
    pub id: i64,
    pub card_id: i64,
    pub rarity_id: i64,
    pub owned: bool,
    pub acquisition_date: Option<String>,
    pub condition: String,
    pub purchase_price: Option<f64>,
    pub notes: Option<String>,
}

/// Fields written by `Database::set_ownership`. `None` stores NULL, except for
/// `condition` which falls back to the default condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnershipUpdate {
    pub owned: bool,
    pub acquisition_date: Option<String>,
    pub condition: Option<String>,
    pub purchase_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub series_code: String,
    pub series_name: String,
    pub total_copies: i64,
    pub owned_copies: i64,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCard {
    pub series_code: String,
    pub number: String,
    pub name: String,
    pub rarity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub code: String,
    pub name: String,
    pub card_count: i64,
    pub copy_count: i64,
}

/// One ownership row joined with its card, series and rarity, as shown in
/// the collection tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyRow {
    pub id: i64,
    pub series_code: String,
    pub series_name: String,
    pub number: String,
    pub name: String,
    pub rarity: String,
    pub owned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RarityStats {
    pub rarity: String,
    pub total: i64,
    pub owned: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CollectionTotals {
    pub series: i64,
    pub cards: i64,
    pub copies: i64,
    pub owned: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum StatusFilter {
    #[default]
    #[strum(serialize = "All")]
    All,
    #[strum(serialize = "Owned")]
    Owned,
    #[strum(serialize = "Missing")]
    Missing,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Owned, StatusFilter::Missing];

    pub(crate) fn sql_clause(&self) -> &'static str {
        match self {
            StatusFilter::All => "",
            StatusFilter::Owned => " AND o.owned = 1",
            StatusFilter::Missing => " AND o.owned = 0",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyFilter {
    pub status: StatusFilter,
    pub rarity: Option<String>,
    pub search: Option<String>,
}
