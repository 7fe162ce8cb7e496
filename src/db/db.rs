use std::path::Path;

use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::records::{
    CollectionTotals, CopyFilter, CopyRow, MissingCard, OwnershipRecord, OwnershipUpdate, Rarity,
    RarityStats, Series, SeriesStats, SeriesSummary, StatusFilter,
};
use crate::cards::rarity::KNOWN_RARITIES;
use crate::error::{is_unique_violation, Result};
use crate::utilities::constants::DEFAULT_CONDITION;
use crate::utilities::file_management::ensure_parent_dir;
use crate::utilities::string_manipulators::{date_time_as_string, placeholder_series_name};

const COPY_COLUMNS: &str = "SELECT o.id, s.code, s.name, c.number, c.name, r.name, o.owned
    FROM card_rarity_ownership o
    JOIN cards c ON c.id = o.card_id
    JOIN series s ON s.id = c.series_id
    JOIN rarities r ON r.id = o.rarity_id";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the collection database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let conn = Connection::open(path)?;
        info!("Opened collection database {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.create_tables()?;
        db.seed_rarities()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS series (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                source_url TEXT,
                added_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                series_id INTEGER NOT NULL REFERENCES series(id),
                added_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS rarities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                sort_order INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS card_rarity_ownership (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                card_id INTEGER NOT NULL REFERENCES cards(id),
                rarity_id INTEGER NOT NULL REFERENCES rarities(id),
                owned INTEGER NOT NULL DEFAULT 0,
                acquisition_date TEXT,
                condition TEXT NOT NULL DEFAULT 'NM',
                purchase_price REAL,
                notes TEXT,
                UNIQUE(card_id, rarity_id)
            )",
            [],
        )?;
        Ok(())
    }

    fn seed_rarities(&self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO rarities (name, sort_order) VALUES (?1, ?2)")?;
        for (name, order) in KNOWN_RARITIES.iter() {
            stmt.execute(params![name, order])?;
        }
        Ok(())
    }

    /// Inserts a series, or completes an existing one: a missing or different
    /// URL is filled in and a placeholder name is replaced by a real one.
    pub fn add_series(&self, code: &str, name: &str, source_url: Option<&str>) -> Result<i64> {
        let inserted = self.conn.execute(
            "INSERT INTO series (code, name, source_url) VALUES (?1, ?2, ?3)",
            params![code, name, source_url],
        );
        match inserted {
            Ok(_) => {
                info!("Series {} created ({})", code, name);
                Ok(self.conn.last_insert_rowid())
            }
            Err(e) if is_unique_violation(&e) => {
                let existing = match self.series(code)? {
                    Some(series) => series,
                    None => return Err(e.into()),
                };

                if let Some(url) = source_url {
                    if existing.source_url.as_deref() != Some(url) {
                        self.conn.execute(
                            "UPDATE series SET source_url = ?1 WHERE id = ?2",
                            params![url, existing.id],
                        )?;
                        info!("Series {}: source URL updated", code);
                    }
                }

                let placeholder = placeholder_series_name(code);
                if existing.name == placeholder && name != placeholder {
                    self.conn.execute(
                        "UPDATE series SET name = ?1 WHERE id = ?2",
                        params![name, existing.id],
                    )?;
                    info!("Series {} renamed to {}", code, name);
                }
                Ok(existing.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn add_card(&self, number: &str, name: &str, series_id: i64) -> Result<i64> {
        let inserted = self.conn.execute(
            "INSERT INTO cards (number, name, series_id) VALUES (?1, ?2, ?3)",
            params![number, name, series_id],
        );
        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => match self.card_id(number)? {
                Some(id) => Ok(id),
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Id of the rarity called `name`; unknown rarities are appended after the
    /// current last sort position.
    pub fn get_or_create_rarity(&self, name: &str) -> Result<i64> {
        if let Some(id) = self.rarity_id(name)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO rarities (name, sort_order)
             SELECT ?1, COALESCE(MAX(sort_order), 0) + 1 FROM rarities",
            params![name],
        )?;
        info!("New rarity registered: {}", name);
        Ok(self.conn.last_insert_rowid())
    }

    /// Creates the not-owned copy for (card, rarity). Returns false when it
    /// already exists.
    pub fn link_card_rarity(&self, card_id: i64, rarity_id: i64) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO card_rarity_ownership (card_id, rarity_id, owned) VALUES (?1, ?2, 0)",
            params![card_id, rarity_id],
        );
        match inserted {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_ownership(
        &self,
        card_number: &str,
        rarity_name: &str,
        update: &OwnershipUpdate,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE card_rarity_ownership
             SET owned = ?1, acquisition_date = ?2, condition = COALESCE(?3, ?4),
                 purchase_price = ?5, notes = ?6
             WHERE card_id = (SELECT id FROM cards WHERE number = ?7)
               AND rarity_id = (SELECT id FROM rarities WHERE name = ?8)",
            params![
                update.owned,
                update.acquisition_date,
                update.condition,
                DEFAULT_CONDITION,
                update.purchase_price,
                update.notes,
                card_number,
                rarity_name
            ],
        )?;
        debug!(
            "set_ownership {} / {} owned={} -> {} row(s)",
            card_number, rarity_name, update.owned, changed
        );
        Ok(changed > 0)
    }

    /// Completion per series, ordered by series code.
    pub fn collection_stats(&self) -> Result<Vec<SeriesStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.code, s.name, COUNT(o.id), COALESCE(SUM(o.owned), 0)
             FROM series s
             LEFT JOIN cards c ON c.series_id = s.id
             LEFT JOIN card_rarity_ownership o ON o.card_id = c.id
             GROUP BY s.id
             ORDER BY s.code",
        )?;
        let stats = stmt
            .query_map([], |row| {
                let total_copies: i64 = row.get(2)?;
                let owned_copies: i64 = row.get(3)?;
                Ok(SeriesStats {
                    series_code: row.get(0)?,
                    series_name: row.get(1)?,
                    total_copies,
                    owned_copies,
                    pct: completion_pct(owned_copies, total_copies),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    pub fn missing_cards(&self, series_code: Option<&str>) -> Result<Vec<MissingCard>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.code, c.number, c.name, r.name
             FROM card_rarity_ownership o
             JOIN cards c ON c.id = o.card_id
             JOIN series s ON s.id = c.series_id
             JOIN rarities r ON r.id = o.rarity_id
             WHERE o.owned = 0 AND (?1 IS NULL OR s.code = ?1)
             ORDER BY s.code, c.number, r.sort_order",
        )?;
        let missing = stmt
            .query_map(params![series_code], |row| {
                Ok(MissingCard {
                    series_code: row.get(0)?,
                    number: row.get(1)?,
                    name: row.get(2)?,
                    rarity: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(missing)
    }

    pub fn series_id(&self, code: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM series WHERE code = ?1", params![code], |row| {
                row.get(0)
            })
            .optional()?)
    }

    pub fn card_id(&self, number: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM cards WHERE number = ?1", params![number], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn rarity_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM rarities WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?)
    }

    pub fn series(&self, code: &str) -> Result<Option<Series>> {
        let result = self.conn.query_row(
            "SELECT id, code, name, source_url, added_at FROM series WHERE code = ?1",
            params![code],
            |row| {
                Ok(Series {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    source_url: row.get(3)?,
                    added_at: row.get(4)?,
                })
            },
        );

        match result {
            Ok(series) => Ok(Some(series)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn rarities(&self) -> Result<Vec<Rarity>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, sort_order FROM rarities ORDER BY sort_order, name")?;
        let rarities = stmt
            .query_map([], |row| {
                Ok(Rarity {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    sort_order: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rarities)
    }

    pub fn ownership(&self, card_number: &str, rarity_name: &str) -> Result<Option<OwnershipRecord>> {
        let result = self.conn.query_row(
            "SELECT o.id, o.card_id, o.rarity_id, o.owned, o.acquisition_date, o.condition,
                    o.purchase_price, o.notes
             FROM card_rarity_ownership o
             JOIN cards c ON c.id = o.card_id
             JOIN rarities r ON r.id = o.rarity_id
             WHERE c.number = ?1 AND r.name = ?2",
            params![card_number, rarity_name],
            |row| {
                Ok(OwnershipRecord {
                    id: row.get(0)?,
                    card_id: row.get(1)?,
                    rarity_id: row.get(2)?,
                    owned: row.get(3)?,
                    acquisition_date: row.get(4)?,
                    condition: row.get(5)?,
                    purchase_price: row.get(6)?,
                    notes: row.get(7)?,
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Card and copy counts per series, ordered by series code.
    pub fn series_overview(&self) -> Result<Vec<SeriesSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.code, s.name, COUNT(DISTINCT c.id), COUNT(o.id)
             FROM series s
             LEFT JOIN cards c ON c.series_id = s.id
             LEFT JOIN card_rarity_ownership o ON o.card_id = c.id
             GROUP BY s.id
             ORDER BY s.code",
        )?;
        let overview = stmt
            .query_map([], |row| {
                Ok(SeriesSummary {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    card_count: row.get(2)?,
                    copy_count: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(overview)
    }

    /// Rarities present in a series, in display order.
    pub fn series_rarities(&self, code: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.name
             FROM card_rarity_ownership o
             JOIN cards c ON c.id = o.card_id
             JOIN series s ON s.id = c.series_id
             JOIN rarities r ON r.id = o.rarity_id
             WHERE s.code = ?1
             GROUP BY r.id
             ORDER BY r.sort_order, r.name",
        )?;
        let names = stmt
            .query_map(params![code], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    pub fn series_copies(&self, code: &str, filter: &CopyFilter) -> Result<Vec<CopyRow>> {
        let mut sql = format!("{} WHERE s.code = ?", COPY_COLUMNS);
        let mut args = vec![code.to_string()];

        sql.push_str(filter.status.sql_clause());

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            if term.chars().all(|c| c.is_ascii_digit()) {
                sql.push_str(" AND c.number LIKE ?");
                args.push(pattern);
            } else {
                sql.push_str(" AND (LOWER(c.name) LIKE ? OR LOWER(c.number) LIKE ?)");
                args.push(pattern.clone());
                args.push(pattern);
            }
        }

        if let Some(rarity) = filter.rarity.as_deref() {
            sql.push_str(" AND r.name = ?");
            args.push(rarity.to_string());
        }

        sql.push_str(" ORDER BY c.number, r.sort_order");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), copy_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Copies across every series, ordered by series code then card number.
    pub fn copies(&self, status: StatusFilter) -> Result<Vec<CopyRow>> {
        let sql = format!(
            "{} WHERE 1 = 1{} ORDER BY s.code, c.number, r.sort_order",
            COPY_COLUMNS,
            status.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], copy_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Marks the given ownership rows owned (dated today) or missing (undated).
    pub fn set_owned_by_ids(&self, ids: &[i64], owned: bool) -> Result<usize> {
        let date = owned.then(|| date_time_as_string(None, Some("%Y-%m-%d")));
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE card_rarity_ownership SET owned = ?1, acquisition_date = ?2 WHERE id = ?3",
            )?;
            for id in ids {
                changed += stmt.execute(params![owned, date, id])?;
            }
        }
        tx.commit()?;
        info!("{} copies marked {}", changed, if owned { "owned" } else { "missing" });
        Ok(changed)
    }

    /// Permanently removes ownership rows. Cards and series stay.
    pub fn delete_ownership(&self, ids: &[i64]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM card_rarity_ownership WHERE id = ?1")?;
            for id in ids {
                deleted += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        info!("{} copies deleted", deleted);
        Ok(deleted)
    }

    pub fn rarity_stats(&self) -> Result<Vec<RarityStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.name, COUNT(o.id), COALESCE(SUM(o.owned), 0)
             FROM card_rarity_ownership o
             JOIN rarities r ON r.id = o.rarity_id
             GROUP BY r.id
             ORDER BY r.sort_order, r.name",
        )?;
        let stats = stmt
            .query_map([], |row| {
                Ok(RarityStats {
                    rarity: row.get(0)?,
                    total: row.get(1)?,
                    owned: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    pub fn totals(&self) -> Result<CollectionTotals> {
        Ok(self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM series),
                    (SELECT COUNT(*) FROM cards),
                    (SELECT COUNT(*) FROM card_rarity_ownership),
                    (SELECT COUNT(*) FROM card_rarity_ownership WHERE owned = 1)",
            [],
            |row| {
                Ok(CollectionTotals {
                    series: row.get(0)?,
                    cards: row.get(1)?,
                    copies: row.get(2)?,
                    owned: row.get(3)?,
                })
            },
        )?)
    }
}

fn copy_row(row: &Row) -> rusqlite::Result<CopyRow> {
    Ok(CopyRow {
        id: row.get(0)?,
        series_code: row.get(1)?,
        series_name: row.get(2)?,
        number: row.get(3)?,
        name: row.get(4)?,
        rarity: row.get(5)?,
        owned: row.get(6)?,
    })
}

pub fn completion_pct(owned: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        owned as f64 / total as f64 * 100.0
    }
}
