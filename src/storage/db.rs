use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::{
    error::{BonusError, Result},
    storage::models::{Disposition, LeaveCategoryRow, LeaveCategoryTable},
    text::normalize_key,
};

/// SQLite-backed store for the leave category table, the only state kept
/// between runs.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS leave_categories (
                name_key TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                disposition TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Load the full table. Called once per processing run.
    pub fn load(&self) -> Result<LeaveCategoryTable> {
        let mut stmt = self.conn.prepare(
            "SELECT name, disposition FROM leave_categories ORDER BY name_key",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut table = LeaveCategoryTable::new();
        for (name, disposition) in rows {
            let disposition: Disposition = disposition.parse()?;
            table.insert(&name, disposition);
        }

        debug!("Loaded {} leave categories", table.len());
        Ok(table)
    }

    /// Replace the stored table with `table` in a single transaction.
    pub fn save(&mut self, table: &LeaveCategoryTable) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM leave_categories", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO leave_categories (name_key, name, disposition, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (key, category) in table.iter() {
                stmt.execute(params![key, category.name, category.disposition.as_str(), now])?;
            }
        }
        tx.commit()?;

        info!("Saved {} leave categories", table.len());
        Ok(())
    }

    /// Validate an uploaded table and, only if every row is valid, replace the
    /// stored one with it.
    pub fn replace_from_upload(&mut self, rows: &[LeaveCategoryRow]) -> Result<LeaveCategoryTable> {
        let table = LeaveCategoryTable::from_rows(rows)?;
        if table.is_empty() {
            return Err(BonusError::InvalidCategoryUpload(
                "upload contains no categories".to_string(),
            ));
        }
        self.save(&table)?;
        Ok(table)
    }

    /// Insert or update a single category, e.g. after an operator classifies
    /// a leave type the last run reported as unknown.
    pub fn set(&self, name: &str, disposition: Disposition) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BonusError::InvalidCategoryUpload(
                "leave type name is empty".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO leave_categories (name_key, name, disposition, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                normalize_key(name),
                name,
                disposition.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM leave_categories WHERE name_key = ?1",
            params![normalize_key(name)],
        )?;
        if removed == 0 {
            return Err(BonusError::CategoryNotFound(name.trim().to_string()));
        }
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM leave_categories",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Write the default categories when the store is empty. Returns whether
    /// anything was written.
    pub fn seed_defaults_if_empty(&mut self) -> Result<bool> {
        if self.count()? > 0 {
            return Ok(false);
        }
        self.save(&LeaveCategoryTable::defaults())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, disposition: &str) -> LeaveCategoryRow {
        LeaveCategoryRow {
            name: name.to_string(),
            disposition: disposition.to_string(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.load().unwrap().is_empty());

        let table = LeaveCategoryTable::defaults();
        db.save(&table).unwrap();
        assert_eq!(db.load().unwrap(), table);
    }

    #[test]
    fn test_seed_only_once() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(db.seed_defaults_if_empty().unwrap());
        db.set("Home Office", Disposition::GrantsBonus).unwrap();
        assert!(!db.seed_defaults_if_empty().unwrap());
        assert_eq!(db.count().unwrap(), LeaveCategoryTable::defaults().len() + 1);
    }

    #[test]
    fn test_replace_from_upload_is_wholesale() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_defaults_if_empty().unwrap();

        let table = db
            .replace_from_upload(&[row("Atraso", "nao paga"), row("Abono", "paga")])
            .unwrap();
        assert_eq!(table.len(), 2);

        let loaded = db.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.lookup("atraso"), Some(Disposition::BlocksBonus));
        assert_eq!(loaded.lookup("Atestado Médico"), None);
    }

    #[test]
    fn test_invalid_upload_leaves_store_untouched() {
        let mut db = Database::open_in_memory().unwrap();
        db.seed_defaults_if_empty().unwrap();
        let before = db.load().unwrap();

        assert!(db
            .replace_from_upload(&[row("Atraso", "paga"), row("Abono", "???")])
            .is_err());
        assert!(db.replace_from_upload(&[]).is_err());
        assert_eq!(db.load().unwrap(), before);
    }

    #[test]
    fn test_set_and_remove() {
        let db = Database::open_in_memory().unwrap();
        db.set("Atraso", Disposition::RequiresDecision).unwrap();
        db.set("ATRASO", Disposition::BlocksBonus).unwrap();
        assert_eq!(db.count().unwrap(), 1);
        assert_eq!(db.load().unwrap().lookup("atraso"), Some(Disposition::BlocksBonus));

        db.remove("atraso").unwrap();
        assert_eq!(db.count().unwrap(), 0);
        assert!(matches!(db.remove("atraso"), Err(BonusError::CategoryNotFound(_))));
        assert!(db.set("   ", Disposition::GrantsBonus).is_err());
    }
}
