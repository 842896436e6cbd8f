// Category repository
// Labels are created lazily by the classifier. Names are unique
// case-insensitively; get-or-create is written so two concurrent creators of
// the same name both end up with the surviving row.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::models::Category;
use super::DatabaseManager;

impl DatabaseManager {
    /// Get all categories
    pub fn get_all_categories(&self) -> Result<Vec<Category>> {
        self.with_connection(get_all_categories_impl)
    }

    /// Get a category by exact (case-insensitive) name
    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.with_connection(|conn| get_category_by_name_impl(conn, name))
    }

    /// Get or create a category by name
    pub fn get_or_create_category(&self, name: &str) -> Result<Category> {
        self.with_connection(|conn| get_or_create_category_impl(conn, name))
    }

    /// Categories linked to a segment, ordered by name
    pub fn categories_for_segment(&self, segment_id: &str) -> Result<Vec<Category>> {
        self.with_connection(|conn| categories_for_segment_impl(conn, segment_id))
    }
}

fn get_all_categories_impl(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM categories ORDER BY name ASC"
    ).context("Failed to prepare get_all_categories query")?;

    let categories = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }).context("Failed to query categories")?;

    categories.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect categories")
}

fn get_category_by_name_impl(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM categories WHERE name = ? COLLATE NOCASE"
    ).context("Failed to prepare get_category_by_name query")?;

    let result = stmt.query_row(params![name], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    });

    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to get category by name"),
    }
}

pub(super) fn get_or_create_category_impl(conn: &Connection, name: &str) -> Result<Category> {
    let id = format!("cat_{}", &Uuid::new_v4().to_string().replace('-', "")[..12]);

    // Loser of a concurrent race hits the unique constraint and is ignored;
    // the re-select below returns the winning row either way.
    conn.execute(
        "INSERT OR IGNORE INTO categories (id, name) VALUES (?1, ?2)",
        params![id, name],
    ).context("Failed to insert category")?;

    get_category_by_name_impl(conn, name)?
        .ok_or_else(|| anyhow::anyhow!("Category vanished after get-or-create: {}", name))
}

fn categories_for_segment_impl(conn: &Connection, segment_id: &str) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name FROM categories c
         JOIN segment_categories sc ON sc.category_id = c.id
         WHERE sc.segment_id = ?
         ORDER BY c.name ASC"
    ).context("Failed to prepare categories_for_segment query")?;

    let categories = stmt.query_map(params![segment_id], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }).context("Failed to query segment categories")?;

    categories.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect segment categories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_db() -> (tempfile::TempDir, DatabaseManager) {
        let dir = tempdir().unwrap();
        let db = DatabaseManager::new(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_get_or_create_is_unique_by_name() {
        let (_dir, db) = create_test_db();

        let first = db.get_or_create_category("Party Time").unwrap();
        let second = db.get_or_create_category("Party Time").unwrap();
        assert_eq!(first.id, second.id);

        // Case-insensitive: a differently-cased name maps to the same row
        let third = db.get_or_create_category("party time").unwrap();
        assert_eq!(first.id, third.id);
        assert_eq!(third.name, "Party Time");

        assert_eq!(db.get_all_categories().unwrap().len(), 1);
    }

    #[test]
    fn test_distinct_names_create_distinct_rows() {
        let (_dir, db) = create_test_db();

        db.get_or_create_category("Hello").unwrap();
        db.get_or_create_category("Goodbye").unwrap();

        let all = db.get_all_categories().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Goodbye");
    }
}
