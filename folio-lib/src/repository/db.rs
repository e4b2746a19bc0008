use std::{fs::create_dir_all, path::Path, sync::Arc};

use agdb::{DbAny, DbValue, QueryBuilder};
use derive_more::Deref;
use parking_lot::RwLock;

use crate::repository::{Error, Result};

/// Alias of the node whose properties hold every storage record.
const STORAGE: &str = "local_storage";

/// Key-value record storage on top of an embedded database.
///
/// Every record is a property of the single `local_storage` node, keyed by the
/// record name and holding the record's JSON text.
#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(path_str)?)),
        };

        db.init()?;

        Ok(db)
    }

    fn init(&mut self) -> Result<()> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count == 0 {
            self.db
                .write()
                .exec_mut(QueryBuilder::insert().nodes().aliases([STORAGE]).query())?;
        }

        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let Some(element) = self
            .db
            .read()
            .exec(QueryBuilder::select().ids(STORAGE).query())?
            .elements
            .pop()
        else {
            return Ok(None);
        };

        let key = DbValue::from(key);
        Ok(element
            .values
            .into_iter()
            .find(|kv| kv.key == key)
            .map(|kv| String::try_from(kv.value))
            .transpose()?)
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        self.db.write().exec_mut(
            QueryBuilder::insert()
                .values([[(key, value).into()]])
                .ids(STORAGE)
                .query(),
        )?;

        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        if self.get_item(key)?.is_none() {
            return Ok(());
        }

        self.db
            .write()
            .exec_mut(QueryBuilder::remove().values(key).ids(STORAGE).query())?;

        Ok(())
    }

    /// Create a memory backed database for use in tests
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        let mut db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("test").unwrap())),
        };

        db.init().unwrap();

        db
    }
}

#[cfg(test)]
mod test {
    use super::Db;

    #[test]
    fn test_missing_item() {
        let db = Db::in_memory();

        assert_eq!(db.get_item("portfolio").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let db = Db::in_memory();

        db.set_item("portfolio", "{}".into()).unwrap();
        db.set_item("currentPortfolioIndex", "0".into()).unwrap();
        assert_eq!(db.get_item("portfolio").unwrap().as_deref(), Some("{}"));

        db.set_item("portfolio", "[]".into()).unwrap();
        assert_eq!(db.get_item("portfolio").unwrap().as_deref(), Some("[]"));

        db.remove_item("portfolio").unwrap();
        assert_eq!(db.get_item("portfolio").unwrap(), None);
        assert_eq!(
            db.get_item("currentPortfolioIndex").unwrap().as_deref(),
            Some("0")
        );

        // Removing an absent record is a no-op
        db.remove_item("portfolio").unwrap();
    }

    #[test]
    fn test_file_backed_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("data.db");

        {
            let db = Db::open(&path).unwrap();
            db.set_item("portfolios", "[]".into()).unwrap();
        }

        let db = Db::open(&path).unwrap();
        assert_eq!(db.get_item("portfolios").unwrap().as_deref(), Some("[]"));
    }
}
