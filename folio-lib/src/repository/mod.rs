use std::{io, mem, path::PathBuf, sync::Arc};

use derive_more::Display;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::{self, Cfg, CoreConfig},
    portfolio::Portfolio,
    repository::db::Db,
};

mod db;
mod document;

pub use document::{Document, DocumentId};

/// The portfolio currently being viewed or edited
const CURRENT_KEY: &str = "portfolio";
/// Every saved portfolio, in creation order
const COLLECTION_KEY: &str = "portfolios";
/// Position of the current portfolio within the collection
const INDEX_KEY: &str = "currentPortfolioIndex";
/// The id handed to the next created portfolio
const NEXT_UID_KEY: &str = "next_uid";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal database error {0}")]
    Internal(#[from] agdb::DbError),
    #[error("Failed to encode portfolio data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
    #[error("Failed to prepare storage: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error("No portfolio at index {index}, the collection holds {len}")]
    NoSuchIndex { index: usize, len: usize },
    #[error("Portfolio {0} no longer exists")]
    NoSuchDocument(DocumentId),
}

/// Persisted state that could not be read and was reset instead.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StorageWarning {
    #[display("the current portfolio was unreadable and has been reset")]
    CorruptCurrent,
    #[display("the saved portfolios were unreadable and have been moved to '{backup_key}'")]
    CorruptCollection { backup_key: String },
    #[display("the current portfolio marker was unreadable and has been cleared")]
    CorruptIndex,
}

/// Central access point for all persistent data.
///
/// The [`Repository`] keeps the collection of saved portfolios, the standalone
/// "current" portfolio record and the marker telling which collection entry
/// that record belongs to.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
    cfg: Cfg,
    warnings: Arc<Mutex<Vec<StorageWarning>>>,
}

impl Repository {
    /// Open the repository described by the user's configuration file.
    pub fn new() -> Result<Self> {
        Self::with_config(CoreConfig::load()?)
    }

    pub fn with_config(cfg: CoreConfig) -> Result<Self> {
        let db = Db::open(&cfg.storage_path()?)?;

        Ok(Self {
            db,
            cfg: Arc::new(RwLock::new(cfg)),
            warnings: Arc::default(),
        })
    }

    pub fn cfg(&self) -> Cfg {
        self.cfg.clone()
    }

    /// The current portfolio, or an empty one if none has been stored.
    pub fn load_current(&self) -> Result<Portfolio> {
        let Some(json) = self.db.get_item(CURRENT_KEY)? else {
            return Ok(Portfolio::empty());
        };

        match serde_json::from_str(&json) {
            Ok(portfolio) => Ok(portfolio),
            Err(err) => {
                warn!("Resetting unreadable current portfolio: {err}");
                self.push_warning(StorageWarning::CorruptCurrent);
                self.reset()
            }
        }
    }

    /// Store a portfolio as the current one.
    ///
    /// Whether this creates or overwrites a collection entry is decided solely by the
    /// current-index marker: with a marker the entry at that position is overwritten,
    /// without one the portfolio is appended and the marker moved to it. Callers that
    /// know which document they are editing should prefer [`Repository::save`].
    pub fn save_current(&self, portfolio: &Portfolio) -> Result<()> {
        let mut documents = self.documents()?;

        let index = match self.current_index()? {
            Some(index) => match documents.get_mut(index) {
                Some(document) => {
                    document.portfolio = portfolio.clone();
                    index
                }
                None => {
                    warn!(
                        "Current index {index} is past the end of {} portfolios, appending instead",
                        documents.len()
                    );
                    self.append(&mut documents, portfolio)?.0
                }
            },
            None => self.append(&mut documents, portfolio)?.0,
        };

        self.write(COLLECTION_KEY, &documents)?;
        self.write(INDEX_KEY, &index)?;
        self.write(CURRENT_KEY, portfolio)?;

        debug!("Saved current portfolio at index {index}");

        Ok(())
    }

    /// Store a portfolio under an explicit identity: `None` creates a new document,
    /// `Some(id)` overwrites the document carrying `id`. The saved portfolio becomes
    /// the current one.
    pub fn save(&self, target: Option<DocumentId>, portfolio: &Portfolio) -> Result<DocumentId> {
        let mut documents = self.documents()?;

        let (index, id) = match target {
            None => self.append(&mut documents, portfolio)?,
            Some(id) => {
                let (index, document) = documents
                    .iter_mut()
                    .enumerate()
                    .find(|(_, d)| d.id == id)
                    .ok_or(Error::NoSuchDocument(id))?;
                document.portfolio = portfolio.clone();
                (index, id)
            }
        };

        self.write(COLLECTION_KEY, &documents)?;
        self.write(INDEX_KEY, &index)?;
        self.write(CURRENT_KEY, portfolio)?;

        debug!("Saved portfolio {id} at index {index}");

        Ok(id)
    }

    /// Every saved portfolio, in collection order.
    pub fn list_all(&self) -> Result<Vec<Portfolio>> {
        Ok(self
            .documents()?
            .into_iter()
            .map(|d| d.portfolio)
            .collect())
    }

    pub fn documents(&self) -> Result<Vec<Document>> {
        let Some(json) = self.db.get_item(COLLECTION_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&json) {
            Ok(documents) => Ok(documents),
            Err(err) => {
                let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
                let backup_key = format!("{COLLECTION_KEY}.corrupt-{timestamp}");
                warn!("Moving unreadable portfolio collection to '{backup_key}': {err}");

                self.db.set_item(&backup_key, json)?;
                self.db.remove_item(COLLECTION_KEY)?;
                // The marker pointed into the collection that is now gone
                self.db.remove_item(INDEX_KEY)?;

                self.push_warning(StorageWarning::CorruptCollection { backup_key });
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the current record with an empty portfolio. The collection and the
    /// current-index marker are left alone.
    pub fn reset(&self) -> Result<Portfolio> {
        let portfolio = Portfolio::empty();
        self.write(CURRENT_KEY, &portfolio)?;

        debug!("Reset current portfolio");

        Ok(portfolio)
    }

    /// Remove the collection entry at `index` and forget the current portfolio.
    pub fn delete(&self, index: usize) -> Result<()> {
        let mut documents = self.documents()?;
        if index >= documents.len() {
            return Err(Error::NoSuchIndex {
                index,
                len: documents.len(),
            });
        }

        let removed = documents.remove(index);

        self.write(COLLECTION_KEY, &documents)?;
        self.db.remove_item(INDEX_KEY)?;
        self.db.remove_item(CURRENT_KEY)?;

        debug!("Deleted portfolio {} at index {index}", removed.id);

        Ok(())
    }

    /// Make the collection entry at `index` the current portfolio, for viewing or editing.
    pub fn select(&self, index: usize) -> Result<Document> {
        let documents = self.documents()?;
        let document = documents
            .get(index)
            .cloned()
            .ok_or(Error::NoSuchIndex {
                index,
                len: documents.len(),
            })?;

        self.write(INDEX_KEY, &index)?;
        self.write(CURRENT_KEY, &document.portfolio)?;

        debug!("Selected portfolio {} at index {index}", document.id);

        Ok(document)
    }

    /// Forget the current portfolio so the next [`Repository::save_current`] creates a new
    /// entry.
    pub fn begin_create(&self) -> Result<Portfolio> {
        self.db.remove_item(CURRENT_KEY)?;
        self.db.remove_item(INDEX_KEY)?;

        Ok(Portfolio::empty())
    }

    pub fn current_index(&self) -> Result<Option<usize>> {
        let Some(json) = self.db.get_item(INDEX_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(json.trim()) {
            Ok(index) => Ok(Some(index)),
            Err(err) => {
                warn!("Clearing unreadable current index {json:?}: {err}");
                self.db.remove_item(INDEX_KEY)?;
                self.push_warning(StorageWarning::CorruptIndex);
                Ok(None)
            }
        }
    }

    /// Identity of the collection entry the current-index marker points at.
    pub fn current_document(&self) -> Result<Option<DocumentId>> {
        let Some(index) = self.current_index()? else {
            return Ok(None);
        };

        Ok(self.documents()?.get(index).map(|d| d.id))
    }

    /// Drain the warnings raised while recovering from unreadable storage.
    pub fn take_warnings(&self) -> Vec<StorageWarning> {
        mem::take(&mut *self.warnings.lock())
    }

    fn push_warning(&self, warning: StorageWarning) {
        self.warnings.lock().push(warning);
    }

    fn append(
        &self,
        documents: &mut Vec<Document>,
        portfolio: &Portfolio,
    ) -> Result<(usize, DocumentId)> {
        let id = self.allocate_id(documents)?;
        documents.push(Document {
            id,
            portfolio: portfolio.clone(),
        });

        Ok((documents.len().saturating_sub(1), id))
    }

    fn allocate_id(&self, documents: &[Document]) -> Result<DocumentId> {
        let stored = self
            .db
            .get_item(NEXT_UID_KEY)?
            .and_then(|json| serde_json::from_str::<DocumentId>(&json).ok());
        let floor = documents.iter().map(|d| d.id.next()).max();

        let id = stored
            .into_iter()
            .chain(floor)
            .max()
            .unwrap_or(DocumentId::from(0));
        self.write(NEXT_UID_KEY, &id.next())?;

        Ok(id)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.db.set_item(key, serde_json::to_string(value)?)
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] with an in-memory database and a default
    /// configuration.
    pub(crate) fn mock() -> Self {
        Self {
            db: Db::in_memory(),
            cfg: Arc::new(RwLock::new(CoreConfig::default())),
            warnings: Arc::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn read_raw<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.db
            .get_item(key)
            .unwrap()
            .map(|json| serde_json::from_str(&json).unwrap())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::portfolio::{Experience, Project};

    fn named(name: &str) -> Portfolio {
        let mut portfolio = Portfolio::empty();
        portfolio.about.name = name.to_string();
        portfolio
    }

    #[test]
    fn test_load_current_defaults_to_empty() {
        let repo = Repository::mock();

        assert_eq!(repo.load_current().unwrap(), Portfolio::empty());
        assert!(repo.list_all().unwrap().is_empty());
        assert_eq!(repo.current_index().unwrap(), None);
    }

    #[test]
    fn test_save_current_round_trip() {
        let repo = Repository::mock();
        let mut portfolio = named("Ada");
        portfolio.skills = vec!["Rust".into(), "Rust".into(), "Math".into()];
        portfolio.projects.push(Project {
            title: "Engine".into(),
            description: "Analytical".into(),
            link: "https://example.com".into(),
        });
        portfolio.experiences.push(Experience {
            company_name: "Babbage & Co".into(),
            job_duration: "1842-1843".into(),
            job_role: "Programmer".into(),
            job_description: "Notes".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(1842, 1, 1),
            end_date: None,
        });
        portfolio
            .contact
            .socials
            .set("Mastodon", "https://m.example/@ada");

        repo.save_current(&portfolio).unwrap();

        assert_eq!(repo.load_current().unwrap(), portfolio);
    }

    #[test]
    fn test_save_current_creates_then_updates() {
        let repo = Repository::mock();

        repo.save_current(&named("First")).unwrap();
        assert_eq!(repo.current_index().unwrap(), Some(0));

        repo.save_current(&named("First, edited")).unwrap();
        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].about.name, "First, edited");

        repo.begin_create().unwrap();
        repo.save_current(&named("Second")).unwrap();
        assert_eq!(repo.current_index().unwrap(), Some(1));
        assert_eq!(repo.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_save_current_follows_marker_not_identity() {
        let repo = Repository::mock();
        repo.save_current(&named("A")).unwrap();
        repo.begin_create().unwrap();
        repo.save_current(&named("B")).unwrap();

        // Pointing the marker elsewhere redirects the next index-based save
        repo.select(0).unwrap();
        repo.save_current(&named("B, edited")).unwrap();

        let names: Vec<_> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.about.name)
            .collect();
        assert_eq!(names, vec!["B, edited", "B"]);
    }

    #[test]
    fn test_save_current_with_dangling_marker_appends() {
        let repo = Repository::mock();
        repo.write(INDEX_KEY, &5usize).unwrap();

        repo.save_current(&named("Ada")).unwrap();

        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.current_index().unwrap(), Some(0));
    }

    #[test]
    fn test_save_by_id() {
        let repo = Repository::mock();
        let a = repo.save(None, &named("A")).unwrap();
        let b = repo.save(None, &named("B")).unwrap();
        assert_ne!(a, b);

        repo.delete(0).unwrap();
        let saved = repo.save(Some(b), &named("B, edited")).unwrap();

        assert_eq!(saved, b);
        let documents = repo.documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, b);
        assert_eq!(documents[0].about.name, "B, edited");
        assert_eq!(repo.current_document().unwrap(), Some(b));
        assert_eq!(repo.load_current().unwrap().about.name, "B, edited");
    }

    #[test]
    fn test_save_deleted_document() {
        let repo = Repository::mock();
        let id = repo.save(None, &named("A")).unwrap();
        repo.delete(0).unwrap();

        assert!(matches!(
            repo.save(Some(id), &named("A")),
            Err(Error::NoSuchDocument(missing)) if missing == id
        ));
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let repo = Repository::mock();
        let first = repo.save(None, &named("A")).unwrap();
        repo.delete(0).unwrap();

        let second = repo.save(None, &named("B")).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_delete() {
        let repo = Repository::mock();
        repo.save(None, &named("A")).unwrap();
        let b = repo.save(None, &named("B")).unwrap();

        repo.delete(0).unwrap();

        let documents = repo.documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, b);
        assert_eq!(documents[0].about.name, "B");
        assert_eq!(repo.current_index().unwrap(), None);
        assert_eq!(repo.read_raw::<Portfolio>(CURRENT_KEY), None);
        assert_eq!(repo.load_current().unwrap(), Portfolio::empty());
    }

    #[test]
    fn test_delete_out_of_range() {
        let repo = Repository::mock();
        repo.save(None, &named("A")).unwrap();

        assert!(matches!(
            repo.delete(1),
            Err(Error::NoSuchIndex { index: 1, len: 1 })
        ));
        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.current_index().unwrap(), Some(0));
    }

    #[test]
    fn test_reset_keeps_collection_and_marker() {
        let repo = Repository::mock();
        repo.save_current(&named("Ada")).unwrap();

        let reset = repo.reset().unwrap();

        assert_eq!(reset, Portfolio::empty());
        assert_eq!(repo.load_current().unwrap(), Portfolio::empty());
        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.current_index().unwrap(), Some(0));
    }

    #[test]
    fn test_select() {
        let repo = Repository::mock();
        repo.save(None, &named("A")).unwrap();
        let b = repo.save(None, &named("B")).unwrap();
        repo.select(0).unwrap();

        let document = repo.select(1).unwrap();

        assert_eq!(document.id, b);
        assert_eq!(repo.current_index().unwrap(), Some(1));
        assert_eq!(repo.load_current().unwrap().about.name, "B");
        assert!(matches!(repo.select(2), Err(Error::NoSuchIndex { .. })));
    }

    #[test]
    fn test_begin_create() {
        let repo = Repository::mock();
        repo.save_current(&named("Ada")).unwrap();

        let fresh = repo.begin_create().unwrap();

        assert_eq!(fresh, Portfolio::empty());
        assert_eq!(repo.current_index().unwrap(), None);
        assert_eq!(repo.current_document().unwrap(), None);
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_current_fails_closed() {
        let repo = Repository::mock();
        repo.db.set_item(CURRENT_KEY, "{\"about\":".into()).unwrap();

        assert_eq!(repo.load_current().unwrap(), Portfolio::empty());
        assert_eq!(repo.take_warnings(), vec![StorageWarning::CorruptCurrent]);
        assert!(repo.take_warnings().is_empty());
        // The reset was persisted
        assert_eq!(
            repo.read_raw::<Portfolio>(CURRENT_KEY),
            Some(Portfolio::empty())
        );
    }

    #[test]
    fn test_corrupt_collection_is_backed_up() {
        let repo = Repository::mock();
        repo.db.set_item(COLLECTION_KEY, "not json".into()).unwrap();
        repo.write(INDEX_KEY, &0usize).unwrap();

        assert!(repo.list_all().unwrap().is_empty());

        let warnings = repo.take_warnings();
        let [StorageWarning::CorruptCollection { backup_key }] = warnings.as_slice() else {
            panic!("expected a single collection warning, got {warnings:?}");
        };
        assert_eq!(
            repo.db.get_item(backup_key).unwrap().as_deref(),
            Some("not json")
        );
        assert_eq!(repo.current_index().unwrap(), None);

        // Saving afterwards starts a fresh collection
        repo.save_current(&named("Ada")).unwrap();
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_index_is_cleared() {
        let repo = Repository::mock();
        repo.db.set_item(INDEX_KEY, "first".into()).unwrap();

        assert_eq!(repo.current_index().unwrap(), None);
        assert_eq!(repo.take_warnings(), vec![StorageWarning::CorruptIndex]);
    }

    #[test]
    fn test_file_backed_repository() {
        let dir = tempfile::tempdir().unwrap();

        {
            let repo = Repository::with_config(CoreConfig::mock(dir.path())).unwrap();
            repo.save_current(&named("Ada")).unwrap();
        }

        let repo = Repository::with_config(CoreConfig::mock(dir.path())).unwrap();
        assert_eq!(repo.load_current().unwrap().about.name, "Ada");
        assert_eq!(repo.current_index().unwrap(), Some(0));
    }
}
