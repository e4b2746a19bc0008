//! The in-memory copy of the portfolio the user is working on.
//!
//! A [`Store`] is shared by every view of a session. Reads never touch storage; writes
//! go through the [`Repository`] first and only then replace the shared copy, so a
//! failed save leaves the session as it was.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::{
    portfolio::{PdfData, Portfolio},
    repository::{self, DocumentId, Repository},
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The portfolio session has been closed")]
    SessionClosed,
    #[error(transparent)]
    Repository(#[from] repository::Error),
}

#[derive(Debug, Default)]
struct Session {
    portfolio: Option<Portfolio>,
    /// The collection entry the portfolio was loaded from or last saved to
    document: Option<DocumentId>,
}

#[derive(Debug, Clone)]
pub struct Store {
    repo: Repository,
    session: Arc<RwLock<Option<Session>>>,
}

impl Store {
    /// Open a session seeded from the repository's current portfolio.
    pub fn open(repo: Repository) -> Result<Self> {
        let portfolio = repo.load_current()?;
        let document = repo.current_document()?;

        debug!(
            "Opened session on {}",
            document.map_or_else(|| "a new portfolio".to_string(), |id| id.to_string())
        );

        Ok(Self {
            repo,
            session: Arc::new(RwLock::new(Some(Session {
                portfolio: Some(portfolio),
                document,
            }))),
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn is_open(&self) -> bool {
        self.session.read().is_some()
    }

    /// Snapshot of the portfolio held in memory, if any.
    pub fn current(&self) -> Option<Portfolio> {
        self.session
            .read()
            .as_ref()
            .and_then(|s| s.portfolio.clone())
    }

    pub fn document(&self) -> Option<DocumentId> {
        self.session.read().as_ref().and_then(|s| s.document)
    }

    /// Swap the in-memory portfolio without persisting it.
    pub fn replace(&self, portfolio: Portfolio) -> Result<()> {
        self.with_session(|session| {
            session.portfolio = Some(portfolio);
            Ok(())
        })
    }

    /// Persist a portfolio and make it the in-memory one. A session without a document
    /// creates one, otherwise its document is overwritten.
    pub fn update(&self, portfolio: Portfolio) -> Result<DocumentId> {
        self.with_session(|session| {
            let id = self.repo.save(session.document, &portfolio)?;
            session.portfolio = Some(portfolio);
            session.document = Some(id);
            Ok(id)
        })
    }

    /// Attach a generated PDF to the current portfolio, keeping every other field, and
    /// persist the result.
    pub fn attach_pdf_artifact(&self, pdf_base64_data: String) -> Result<DocumentId> {
        self.with_session(|session| {
            let mut portfolio = session.portfolio.clone().unwrap_or_default();
            portfolio.pdf_data = Some(PdfData { pdf_base64_data });

            let id = self.repo.save(session.document, &portfolio)?;
            session.portfolio = Some(portfolio);
            session.document = Some(id);

            debug!("Attached PDF to portfolio {id}");

            Ok(id)
        })
    }

    /// Load the collection entry at `index` into the session.
    pub fn select(&self, index: usize) -> Result<Portfolio> {
        self.with_session(|session| {
            let document = self.repo.select(index)?;
            session.document = Some(document.id);
            session.portfolio = Some(document.portfolio.clone());
            Ok(document.portfolio)
        })
    }

    /// Start a new portfolio. The next [`Store::update`] creates a collection entry.
    pub fn begin_create(&self) -> Result<Portfolio> {
        self.with_session(|session| {
            let portfolio = self.repo.begin_create()?;
            session.document = None;
            session.portfolio = Some(portfolio.clone());
            Ok(portfolio)
        })
    }

    /// Delete the collection entry at `index`. The session is left on an empty portfolio
    /// that the next [`Store::update`] saves as a new entry.
    pub fn delete(&self, index: usize) -> Result<()> {
        self.with_session(|session| {
            self.repo.delete(index)?;
            session.portfolio = Some(Portfolio::empty());
            session.document = None;
            Ok(())
        })
    }

    /// Drop unsaved in-memory changes and reload the stored current portfolio.
    pub fn revert(&self) -> Result<Portfolio> {
        self.with_session(|session| {
            let portfolio = self.repo.load_current()?;
            session.document = self.repo.current_document()?;
            session.portfolio = Some(portfolio.clone());
            Ok(portfolio)
        })
    }

    /// End the session. Every clone of this store sees it closed.
    pub fn close(&self) {
        if self.session.write().take().is_some() {
            debug!("Closed portfolio session");
        }
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut guard = self.session.write();
        let session = guard.as_mut().ok_or(Error::SessionClosed)?;
        f(session)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn named(name: &str) -> Portfolio {
        let mut portfolio = Portfolio::empty();
        portfolio.about.name = name.to_string();
        portfolio
    }

    #[test]
    fn test_open_empty() {
        let store = Store::open(Repository::mock()).unwrap();

        assert_eq!(store.current(), Some(Portfolio::empty()));
        assert_eq!(store.document(), None);
    }

    #[test]
    fn test_open_seeds_from_repository() {
        let repo = Repository::mock();
        let id = repo.save(None, &named("Ada")).unwrap();

        let store = Store::open(repo).unwrap();

        assert_eq!(store.current().unwrap().about.name, "Ada");
        assert_eq!(store.document(), Some(id));
    }

    #[test]
    fn test_replace_is_not_persisted() {
        let repo = Repository::mock();
        let store = Store::open(repo.clone()).unwrap();

        store.replace(named("Draft")).unwrap();

        assert_eq!(store.current().unwrap().about.name, "Draft");
        assert_eq!(repo.load_current().unwrap(), Portfolio::empty());
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_update_creates_then_overwrites() {
        let repo = Repository::mock();
        let store = Store::open(repo.clone()).unwrap();

        let id = store.update(named("Ada")).unwrap();
        assert_eq!(store.document(), Some(id));

        let again = store.update(named("Ada Lovelace")).unwrap();
        assert_eq!(again, id);

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].about.name, "Ada Lovelace");
        assert_eq!(repo.load_current().unwrap().about.name, "Ada Lovelace");
    }

    #[test]
    fn test_update_follows_identity_after_reorder() {
        let repo = Repository::mock();
        repo.save(None, &named("First")).unwrap();
        let second = repo.save(None, &named("Second")).unwrap();

        let store = Store::open(repo.clone()).unwrap();
        assert_eq!(store.document(), Some(second));

        // Removing an earlier entry shifts the edited one down a position
        repo.delete(0).unwrap();
        store.update(named("Second, edited")).unwrap();

        let names: Vec<_> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.about.name)
            .collect();
        assert_eq!(names, vec!["Second, edited"]);
    }

    #[test]
    fn test_attach_pdf_keeps_other_fields() {
        let repo = Repository::mock();
        let store = Store::open(repo.clone()).unwrap();
        let mut portfolio = named("Ada");
        portfolio.skills.push("Rust".into());
        store.update(portfolio).unwrap();

        store.attach_pdf_artifact("JVBERi0=".into()).unwrap();

        let current = store.current().unwrap();
        assert_eq!(current.about.name, "Ada");
        assert_eq!(current.skills, vec!["Rust"]);
        assert_eq!(current.artifact(), Some("JVBERi0="));
        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.load_current().unwrap().artifact(), Some("JVBERi0="));
    }

    #[test]
    fn test_select_and_begin_create() {
        let repo = Repository::mock();
        let first = repo.save(None, &named("First")).unwrap();
        repo.save(None, &named("Second")).unwrap();
        let store = Store::open(repo.clone()).unwrap();

        assert_eq!(store.select(0).unwrap().about.name, "First");
        assert_eq!(store.document(), Some(first));

        store.begin_create().unwrap();
        assert_eq!(store.document(), None);
        assert_eq!(store.current(), Some(Portfolio::empty()));

        store.update(named("Third")).unwrap();
        assert_eq!(repo.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_revert_discards_unsaved_changes() {
        let repo = Repository::mock();
        repo.save(None, &named("Saved")).unwrap();
        let store = Store::open(repo).unwrap();

        store.replace(named("Unsaved")).unwrap();
        let reverted = store.revert().unwrap();

        assert_eq!(reverted.about.name, "Saved");
        assert_eq!(store.current().unwrap().about.name, "Saved");
    }

    #[test]
    fn test_update_after_delete_creates() {
        let repo = Repository::mock();
        repo.save(None, &named("Doomed")).unwrap();
        let store = Store::open(repo.clone()).unwrap();

        store.delete(0).unwrap();
        assert_eq!(store.document(), None);
        assert_eq!(store.current(), Some(Portfolio::empty()));

        let id = store.update(named("Fresh")).unwrap();

        let documents = repo.documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, id);
        assert_eq!(documents[0].about.name, "Fresh");
    }

    #[test]
    fn test_revert_forgets_deleted_document() {
        let repo = Repository::mock();
        repo.save(None, &named("Doomed")).unwrap();
        let store = Store::open(repo.clone()).unwrap();

        // Deleted behind the session's back
        repo.delete(0).unwrap();
        store.revert().unwrap();

        assert_eq!(store.document(), None);
        store.update(named("Fresh")).unwrap();
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_closed_session_rejects_writes() {
        let store = Store::open(Repository::mock()).unwrap();
        let shared = store.clone();

        store.close();

        assert!(!shared.is_open());
        assert_eq!(shared.current(), None);
        assert!(matches!(
            shared.replace(Portfolio::empty()),
            Err(Error::SessionClosed)
        ));
        assert!(matches!(
            shared.update(Portfolio::empty()),
            Err(Error::SessionClosed)
        ));
    }
}
