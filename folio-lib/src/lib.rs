//! Core of the folio portfolio builder: the portfolio model, its local storage, field
//! validation, the shared session store and the form editor.

use thiserror::Error;

pub mod config;
pub mod editor;
pub mod export;
pub mod fields;
pub mod fs;
pub mod portfolio;
pub mod render;
pub mod repository;
pub mod store;
pub mod validation;

pub use editor::Editor;
pub use portfolio::Portfolio;
pub use repository::Repository;
pub use store::Store;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] repository::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error(transparent)]
    Edit(#[from] editor::EditError),
    #[error(transparent)]
    Export(#[from] export::Error),
}
