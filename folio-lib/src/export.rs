//! Exported PDF artifacts.
//!
//! An artifact travels as a `data:application/pdf;base64,` URI, which is what gets
//! attached to a portfolio. [`write_artifact`] turns an attached artifact back into a
//! file on disk.

use std::{
    fs::{create_dir_all, write},
    io,
    path::{Path, PathBuf},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use heck::ToSnakeCase;
use thiserror::Error;
use tracing::debug;

use crate::{
    portfolio::Portfolio,
    repository::DocumentId,
    store::{self, Store},
};

const DATA_URI_PREFIX: &str = "data:application/pdf;base64,";
const DEFAULT_FILE_STEM: &str = "portfolio";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Artifact is not a data URI")]
    InvalidDataUri,
    #[error("Artifact is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Failed to write artifact: {0}")]
    Io(#[from] io::Error),
    #[error("The portfolio has no exported PDF attached")]
    NoArtifact,
    #[error("PDF export failed: {0}")]
    Exporter(String),
    #[error(transparent)]
    Store(#[from] store::Error),
}

/// Produces the bytes of a PDF document for a portfolio.
pub trait PdfExporter {
    fn export(&self, portfolio: &Portfolio) -> Result<Vec<u8>>;
}

pub fn encode_data_uri(pdf: &[u8]) -> String {
    format!("{DATA_URI_PREFIX}{}", STANDARD.encode(pdf))
}

/// Decode the payload following the first comma of a data URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (_, payload) = uri.split_once(',').ok_or(Error::InvalidDataUri)?;

    Ok(STANDARD.decode(payload.trim())?)
}

/// Export the store's current portfolio and attach the result to it.
pub fn export_to_store(exporter: &impl PdfExporter, store: &Store) -> Result<DocumentId> {
    let portfolio = store.current().unwrap_or_default();
    let pdf = exporter.export(&portfolio)?;

    Ok(store.attach_pdf_artifact(encode_data_uri(&pdf))?)
}

/// Write the attached artifact to `dir`, named after the portfolio owner.
pub fn write_artifact(dir: &Path, portfolio: &Portfolio) -> Result<PathBuf> {
    let artifact = portfolio.artifact().ok_or(Error::NoArtifact)?;
    let pdf = decode_data_uri(artifact)?;

    let stem = portfolio.about.name.to_snake_case();
    let stem = if stem.is_empty() {
        DEFAULT_FILE_STEM
    } else {
        stem.as_str()
    };
    let path = dir.join(format!("{stem}.pdf"));

    create_dir_all(dir)?;
    write(&path, pdf)?;

    debug!("Wrote PDF artifact to {}", path.display());

    Ok(path)
}
