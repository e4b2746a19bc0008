use std::{fs, path::Path};

use colored::Colorize;
use folio_lib::{
    Error, Store,
    export::{self, encode_data_uri, write_artifact},
};
use sysexits::ExitCode;

pub fn attach(store: &Store, file: &Path) -> Result<ExitCode, Error> {
    let pdf = fs::read(file).map_err(export::Error::from)?;
    let id = store.attach_pdf_artifact(encode_data_uri(&pdf))?;

    println!("{} {} to portfolio {id}", "Attached".green(), file.display());

    Ok(ExitCode::Ok)
}

pub fn save(store: &Store, out: Option<&Path>) -> Result<ExitCode, Error> {
    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => store.repository().cfg().read().export_dir()?,
    };
    let portfolio = store.current().unwrap_or_default();

    let path = write_artifact(&dir, &portfolio)?;

    println!("{} {}", "Wrote".green(), path.display());

    Ok(ExitCode::Ok)
}
