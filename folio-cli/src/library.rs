use colored::Colorize;
use folio_lib::{
    Error, Store,
    render::{PlainTextRenderer, Renderer},
};
use sysexits::ExitCode;

pub fn list(store: &Store) -> Result<ExitCode, Error> {
    let repo = store.repository();
    let current = repo.current_index()?;
    let documents = repo.documents()?;

    if documents.is_empty() {
        println!("No saved portfolios, create one with `folio create`");
    }

    for (index, document) in documents.iter().enumerate() {
        let marker = if current == Some(index) { "*" } else { " " };
        let name = if document.about.name.is_empty() {
            "(unnamed)".italic()
        } else {
            document.about.name.bold()
        };
        println!(
            "{marker} {index:>3}  {name}  {}",
            document.id.to_string().dimmed()
        );
    }

    Ok(ExitCode::Ok)
}

pub fn show(store: &Store, index: Option<usize>) -> Result<ExitCode, Error> {
    let portfolio = match index {
        Some(index) => store.select(index)?,
        None => store.current().unwrap_or_default(),
    };

    print!("{}", PlainTextRenderer.render(&portfolio));

    Ok(ExitCode::Ok)
}

pub fn delete(store: &Store, index: usize) -> Result<ExitCode, Error> {
    store.delete(index)?;

    println!("{} portfolio {index}", "Deleted".green());

    Ok(ExitCode::Ok)
}
