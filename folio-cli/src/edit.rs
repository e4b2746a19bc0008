use clap::Args;
use colored::Colorize;
use folio_lib::{
    Editor, Error, Store,
    editor::{EditError, ListItem, Section, Submission},
    fields::{AboutField, ContactField, ScalarField},
    portfolio::{Experience, Project},
};
use sysexits::ExitCode;

#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    tagline: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Add a skill, may be repeated
    #[arg(long = "skill")]
    skills: Vec<String>,
    /// Remove the skill at a zero-based position
    #[arg(long = "remove-skill")]
    removed_skills: Vec<usize>,
    /// Add a project as "title|description|link"
    #[arg(long = "project", value_parser = parse_project)]
    projects: Vec<Project>,
    /// Add an experience as "company|duration|role|description"
    #[arg(long = "experience", value_parser = parse_experience)]
    experiences: Vec<Experience>,
    /// Set a social link as PLATFORM=URL, adding the platform if needed
    #[arg(long = "social", value_parser = parse_pair)]
    socials: Vec<(String, String)>,
    /// Rename a social platform as OLD=NEW
    #[arg(long = "rename-social", value_parser = parse_pair)]
    renamed_socials: Vec<(String, String)>,
    /// Remove a social platform
    #[arg(long = "remove-social")]
    removed_socials: Vec<String>,
}

pub fn create(store: &Store, args: &EditArgs) -> Result<ExitCode, Error> {
    let editor = Editor::create(store.clone())?;

    submit(editor, args)
}

pub fn edit(store: &Store, index: Option<usize>, args: &EditArgs) -> Result<ExitCode, Error> {
    if let Some(index) = index {
        store.select(index)?;
    }
    let editor = Editor::edit(store.clone())?;

    submit(editor, args)
}

fn submit(mut editor: Editor, args: &EditArgs) -> Result<ExitCode, Error> {
    apply(&mut editor, args)?;

    match editor.submit()? {
        Submission::Saved(id) => {
            println!("{} portfolio {id}", "Saved".green());
            Ok(ExitCode::Ok)
        }
        Submission::Invalid(errors) => {
            eprintln!("{}", "The portfolio was not saved:".red().bold());
            for (field, message) in errors.iter() {
                eprintln!("  {}: {message}", field.yellow());
            }
            Ok(ExitCode::DataErr)
        }
    }
}

fn apply(editor: &mut Editor, args: &EditArgs) -> Result<(), EditError> {
    let scalars: [(ScalarField, &Option<String>); 5] = [
        (AboutField::Name.into(), &args.name),
        (AboutField::Tagline.into(), &args.tagline),
        (AboutField::Description.into(), &args.description),
        (ContactField::Email.into(), &args.email),
        (ContactField::Phone.into(), &args.phone),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            editor.set_field(field, value)?;
        }
    }

    // Highest position first so earlier removals don't shift later ones
    let mut removed_skills = args.removed_skills.clone();
    removed_skills.sort_unstable_by(|a, b| b.cmp(a));
    removed_skills.dedup();
    for index in removed_skills {
        editor.remove_list_item(Section::Skills, index)?;
    }

    for skill in &args.skills {
        editor.add_list_item(ListItem::Skill(skill.clone()))?;
    }
    for project in &args.projects {
        editor.add_list_item(ListItem::Project(project.clone()))?;
    }
    for experience in &args.experiences {
        editor.add_list_item(ListItem::Experience(experience.clone()))?;
    }

    for (from, to) in &args.renamed_socials {
        editor.rename_platform(from, to)?;
    }
    for platform in &args.removed_socials {
        editor.remove_social_link(platform)?;
    }
    for (platform, url) in &args.socials {
        if !editor.draft().contact.socials.contains(platform) {
            let placeholder = editor.add_social_link()?;
            editor.rename_platform(&placeholder, platform)?;
        }
        editor.set_social_link(platform, url)?;
    }

    Ok(())
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))
}

fn split_fields<const N: usize>(s: &str, format: &str) -> Result<[String; N], String> {
    let parts: Vec<String> = s.splitn(N, '|').map(|p| p.trim().to_string()).collect();

    parts
        .try_into()
        .map_err(|_| format!("expected \"{format}\", got '{s}'"))
}

fn parse_project(s: &str) -> Result<Project, String> {
    let [title, description, link] = split_fields(s, "title|description|link")?;

    Ok(Project {
        title,
        description,
        link,
    })
}

fn parse_experience(s: &str) -> Result<Experience, String> {
    let [company_name, job_duration, job_role, job_description] =
        split_fields(s, "company|duration|role|description")?;

    Ok(Experience {
        company_name,
        job_duration,
        job_role,
        job_description,
        ..Default::default()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("GitHub = https://github.com/ada"),
            Ok(("GitHub".into(), "https://github.com/ada".into()))
        );
        assert!(parse_pair("GitHub").is_err());
    }

    #[test]
    fn test_parse_project() {
        let project = parse_project("Engine|Analytical|https://x.com").unwrap();

        assert_eq!(project.title, "Engine");
        assert_eq!(project.link, "https://x.com");
        assert!(parse_project("Engine|Analytical").is_err());
    }

    #[test]
    fn test_parse_experience_keeps_pipes_in_description() {
        let experience = parse_experience("Acme|2 years|Engineer|Built a|b tree").unwrap();

        assert_eq!(experience.company_name, "Acme");
        assert_eq!(experience.job_role, "Engineer");
        assert_eq!(experience.job_description, "Built a|b tree");
    }
}
