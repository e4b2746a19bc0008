//! Form state for creating or editing one portfolio.
//!
//! An [`Editor`] works on a private draft. Every mutation builds the next draft from a
//! copy of the current one and swaps it in only when the whole change applies, so a
//! rejected change leaves the draft exactly as it was. Nothing reaches storage until
//! [`Editor::submit`] passes validation.

use getset::{CopyGetters, Getters};
use strum::Display;
use thiserror::Error;
use tracing::debug;

use crate::{
    fields::{ExperienceField, ProjectField, ScalarField},
    portfolio::{Experience, Portfolio, Project, SocialsError},
    repository::DocumentId,
    store::{self, Store},
    validation::{self, FieldName, ValidationErrors},
};

pub type Result<T> = std::result::Result<T, EditError>;

/// A change the editor refused. The draft is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Socials(#[from] SocialsError),
    #[error("There is no {section} entry at position {index}, the list holds {len}")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
    #[error("The portfolio has already been submitted")]
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The draft becomes a new collection entry
    Create,
    /// The draft overwrites the entry it was loaded from
    Edit,
}

impl Mode {
    /// Caption of the submit action.
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Create Portfolio",
            Self::Edit => "Save Changes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Loading,
    Editing,
    Validating,
    Submitted(DocumentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Skills,
    Projects,
    Experiences,
}

/// A list entry together with the section it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Skill(String),
    Project(Project),
    Experience(Experience),
}

impl ListItem {
    pub fn section(&self) -> Section {
        match self {
            Self::Skill(_) => Section::Skills,
            Self::Project(_) => Section::Projects,
            Self::Experience(_) => Section::Experiences,
        }
    }
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The draft was saved under this id
    Saved(DocumentId),
    /// Nothing was saved; the errors are also kept on the editor
    Invalid(ValidationErrors),
}

#[derive(Debug, Clone)]
pub enum Message {
    FieldInput(ScalarField, String),
    ProjectInput(usize, ProjectField, String),
    ExperienceInput(usize, ExperienceField, String),
    ItemInput(usize, ListItem),
    AddItemPressed(ListItem),
    RemoveItemPressed(Section, usize),
    SocialInput { platform: String, url: String },
    AddSocialPressed,
    RemoveSocialPressed(String),
    PlatformRenamed { from: String, to: String },
    FieldBlurred(String),
    ClearPressed,
    SubmitPressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// A change was refused and should be shown as a notice
    Rejected(EditError),
    /// Submitting failed validation
    Invalid(ValidationErrors),
    /// The draft was saved, show its preview
    Preview(DocumentId),
}

#[derive(Debug, Getters, CopyGetters)]
pub struct Editor {
    store: Store,
    #[getset(get = "pub")]
    draft: Portfolio,
    #[getset(get_copy = "pub")]
    mode: Mode,
    #[getset(get_copy = "pub")]
    state: State,
    #[getset(get = "pub")]
    errors: ValidationErrors,
}

impl Editor {
    /// Start a new portfolio from an empty draft.
    pub fn create(store: Store) -> store::Result<Self> {
        let draft = store.begin_create()?;

        Ok(Self::load(store, draft, Mode::Create))
    }

    /// Edit the portfolio the store currently holds.
    pub fn edit(store: Store) -> store::Result<Self> {
        let draft = match store.current() {
            Some(portfolio) => portfolio,
            None => store.revert()?,
        };

        Ok(Self::load(store, draft, Mode::Edit))
    }

    fn load(store: Store, draft: Portfolio, mode: Mode) -> Self {
        let mut editor = Self {
            store,
            draft,
            mode,
            state: State::Loading,
            errors: ValidationErrors::default(),
        };
        editor.state = State::Editing;

        debug!("Editor loaded in {mode:?} mode");

        editor
    }

    pub fn update(&mut self, message: Message) -> store::Result<Action> {
        let result = match message {
            Message::FieldInput(field, value) => self.set_field(field, &value),
            Message::ProjectInput(index, field, value) => {
                self.set_project_field(index, field, &value)
            }
            Message::ExperienceInput(index, field, value) => {
                self.set_experience_field(index, field, &value)
            }
            Message::ItemInput(index, item) => self.set_list_item(index, item),
            Message::AddItemPressed(item) => self.add_list_item(item),
            Message::RemoveItemPressed(section, index) => self.remove_list_item(section, index),
            Message::SocialInput { platform, url } => self.set_social_link(&platform, &url),
            Message::AddSocialPressed => self.add_social_link().map(|_| ()),
            Message::RemoveSocialPressed(platform) => self.remove_social_link(&platform),
            Message::PlatformRenamed { from, to } => self.rename_platform(&from, &to),
            Message::FieldBlurred(field) => {
                self.blur(&field);
                Ok(())
            }
            Message::ClearPressed => return self.clear().map(|()| Action::None),
            Message::SubmitPressed => {
                return Ok(match self.submit()? {
                    Submission::Saved(id) => Action::Preview(id),
                    Submission::Invalid(errors) => Action::Invalid(errors),
                });
            }
        };

        Ok(match result {
            Ok(()) => Action::None,
            Err(err) => Action::Rejected(err),
        })
    }

    /// Replace one scalar field of the `about` or `contact` section.
    pub fn set_field(&mut self, field: impl Into<ScalarField>, value: &str) -> Result<()> {
        let field = field.into();
        self.apply(|draft| {
            match field {
                ScalarField::About(field) => field.set(&mut draft.about, value),
                ScalarField::Contact(field) => field.set(&mut draft.contact, value),
            }
            Ok(())
        })
    }

    /// Replace the entry at `index` of the item's section.
    pub fn set_list_item(&mut self, index: usize, item: ListItem) -> Result<()> {
        self.apply(|draft| {
            let section = item.section();
            let len = section_len(draft, section);
            let out_of_range = EditError::IndexOutOfRange {
                section,
                index,
                len,
            };

            match item {
                ListItem::Skill(skill) => {
                    *draft.skills.get_mut(index).ok_or(out_of_range)? = skill;
                }
                ListItem::Project(project) => {
                    *draft.projects.get_mut(index).ok_or(out_of_range)? = project;
                }
                ListItem::Experience(experience) => {
                    *draft.experiences.get_mut(index).ok_or(out_of_range)? = experience;
                }
            }
            Ok(())
        })
    }

    pub fn set_project_field(
        &mut self,
        index: usize,
        field: ProjectField,
        value: &str,
    ) -> Result<()> {
        self.apply(|draft| {
            let len = draft.projects.len();
            let project = draft
                .projects
                .get_mut(index)
                .ok_or(EditError::IndexOutOfRange {
                    section: Section::Projects,
                    index,
                    len,
                })?;
            field.set(project, value);
            Ok(())
        })
    }

    pub fn set_experience_field(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: &str,
    ) -> Result<()> {
        self.apply(|draft| {
            let len = draft.experiences.len();
            let experience = draft
                .experiences
                .get_mut(index)
                .ok_or(EditError::IndexOutOfRange {
                    section: Section::Experiences,
                    index,
                    len,
                })?;
            field.set(experience, value);
            Ok(())
        })
    }

    /// Append an entry to the end of the item's section.
    pub fn add_list_item(&mut self, item: ListItem) -> Result<()> {
        self.apply(|draft| {
            match item {
                ListItem::Skill(skill) => draft.skills.push(skill),
                ListItem::Project(project) => draft.projects.push(project),
                ListItem::Experience(experience) => draft.experiences.push(experience),
            }
            Ok(())
        })
    }

    /// Remove the entry at `index`, shifting later entries down one position.
    pub fn remove_list_item(&mut self, section: Section, index: usize) -> Result<()> {
        self.apply(|draft| {
            let len = section_len(draft, section);
            if index >= len {
                return Err(EditError::IndexOutOfRange {
                    section,
                    index,
                    len,
                });
            }

            match section {
                Section::Skills => retain_except(&mut draft.skills, index),
                Section::Projects => retain_except(&mut draft.projects, index),
                Section::Experiences => retain_except(&mut draft.experiences, index),
            }
            Ok(())
        })
    }

    /// Update the URL of an existing platform.
    pub fn set_social_link(&mut self, platform: &str, url: &str) -> Result<()> {
        self.apply(|draft| {
            if !draft.contact.socials.contains(platform) {
                return Err(SocialsError::Unknown(platform.to_string()).into());
            }
            draft.contact.socials.set(platform, url);
            Ok(())
        })
    }

    /// Add an empty entry under a fresh placeholder platform name and return that name.
    pub fn add_social_link(&mut self) -> Result<String> {
        let mut platform = String::new();
        self.apply(|draft| {
            platform = placeholder_platform(draft);
            draft.contact.socials.set(&platform, "");
            Ok(())
        })?;

        Ok(platform)
    }

    pub fn remove_social_link(&mut self, platform: &str) -> Result<()> {
        self.apply(|draft| {
            draft.contact.socials.remove(platform)?;
            Ok(())
        })
    }

    /// Move a platform's URL to a new name. Fails if the new name is taken or either name
    /// is protected.
    pub fn rename_platform(&mut self, from: &str, to: &str) -> Result<()> {
        self.apply(|draft| Ok(draft.contact.socials.rename(from, to)?))?;

        // Errors are keyed by platform name
        if self.errors.contains_key(&format!("{from}_link")) {
            self.errors.refresh(&self.draft, &FieldName::SocialLink(from.to_string()));
            self.errors.refresh(&self.draft, &FieldName::SocialLink(to.to_string()));
        }

        Ok(())
    }

    /// Throw the draft away and start over from an empty portfolio.
    pub fn clear(&mut self) -> store::Result<()> {
        let draft = self.store.repository().reset()?;
        self.draft = draft;
        self.errors = ValidationErrors::default();
        self.state = State::Editing;

        debug!("Cleared editor draft");

        Ok(())
    }

    /// Re-check a single field, typically when its input loses focus. Names that do not
    /// refer to a form field are ignored.
    pub fn blur(&mut self, field: &str) -> Option<&String> {
        let field: FieldName = field.parse().ok()?;
        self.errors.refresh(&self.draft, &field)
    }

    /// Validate the draft and, if it passes, save it through the store.
    pub fn submit(&mut self) -> store::Result<Submission> {
        if let State::Submitted(id) = self.state {
            return Ok(Submission::Saved(id));
        }

        self.state = State::Validating;
        let errors = validation::validate(&self.draft);

        if !errors.is_empty() {
            debug!("Submit blocked by {} invalid fields", errors.len());
            self.errors = errors.clone();
            self.state = State::Editing;
            return Ok(Submission::Invalid(errors));
        }

        let id = match self.store.update(self.draft.clone()) {
            Ok(id) => id,
            Err(err) => {
                self.state = State::Editing;
                return Err(err);
            }
        };

        self.errors = ValidationErrors::default();
        self.state = State::Submitted(id);

        debug!("Submitted portfolio {id}");

        Ok(Submission::Saved(id))
    }

    /// Leave the editor without saving.
    pub fn discard(self) {
        debug!("Discarded editor draft");
    }

    fn apply(&mut self, change: impl FnOnce(&mut Portfolio) -> Result<()>) -> Result<()> {
        if matches!(self.state, State::Submitted(_)) {
            return Err(EditError::Submitted);
        }

        let mut next = self.draft.clone();
        change(&mut next)?;
        self.draft = next;

        Ok(())
    }
}

fn section_len(portfolio: &Portfolio, section: Section) -> usize {
    match section {
        Section::Skills => portfolio.skills.len(),
        Section::Projects => portfolio.projects.len(),
        Section::Experiences => portfolio.experiences.len(),
    }
}

fn retain_except<T>(items: &mut Vec<T>, index: usize) {
    let mut position = 0;
    items.retain(|_| {
        let keep = position != index;
        position += 1;
        keep
    });
}

fn placeholder_platform(portfolio: &Portfolio) -> String {
    let base = format!("NewPlatform-{}", chrono::Local::now().timestamp_millis());
    let socials = &portfolio.contact.socials;

    if !socials.contains(&base) {
        return base;
    }

    (1..)
        .map(|n: u32| format!("{base}-{n}"))
        .find(|candidate| !socials.contains(candidate))
        .unwrap_or(base)
}
