//! Field rules that gate submitting a portfolio.
//!
//! [`validate`] checks the whole draft and reports every failing field at once.
//! [`validate_field`] re-runs the rule of a single field so a form can give
//! feedback as the user leaves an input.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::LazyLock,
};

use derive_more::Deref;
use indexmap::IndexMap;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::{
    fields::ExperienceField,
    portfolio::{Portfolio, Socials},
};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+$").expect("valid link pattern"));

/// Field name to error message, in the order the fields appear on the form.
/// Empty means the draft may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    /// Re-derive the error of one field, adding or clearing its entry. An experience field
    /// refreshes its whole entry, which reports only its first failing field.
    pub fn refresh(&mut self, portfolio: &Portfolio, field: &FieldName) -> Option<&String> {
        let field = match field {
            FieldName::Experience(_, index) => {
                for other in ExperienceField::iter() {
                    self.0.shift_remove(&FieldName::Experience(other, *index).to_string());
                }
                let failing = first_blank_field(portfolio, *index)?;
                FieldName::Experience(failing, *index)
            }
            field => field.clone(),
        };

        let key = field.to_string();
        match validate_field(portfolio, &field) {
            Some(message) => {
                self.0.insert(key.clone(), message);
                self.0.get(&key)
            }
            None => {
                self.0.shift_remove(&key);
                None
            }
        }
    }

    fn insert(&mut self, field: &FieldName, message: String) {
        self.0.insert(field.to_string(), message);
    }
}

/// Identifies one form input, and with it one potential error entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    Name,
    Description,
    Email,
    Phone,
    /// Zero-based position in `skills`
    Skill(usize),
    /// Zero-based position in `projects`, checked on its link
    Project(usize),
    /// A field of the experience at a zero-based position
    Experience(ExperienceField, usize),
    /// The URL of a social platform
    SocialLink(String),
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Description => write!(f, "description"),
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Skill(index) => write!(f, "skill{}", index.saturating_add(1)),
            Self::Project(index) => write!(f, "project{}", index.saturating_add(1)),
            Self::Experience(field, index) => write!(f, "{field}{}", index.saturating_add(1)),
            Self::SocialLink(platform) => write!(f, "{platform}_link"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' does not name a form field")]
pub struct UnknownField(String);

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(platform) = s.strip_suffix("_link") {
            return Ok(Self::SocialLink(platform.to_string()));
        }

        match s {
            "name" => return Ok(Self::Name),
            "description" => return Ok(Self::Description),
            "email" => return Ok(Self::Email),
            "phone" => return Ok(Self::Phone),
            _ => {}
        }

        let unknown = || UnknownField(s.to_string());
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(unknown)?;
        let (prefix, number) = s.split_at(split);
        let position: usize = number.parse().map_err(|_| unknown())?;
        let index = position.checked_sub(1).ok_or_else(unknown)?;

        match prefix {
            "skill" => Ok(Self::Skill(index)),
            "project" => Ok(Self::Project(index)),
            other => ExperienceField::from_str(other)
                .map(|field| Self::Experience(field, index))
                .map_err(|_| unknown()),
        }
    }
}

/// Validate every field of a draft. Rules are independent: one failing field never hides
/// another, except that each experience entry reports only its first missing field.
pub fn validate(portfolio: &Portfolio) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    let mut check = |field: FieldName| {
        if let Some(message) = validate_field(portfolio, &field) {
            errors.insert(&field, message);
        }
    };

    check(FieldName::Name);
    check(FieldName::Description);
    check(FieldName::Email);
    check(FieldName::Phone);

    for index in 0..portfolio.skills.len() {
        check(FieldName::Skill(index));
    }

    for index in 0..portfolio.projects.len() {
        check(FieldName::Project(index));
    }

    for index in 0..portfolio.experiences.len() {
        if let Some(field) = first_blank_field(portfolio, index) {
            check(FieldName::Experience(field, index));
        }
    }

    for platform in portfolio.contact.socials.platforms() {
        check(FieldName::SocialLink(platform.to_string()));
    }

    errors
}

/// Validate a single field. Fields that do not exist in the draft (a removed list entry,
/// a renamed platform) have no error.
pub fn validate_field(portfolio: &Portfolio, field: &FieldName) -> Option<String> {
    match field {
        FieldName::Name => required(&portfolio.about.name, "Name"),
        FieldName::Description => required(&portfolio.about.description, "Description"),
        FieldName::Email => {
            let email = &portfolio.contact.email;
            required(email, "Email").or_else(|| {
                (!EMAIL.is_match(email)).then(|| "Enter a valid email address".to_string())
            })
        }
        FieldName::Phone => {
            let phone = &portfolio.contact.phone;
            required(phone, "Phone number").or_else(|| {
                (!PHONE.is_match(phone)).then(|| "Phone number must be 10 digits".to_string())
            })
        }
        FieldName::Skill(index) => {
            let skill = portfolio.skills.get(*index)?;
            is_blank(skill).then(|| "Skill cannot be empty".to_string())
        }
        FieldName::Project(index) => {
            let project = portfolio.projects.get(*index)?;
            link(&project.link, "Project link")
        }
        FieldName::Experience(field, index) => {
            let experience = portfolio.experiences.get(*index)?;
            required(field.get(experience), field.label())
        }
        FieldName::SocialLink(platform) => {
            let url = portfolio.contact.socials.get(platform)?;
            // The seeded platforms may stay unfilled
            if Socials::is_protected(platform) && is_blank(url) {
                return None;
            }
            link(url, &format!("{platform} link"))
        }
    }
}

/// The first required field left empty in the experience at `index`.
fn first_blank_field(portfolio: &Portfolio, index: usize) -> Option<ExperienceField> {
    let experience = portfolio.experiences.get(index)?;
    ExperienceField::iter().find(|f| is_blank(f.get(experience)))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required(value: &str, label: &str) -> Option<String> {
    is_blank(value).then(|| format!("{label} is required"))
}

fn link(value: &str, label: &str) -> Option<String> {
    required(value, label).or_else(|| {
        (!LINK.is_match(value)).then(|| format!("{label} must start with http:// or https://"))
    })
}
