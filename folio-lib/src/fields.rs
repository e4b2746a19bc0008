//! Statically known form fields of each portfolio section.
//!
//! The string form of every field is the name its form input carries, which is
//! also the prefix of its validation error key.

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::portfolio::{About, Contact, Experience, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum AboutField {
    Name,
    Tagline,
    Description,
}

impl AboutField {
    pub fn get(self, about: &About) -> &str {
        match self {
            Self::Name => &about.name,
            Self::Tagline => &about.tagline,
            Self::Description => &about.description,
        }
    }

    pub fn set(self, about: &mut About, value: &str) {
        let field = match self {
            Self::Name => &mut about.name,
            Self::Tagline => &mut about.tagline,
            Self::Description => &mut about.description,
        };
        *field = value.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum ContactField {
    Email,
    Phone,
}

impl ContactField {
    pub fn get(self, contact: &Contact) -> &str {
        match self {
            Self::Email => &contact.email,
            Self::Phone => &contact.phone,
        }
    }

    pub fn set(self, contact: &mut Contact, value: &str) {
        let field = match self {
            Self::Email => &mut contact.email,
            Self::Phone => &mut contact.phone,
        };
        *field = value.to_string();
    }
}

/// A scalar field of the `about` or `contact` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    About(AboutField),
    Contact(ContactField),
}

impl From<AboutField> for ScalarField {
    fn from(field: AboutField) -> Self {
        Self::About(field)
    }
}

impl From<ContactField> for ScalarField {
    fn from(field: ContactField) -> Self {
        Self::Contact(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum ProjectField {
    Title,
    Description,
    Link,
}

impl ProjectField {
    pub fn get(self, project: &Project) -> &str {
        match self {
            Self::Title => &project.title,
            Self::Description => &project.description,
            Self::Link => &project.link,
        }
    }

    pub fn set(self, project: &mut Project, value: &str) {
        let field = match self {
            Self::Title => &mut project.title,
            Self::Description => &mut project.description,
            Self::Link => &mut project.link,
        };
        *field = value.to_string();
    }
}

/// Required text fields of an experience entry, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum ExperienceField {
    CompanyName,
    JobRole,
    JobDuration,
    JobDescription,
}

impl ExperienceField {
    pub fn get(self, experience: &Experience) -> &str {
        match self {
            Self::CompanyName => &experience.company_name,
            Self::JobRole => &experience.job_role,
            Self::JobDuration => &experience.job_duration,
            Self::JobDescription => &experience.job_description,
        }
    }

    pub fn set(self, experience: &mut Experience, value: &str) {
        let field = match self {
            Self::CompanyName => &mut experience.company_name,
            Self::JobRole => &mut experience.job_role,
            Self::JobDuration => &mut experience.job_duration,
            Self::JobDescription => &mut experience.job_description,
        };
        *field = value.to_string();
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CompanyName => "Company name",
            Self::JobRole => "Job role",
            Self::JobDuration => "Job duration",
            Self::JobDescription => "Job description",
        }
    }
}
