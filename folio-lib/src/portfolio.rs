//! The portfolio document and its sections.
//!
//! A [`Portfolio`] is pure data. The only invariant enforced here is the one the
//! shape itself can guarantee: [`Socials`] always carries the protected
//! `LinkedIn` and `GitHub` entries, whose keys can never be renamed or removed.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const LINKEDIN: &str = "LinkedIn";
pub const GITHUB: &str = "GitHub";

/// Social platforms every portfolio carries. Their values are editable, their keys are not.
pub const PROTECTED_PLATFORMS: [&str; 2] = [LINKEDIN, GITHUB];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(default)]
    pub about: About,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub contact: Contact,
    /// Cached export, present only once a PDF has been attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_data: Option<PdfData>,
}

impl Portfolio {
    /// A freshly created portfolio: empty fields, empty lists and the protected socials.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn artifact(&self) -> Option<&str> {
        self.pdf_data.as_ref().map(|pdf| pdf.pdf_base64_data.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub name: String,
    pub tagline: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company_name: String,
    pub job_duration: String,
    pub job_role: String,
    pub job_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub socials: Socials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfData {
    pub pdf_base64_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocialsError {
    #[error("'{0}' is a protected platform")]
    Protected(String),
    #[error("A platform named '{0}' already exists")]
    Duplicate(String),
    #[error("No platform named '{0}'")]
    Unknown(String),
}

/// Platform name to profile URL, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Socials(IndexMap<String, String>);

impl Socials {
    pub fn is_protected(platform: &str) -> bool {
        PROTECTED_PLATFORMS.contains(&platform)
    }

    pub fn get(&self, platform: &str) -> Option<&str> {
        self.0.get(platform).map(String::as_str)
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.0.contains_key(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set the URL for a platform, adding the platform if it is new. Existing
    /// platforms keep their position.
    pub fn set(&mut self, platform: &str, url: &str) {
        self.0.insert(platform.to_string(), url.to_string());
    }

    pub fn remove(&mut self, platform: &str) -> Result<String, SocialsError> {
        if Self::is_protected(platform) {
            return Err(SocialsError::Protected(platform.to_string()));
        }

        self.0
            .shift_remove(platform)
            .ok_or_else(|| SocialsError::Unknown(platform.to_string()))
    }

    /// Move the URL stored under `old` to `new`, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), SocialsError> {
        if Self::is_protected(old) {
            return Err(SocialsError::Protected(old.to_string()));
        }
        if self.contains(new) {
            return Err(SocialsError::Duplicate(new.to_string()));
        }

        let (index, _, url) = self
            .0
            .shift_remove_full(old)
            .ok_or_else(|| SocialsError::Unknown(old.to_string()))?;
        self.0.shift_insert(index, new.to_string(), url);

        Ok(())
    }

    fn seed_protected(&mut self) {
        for (position, platform) in PROTECTED_PLATFORMS.iter().enumerate() {
            if !self.0.contains_key(*platform) {
                let index = position.min(self.0.len());
                self.0.shift_insert(index, (*platform).to_string(), String::new());
            }
        }
    }
}

impl Default for Socials {
    fn default() -> Self {
        let mut socials = Self(IndexMap::new());
        socials.seed_protected();
        socials
    }
}

impl<'de> Deserialize<'de> for Socials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut socials = Self(IndexMap::deserialize(deserializer)?);
        socials.seed_protected();
        Ok(socials)
    }
}

impl<'a> IntoIterator for &'a Socials {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
