// Content model - the single aggregate document and its sections

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Id,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Id];

    /// Language used when a translation is missing.
    pub const FALLBACK: Language = Language::En;

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "en" => Ok(Language::En),
            "id" => Ok(Language::Id),
            _ => Err(FolioError::Validation("Invalid language".into())),
        }
    }
}

/// Text with one entry per supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localized {
    pub en: String,
    pub id: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, id: impl Into<String>) -> Self {
        Localized {
            en: en.into(),
            id: id.into(),
        }
    }

    /// The raw entry for `lang`, possibly empty.
    pub fn entry(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Id => &self.id,
        }
    }

    /// The entry for `lang`, or the fallback language's entry when it is empty.
    pub fn get(&self, lang: Language) -> &str {
        let text = self.entry(lang);
        if text.trim().is_empty() {
            self.entry(Language::FALLBACK)
        } else {
            text
        }
    }

    /// Languages with no text.
    pub fn missing(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| self.entry(*lang).trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub full_name: String,
    pub birthdate: String,
    pub location: String,
    pub school: String,
    pub bio: Localized,
    pub avatar: String,
    pub roles: Vec<String>,
    pub cv: Localized,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMedia {
    pub name: String,
    pub url: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Friend {
    pub name: String,
    pub avatar: String,
    /// External profile URL.
    pub github: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: Localized,
    pub image: String,
    pub technologies: Vec<String>,
    /// Live URL.
    pub url: String,
    /// Source URL.
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Update {
    /// ISO date or timestamp; also the identity key.
    pub date: String,
    pub title: Localized,
    pub description: Localized,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Donation {
    pub name: String,
    pub url: String,
    pub icon: String,
}

/// The single admin credential. The password is either plaintext or an
/// Argon2 PHC string.
///
/// Missing fields deserialize as empty strings, which validation rejects and
/// login never matches. The seed credential comes from [`crate::Config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub visitors: u64,
    pub last_visited: Option<String>,
}

/// The whole site database. Read and written in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub social: Vec<SocialMedia>,
    #[serde(default)]
    pub friends: Vec<Friend>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub donations: Vec<Donation>,
    #[serde(default)]
    pub admin: Admin,
    #[serde(default)]
    pub stats: Stats,
    /// Top-level keys this version does not know about, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Database {
    /// The document written on first boot.
    pub fn seed(admin: Admin) -> Self {
        Database {
            profile: Profile {
                name: "Folio".into(),
                full_name: "Folio Owner".into(),
                birthdate: "2000-01-01".into(),
                location: "Earth".into(),
                school: String::new(),
                bio: Localized::new(
                    "Developer building things for the web.",
                    "Developer yang membangun berbagai hal untuk web.",
                ),
                avatar: String::new(),
                roles: vec!["Developer".into()],
                cv: Localized::new("/cv/cv_en.pdf", "/cv/cv_id.pdf"),
            },
            admin,
            ..Database::default()
        }
    }

    /// JSON form of the document with the admin password removed.
    pub fn redacted(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(admin) = value.get_mut("admin").and_then(|a| a.as_object_mut()) {
            admin.remove("password");
        }
        Ok(value)
    }

    /// JSON form of one top-level section.
    pub fn section_value(&self, section: Section) -> Result<serde_json::Value> {
        let value = match section {
            Section::Profile => serde_json::to_value(&self.profile)?,
            Section::Social => serde_json::to_value(&self.social)?,
            Section::Friends => serde_json::to_value(&self.friends)?,
            Section::Projects => serde_json::to_value(&self.projects)?,
            Section::Updates => serde_json::to_value(&self.updates)?,
            Section::Donations => serde_json::to_value(&self.donations)?,
            Section::Admin => serde_json::to_value(&self.admin)?,
            Section::Stats => serde_json::to_value(&self.stats)?,
        };
        Ok(value)
    }
}

/// Names of the top-level document keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Profile,
    Social,
    Friends,
    Projects,
    Updates,
    Donations,
    Admin,
    Stats,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Profile,
        Section::Social,
        Section::Friends,
        Section::Projects,
        Section::Updates,
        Section::Donations,
        Section::Admin,
        Section::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Profile => "profile",
            Section::Social => "social",
            Section::Friends => "friends",
            Section::Projects => "projects",
            Section::Updates => "updates",
            Section::Donations => "donations",
            Section::Admin => "admin",
            Section::Stats => "stats",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| FolioError::Validation(format!("Unknown section '{s}'")))
    }
}
