// Per-section update commands

use crate::content::{
    Admin, Database, Donation, Friend, Profile, Project, Section, SocialMedia, Update,
};
use crate::error::{FolioError, Result};
use crate::validation;
use serde::de::DeserializeOwned;

/// A replacement value for exactly one top-level section.
///
/// `stats` has no variant: it is owned by the visitor counter.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    Profile(Profile),
    Social(Vec<SocialMedia>),
    Friends(Vec<Friend>),
    Projects(Vec<Project>),
    Updates(Vec<Update>),
    Donations(Vec<Donation>),
    Admin(Admin),
}

impl SectionUpdate {
    /// Build an update from a section key and its JSON value.
    pub fn parse(key: &str, value: serde_json::Value) -> Result<Self> {
        let section: Section = key.parse()?;
        let update = match section {
            Section::Profile => SectionUpdate::Profile(from_json(section, value)?),
            Section::Social => SectionUpdate::Social(from_json(section, value)?),
            Section::Friends => SectionUpdate::Friends(from_json(section, value)?),
            Section::Projects => SectionUpdate::Projects(from_json(section, value)?),
            Section::Updates => SectionUpdate::Updates(from_json(section, value)?),
            Section::Donations => SectionUpdate::Donations(from_json(section, value)?),
            Section::Admin => SectionUpdate::Admin(from_json(section, value)?),
            Section::Stats => {
                return Err(FolioError::Validation(
                    "Section 'stats' is managed by the visitor counter".into(),
                ))
            }
        };
        Ok(update)
    }

    /// Split a partial document (`{"projects": [...], ...}`) into updates.
    pub fn from_partial(partial: serde_json::Value) -> Result<Vec<Self>> {
        let map = match partial {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(FolioError::Validation(
                    "Update body must be a JSON object".into(),
                ))
            }
        };
        if map.is_empty() {
            return Err(FolioError::Validation("No sections to update".into()));
        }
        map.into_iter()
            .map(|(key, value)| SectionUpdate::parse(&key, value))
            .collect()
    }

    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::Profile(_) => Section::Profile,
            SectionUpdate::Social(_) => Section::Social,
            SectionUpdate::Friends(_) => Section::Friends,
            SectionUpdate::Projects(_) => Section::Projects,
            SectionUpdate::Updates(_) => Section::Updates,
            SectionUpdate::Donations(_) => Section::Donations,
            SectionUpdate::Admin(_) => Section::Admin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_section(self).into_result(self.section().as_str())
    }

    /// Replace the matching top-level field of `db`.
    pub fn apply(self, db: &mut Database) {
        match self {
            SectionUpdate::Profile(v) => db.profile = v,
            SectionUpdate::Social(v) => db.social = v,
            SectionUpdate::Friends(v) => db.friends = v,
            SectionUpdate::Projects(v) => db.projects = v,
            SectionUpdate::Updates(v) => db.updates = v,
            SectionUpdate::Donations(v) => db.donations = v,
            SectionUpdate::Admin(v) => db.admin = v,
        }
    }
}

fn from_json<T: DeserializeOwned>(section: Section, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| FolioError::Validation(format!("Invalid '{section}' value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_projects() {
        let update = SectionUpdate::parse(
            "projects",
            json!([{ "id": 1, "name": "Site", "technologies": ["rust"] }]),
        )
        .unwrap();
        match update {
            SectionUpdate::Projects(projects) => {
                assert_eq!(projects.len(), 1);
                assert_eq!(projects[0].technologies, vec!["rust".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shape_mismatch_is_validation_error() {
        let err = SectionUpdate::parse("projects", json!({ "id": 1 })).unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));
    }

    #[test]
    fn test_stats_and_unknown_rejected() {
        assert!(SectionUpdate::parse("stats", json!({ "visitors": 9 })).is_err());
        assert!(SectionUpdate::parse("theme", json!({})).is_err());
    }

    #[test]
    fn test_partial_admin_fails_validation() {
        for value in [json!({ "username": "x" }), json!({})] {
            let update = SectionUpdate::parse("admin", value).unwrap();
            match &update {
                SectionUpdate::Admin(admin) => assert_eq!(admin.password, ""),
                other => panic!("unexpected {other:?}"),
            }
            let err = update.validate().unwrap_err();
            assert!(matches!(err, FolioError::Validation(_)));
        }

        let full = SectionUpdate::parse("admin", json!({ "username": "x", "password": "y" }))
            .unwrap();
        assert!(full.validate().is_ok());
    }

    #[test]
    fn test_from_partial() {
        let updates = SectionUpdate::from_partial(json!({
            "friends": [{ "name": "Bo" }],
            "social": [],
        }))
        .unwrap();
        let mut sections: Vec<_> = updates.iter().map(|u| u.section()).collect();
        sections.sort_by_key(|s| s.as_str());
        assert_eq!(sections, vec![Section::Friends, Section::Social]);

        assert!(SectionUpdate::from_partial(json!({})).is_err());
        assert!(SectionUpdate::from_partial(json!([1, 2])).is_err());
    }

    #[test]
    fn test_apply_replaces_one_field() {
        let mut db = Database::seed(Admin::default());
        let before = db.clone();
        SectionUpdate::Friends(vec![Friend {
            name: "Bo".into(),
            ..Friend::default()
        }])
        .apply(&mut db);

        assert_eq!(db.friends.len(), 1);
        assert_eq!(db.profile, before.profile);
        assert_eq!(db.projects, before.projects);
    }
}
