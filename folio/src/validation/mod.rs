use crate::content::{Admin, Donation, Friend, Localized, Profile, Project, SocialMedia, Update};
use crate::error::{FolioError, Result};
use crate::section::SectionUpdate;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

/// Result of validating one section
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Log warnings, and turn errors into a single `FolioError::Validation`.
    pub fn into_result(self, section: &str) -> Result<()> {
        for warning in &self.warnings {
            log::warn!("{section}: {warning}");
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FolioError::Validation(format!(
                "{section}: {}",
                self.errors.join("; ")
            )))
        }
    }
}

/// Check a section's replacement value before it is merged into the document.
pub fn validate_section(update: &SectionUpdate) -> ValidationResult {
    let mut result = ValidationResult::default();
    match update {
        SectionUpdate::Profile(profile) => validate_profile(profile, &mut result),
        SectionUpdate::Social(social) => validate_social(social, &mut result),
        SectionUpdate::Friends(friends) => validate_friends(friends, &mut result),
        SectionUpdate::Projects(projects) => validate_projects(projects, &mut result),
        SectionUpdate::Updates(updates) => validate_updates(updates, &mut result),
        SectionUpdate::Donations(donations) => validate_donations(donations, &mut result),
        SectionUpdate::Admin(admin) => validate_admin(admin, &mut result),
    }
    result
}

fn validate_profile(profile: &Profile, result: &mut ValidationResult) {
    if is_blank(&profile.name) {
        result.errors.push("Required field 'name' is missing".into());
    }
    warn_missing_translations("bio", &profile.bio, result);
    warn_missing_translations("cv", &profile.cv, result);
}

fn validate_social(social: &[SocialMedia], result: &mut ValidationResult) {
    for (i, item) in social.iter().enumerate() {
        if is_blank(&item.name) {
            result.errors.push(format!("Entry {i}: 'name' is missing"));
        }
        if is_blank(&item.url) {
            result.errors.push(format!("Entry {i}: 'url' is missing"));
        }
    }
    warn_duplicate_names(social.iter().map(|s| s.name.as_str()), result);
}

fn validate_friends(friends: &[Friend], result: &mut ValidationResult) {
    for (i, friend) in friends.iter().enumerate() {
        if is_blank(&friend.name) {
            result.errors.push(format!("Entry {i}: 'name' is missing"));
        }
    }
    warn_duplicate_names(friends.iter().map(|f| f.name.as_str()), result);
}

fn validate_projects(projects: &[Project], result: &mut ValidationResult) {
    let mut ids = HashSet::new();
    for project in projects {
        if !ids.insert(project.id) {
            result
                .errors
                .push(format!("Duplicate project id {}", project.id));
        }
        if is_blank(&project.name) {
            result
                .errors
                .push(format!("Project {}: 'name' is missing", project.id));
        }
        warn_missing_translations(
            &format!("project {} description", project.id),
            &project.description,
            result,
        );
    }
}

fn validate_updates(updates: &[Update], result: &mut ValidationResult) {
    let mut dates = HashSet::new();
    for update in updates {
        if parse_update_date(&update.date).is_none() {
            result
                .errors
                .push(format!("Invalid date '{}'", update.date));
        }
        if !dates.insert(update.date.as_str()) {
            result
                .errors
                .push(format!("Duplicate update date '{}'", update.date));
        }
    }
    if result.is_ok() && !is_sorted_newest_first(updates) {
        result
            .warnings
            .push("Updates are not sorted newest first".into());
    }
}

fn validate_donations(donations: &[Donation], result: &mut ValidationResult) {
    for (i, donation) in donations.iter().enumerate() {
        if is_blank(&donation.name) {
            result.errors.push(format!("Entry {i}: 'name' is missing"));
        }
        if is_blank(&donation.url) {
            result.errors.push(format!("Entry {i}: 'url' is missing"));
        }
    }
    warn_duplicate_names(donations.iter().map(|d| d.name.as_str()), result);
}

fn validate_admin(admin: &Admin, result: &mut ValidationResult) {
    if is_blank(&admin.username) {
        result.errors.push("Required field 'username' is missing".into());
    }
    if admin.password.is_empty() {
        result.errors.push("Required field 'password' is missing".into());
    }
}

fn warn_missing_translations(field: &str, text: &Localized, result: &mut ValidationResult) {
    for lang in text.missing() {
        result
            .warnings
            .push(format!("'{field}' has no '{lang}' text"));
    }
}

fn warn_duplicate_names<'a>(names: impl Iterator<Item = &'a str>, result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            result.warnings.push(format!("Duplicate name '{name}'"));
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Parse an update date: `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_update_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn is_sorted_newest_first(updates: &[Update]) -> bool {
    updates.windows(2).all(|pair| {
        parse_update_date(&pair[0].date) >= parse_update_date(&pair[1].date)
    })
}
