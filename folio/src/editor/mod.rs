// Section editors - add/edit/remove entries of one list section

use crate::content::{Database, Donation, Friend, Project, Section, SocialMedia, Update};
use crate::error::{FolioError, Result};
use crate::section::SectionUpdate;
use crate::store::ContentStore;
use crate::validation::parse_update_date;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// An element of a list section, identified by a key.
///
/// Keys are not guaranteed unique (friend names, for example); edits hit the
/// first match and removals drop every match.
pub trait SectionEntry: Clone + Serialize + DeserializeOwned {
    type Key: PartialEq + fmt::Display + FromStr;

    const SECTION: Section;

    fn key(&self) -> Self::Key;

    /// The section's list in `db`.
    fn list(db: &Database) -> &[Self];

    /// Wrap a full replacement list as an update command.
    fn wrap(items: Vec<Self>) -> SectionUpdate;

    /// Called on a new entry before it is appended.
    fn prepare_new(_items: &[Self], _entry: &mut Self) {}

    /// Called on an edited entry before it replaces `old`.
    fn prepare_edit(_old: &Self, _entry: &mut Self) {}

    /// Called on the list after every add or edit.
    fn normalize(_items: &mut Vec<Self>) {}
}

impl SectionEntry for Project {
    type Key = u64;
    const SECTION: Section = Section::Projects;

    fn key(&self) -> u64 {
        self.id
    }

    fn list(db: &Database) -> &[Self] {
        &db.projects
    }

    fn wrap(items: Vec<Self>) -> SectionUpdate {
        SectionUpdate::Projects(items)
    }

    fn prepare_new(items: &[Self], entry: &mut Self) {
        entry.id = next_project_id(items);
    }

    fn prepare_edit(old: &Self, entry: &mut Self) {
        entry.id = old.id;
    }
}

impl SectionEntry for Friend {
    type Key = String;
    const SECTION: Section = Section::Friends;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn list(db: &Database) -> &[Self] {
        &db.friends
    }

    fn wrap(items: Vec<Self>) -> SectionUpdate {
        SectionUpdate::Friends(items)
    }
}

impl SectionEntry for SocialMedia {
    type Key = String;
    const SECTION: Section = Section::Social;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn list(db: &Database) -> &[Self] {
        &db.social
    }

    fn wrap(items: Vec<Self>) -> SectionUpdate {
        SectionUpdate::Social(items)
    }
}

impl SectionEntry for Donation {
    type Key = String;
    const SECTION: Section = Section::Donations;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn list(db: &Database) -> &[Self] {
        &db.donations
    }

    fn wrap(items: Vec<Self>) -> SectionUpdate {
        SectionUpdate::Donations(items)
    }
}

impl SectionEntry for Update {
    type Key = String;
    const SECTION: Section = Section::Updates;

    fn key(&self) -> String {
        self.date.clone()
    }

    fn list(db: &Database) -> &[Self] {
        &db.updates
    }

    fn wrap(items: Vec<Self>) -> SectionUpdate {
        SectionUpdate::Updates(items)
    }

    fn normalize(items: &mut Vec<Self>) {
        sort_newest_first(items);
    }
}

/// `max(existing ids) + 1`, starting at 1.
pub fn next_project_id(projects: &[Project]) -> u64 {
    projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

/// Sort updates by date, newest first. Unparseable dates go last.
pub fn sort_newest_first(updates: &mut [Update]) {
    updates.sort_by(|a, b| parse_update_date(&b.date).cmp(&parse_update_date(&a.date)));
}

/// Append `entry`.
pub fn add<T: SectionEntry>(items: Vec<T>, entry: T) -> Vec<T> {
    append(items, entry).0
}

fn append<T: SectionEntry>(mut items: Vec<T>, mut entry: T) -> (Vec<T>, T) {
    T::prepare_new(&items, &mut entry);
    items.push(entry.clone());
    T::normalize(&mut items);
    (items, entry)
}

/// Replace the first entry whose key is `key`.
pub fn edit<T: SectionEntry>(mut items: Vec<T>, key: &T::Key, mut entry: T) -> Result<Vec<T>> {
    let slot = items
        .iter_mut()
        .find(|item| item.key() == *key)
        .ok_or_else(|| not_found::<T>(key))?;
    T::prepare_edit(slot, &mut entry);
    *slot = entry;
    T::normalize(&mut items);
    Ok(items)
}

/// Drop every entry whose key is `key`.
pub fn remove<T: SectionEntry>(items: Vec<T>, key: &T::Key) -> Result<Vec<T>> {
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(|item| item.key() != *key).collect();
    if kept.len() == before {
        return Err(not_found::<T>(key));
    }
    Ok(kept)
}

fn not_found<T: SectionEntry>(key: &T::Key) -> FolioError {
    FolioError::NotFound {
        section: T::SECTION.to_string(),
        key: key.to_string(),
    }
}

/// Edits one list section of a store: read the document, change the list,
/// submit the whole list back with [`ContentStore::update_section`].
///
/// The read happens outside the store lock, so the last submit wins when two
/// editors overlap.
pub struct SectionEditor<'a, T> {
    store: &'a ContentStore,
    _entry: PhantomData<T>,
}

impl<'a, T: SectionEntry> SectionEditor<'a, T> {
    pub(crate) fn new(store: &'a ContentStore) -> Self {
        SectionEditor {
            store,
            _entry: PhantomData,
        }
    }

    pub fn list(&self) -> Result<Vec<T>> {
        Ok(T::list(&self.store.read()?).to_vec())
    }

    pub fn get(&self, key: &T::Key) -> Result<T> {
        self.list()?
            .into_iter()
            .find(|item| item.key() == *key)
            .ok_or_else(|| not_found::<T>(key))
    }

    /// Add an entry. Returns it as stored (projects get their id here).
    pub fn add(&self, entry: T) -> Result<T> {
        let (items, added) = append(self.list()?, entry);
        self.store.update_section(T::wrap(items))?;
        Ok(added)
    }

    pub fn edit(&self, key: &T::Key, entry: T) -> Result<Vec<T>> {
        let items = edit(self.list()?, key, entry)?;
        self.store.update_section(T::wrap(items.clone()))?;
        Ok(items)
    }

    pub fn remove(&self, key: &T::Key) -> Result<Vec<T>> {
        let items = remove(self.list()?, key)?;
        self.store.update_section(T::wrap(items.clone()))?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Admin, Localized};
    use pretty_assertions::assert_eq;

    fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            name: name.into(),
            ..Project::default()
        }
    }

    fn update(date: &str, title: &str) -> Update {
        Update {
            date: date.into(),
            title: Localized::new(title, title),
            description: Localized::default(),
        }
    }

    #[test]
    fn test_next_project_id() {
        assert_eq!(next_project_id(&[]), 1);
        assert_eq!(next_project_id(&[project(4, "a"), project(2, "b")]), 5);
    }

    #[test]
    fn test_add_project_assigns_id() {
        let items = add(vec![project(3, "a")], project(0, "b"));
        assert_eq!(items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_edit_project_keeps_id() {
        let items = edit(vec![project(3, "a")], &3, project(99, "renamed")).unwrap();
        assert_eq!(items, vec![project(3, "renamed")]);
    }

    #[test]
    fn test_updates_sorted_after_add_and_edit() {
        let items = add(
            vec![update("2024-05-01", "may"), update("2023-01-01", "old")],
            update("2024-06-01", "june"),
        );
        let dates: Vec<_> = items.iter().map(|u| u.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-05-01", "2023-01-01"]);

        let items = edit(items, &"2023-01-01".to_string(), update("2025-01-01", "moved")).unwrap();
        assert_eq!(items[0].date, "2025-01-01");
    }

    #[test]
    fn test_remove_drops_every_match() {
        let bo = Friend {
            name: "Bo".into(),
            ..Friend::default()
        };
        let al = Friend {
            name: "Al".into(),
            ..Friend::default()
        };
        let items = remove(vec![bo.clone(), al.clone(), bo], &"Bo".to_string()).unwrap();
        assert_eq!(items, vec![al]);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let err = remove::<Friend>(vec![], &"Bo".to_string()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);

        let err = edit(vec![project(1, "a")], &2, project(0, "b")).unwrap_err();
        assert_eq!(err.to_string(), "Not found: projects/2");
    }

    #[test]
    fn test_section_editor_round_trip() {
        let store = ContentStore::in_memory(Admin::default()).unwrap();
        let projects = store.editor::<Project>();

        let first = projects.add(project(0, "site")).unwrap();
        let second = projects.add(project(0, "bot")).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        projects.edit(&1, project(0, "portfolio")).unwrap();
        assert_eq!(projects.get(&1).unwrap().name, "portfolio");

        let left = projects.remove(&2).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(store.read().unwrap().projects, left);
    }

    #[test]
    fn test_overlapping_editors_last_submit_wins() {
        let store = ContentStore::in_memory(Admin::default()).unwrap();
        let friends = store.editor::<Friend>();
        let friend = |name: &str| Friend {
            name: name.into(),
            ..Friend::default()
        };

        // Both editors load the list before either submits.
        let first_view = friends.list().unwrap();
        let second_view = friends.list().unwrap();

        store
            .update_section(Friend::wrap(add(first_view, friend("Bo"))))
            .unwrap();
        store
            .modify(|db| {
                db.profile.name = "Changed".into();
                Ok(())
            })
            .unwrap();
        store
            .update_section(Friend::wrap(add(second_view, friend("Al"))))
            .unwrap();

        let db = store.read().unwrap();
        assert_eq!(db.friends, vec![friend("Al")]);
        // Only the stale list is replaced; other sections keep their changes.
        assert_eq!(db.profile.name, "Changed");
    }

    #[test]
    fn test_section_editor_validates() {
        let store = ContentStore::in_memory(Admin::default()).unwrap();
        let err = store.editor::<Project>().add(project(0, "")).unwrap_err();
        assert!(matches!(err, FolioError::Validation(_)));
        assert!(store.read().unwrap().projects.is_empty());
    }
}
