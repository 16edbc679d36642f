use crate::content::Stats;
use crate::error::Result;
use crate::store::ContentStore;
use chrono::{SecondsFormat, Utc};

/// Visitor counter backed by `stats` in the site document.
pub struct Visitors<'a> {
    store: &'a ContentStore,
}

impl<'a> Visitors<'a> {
    pub(crate) fn new(store: &'a ContentStore) -> Self {
        Visitors { store }
    }

    /// Count one visit, stamp `lastVisited`, persist. Returns the new count.
    pub fn increment(&self) -> Result<u64> {
        let db = self.store.modify(|db| {
            db.stats.visitors += 1;
            db.stats.last_visited = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            Ok(())
        })?;
        Ok(db.stats.visitors)
    }

    /// Current count. An unreadable document counts as 0.
    pub fn count(&self) -> u64 {
        match self.store.read() {
            Ok(db) => db.stats.visitors,
            Err(e) => {
                log::error!("Error getting visitor count: {e}");
                0
            }
        }
    }

    pub fn stats(&self) -> Result<Stats> {
        Ok(self.store.read()?.stats)
    }
}

#[cfg(test)]
mod tests {
    use crate::content::Admin;
    use crate::store::ContentStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_sequential_increments() {
        let store = ContentStore::in_memory(Admin::default()).unwrap();
        let start = store.visitors().count();
        for _ in 0..5 {
            store.visitors().increment().unwrap();
        }
        assert_eq!(store.visitors().count(), start + 5);
    }

    #[test]
    fn test_increment_returns_new_count_and_stamps_time() {
        let store = ContentStore::in_memory(Admin::default()).unwrap();
        store
            .modify(|db| {
                db.stats.visitors = 5;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.visitors().increment().unwrap(), 6);
        assert_eq!(store.visitors().increment().unwrap(), 7);

        let stats = store.visitors().stats().unwrap();
        assert_eq!(stats.visitors, 7);
        let stamp = stats.last_visited.unwrap();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }

    #[test]
    fn test_count_masks_read_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("database.json");
        let store = ContentStore::open_file(&path, Admin::default()).unwrap();
        store.visitors().increment().unwrap();

        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(store.visitors().count(), 0);
        assert!(store.visitors().increment().is_err());
    }

    #[test]
    fn test_concurrent_increments_through_one_store() {
        let tmp = TempDir::new().unwrap();
        let store =
            Arc::new(ContentStore::open_file(tmp.path().join("db.json"), Admin::default()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.visitors().increment().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.visitors().count(), 100);
    }
}
