use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::content::{Admin, Database};
use crate::editor::{SectionEditor, SectionEntry};
use crate::error::{FolioError, Result};
use crate::section::SectionUpdate;
use crate::visitor::Visitors;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// The main entry point for folio.
///
/// Owns the persisted site document. Every read goes to the backend; every
/// write replaces the whole document. Read-modify-write operations issued
/// through one `ContentStore` are serialized by an internal lock. Plain
/// [`read`](Self::read) followed by [`write`](Self::write) is not, so callers
/// that compose those two themselves can still lose updates.
pub struct ContentStore {
    backend: Box<dyn Backend>,
    lock: Mutex<()>,
}

impl ContentStore {
    /// Open a store on the given backend.
    /// Writes the seed document on first boot and fills in a missing admin record.
    pub fn open(backend: impl Backend + 'static, seed_admin: Admin) -> Result<Self> {
        let store = ContentStore {
            backend: Box::new(backend),
            lock: Mutex::new(()),
        };
        store.boot(seed_admin)?;
        Ok(store)
    }

    /// Open a store backed by a JSON file.
    pub fn open_file(path: impl Into<PathBuf>, seed_admin: Admin) -> Result<Self> {
        Self::open(FileBackend::new(path), seed_admin)
    }

    /// Open a store that lives only in memory.
    pub fn in_memory(seed_admin: Admin) -> Result<Self> {
        Self::open(MemoryBackend::new(), seed_admin)
    }

    /// Where the document lives.
    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    fn boot(&self, seed_admin: Admin) -> Result<()> {
        let _guard = self.guard();

        let raw = match self.load_raw()? {
            Some(raw) => raw,
            None => {
                log::info!("No document at {}, writing seed data", self.describe());
                return self.write(&Database::seed(seed_admin));
            }
        };

        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            FolioError::Storage(format!("Failed to parse {}: {e}", self.describe()))
        })?;
        if value.get("admin").is_none() {
            log::info!("Document has no admin record, adding the configured one");
            let mut db = self.parse(&raw)?;
            db.admin = seed_admin;
            self.write(&db)?;
        }
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_raw(&self) -> Result<Option<String>> {
        self.backend.load().map_err(|e| {
            FolioError::Storage(format!("Failed to read {}: {e}", self.describe()))
        })
    }

    fn parse(&self, raw: &str) -> Result<Database> {
        serde_json::from_str(raw).map_err(|e| {
            FolioError::Storage(format!("Failed to parse {}: {e}", self.describe()))
        })
    }

    /// Read the current document. No caching: every call goes to the backend.
    pub fn read(&self) -> Result<Database> {
        match self.load_raw()? {
            Some(raw) => self.parse(&raw),
            None => Err(FolioError::Storage(format!(
                "No document at {}",
                self.describe()
            ))),
        }
    }

    /// Replace the whole persisted document.
    pub fn write(&self, db: &Database) -> Result<()> {
        let contents = serde_json::to_string_pretty(db)?;
        self.backend.save(&contents).map_err(|e| {
            FolioError::Storage(format!("Failed to write {}: {e}", self.describe()))
        })
    }

    /// Read, let `f` change the document, write it back, all under the store lock.
    /// Nothing is written when `f` fails.
    pub fn modify<F>(&self, f: F) -> Result<Database>
    where
        F: FnOnce(&mut Database) -> Result<()>,
    {
        let _guard = self.guard();
        let mut db = self.read()?;
        f(&mut db)?;
        self.write(&db)?;
        Ok(db)
    }

    /// Validate and replace one top-level section. Returns the new document.
    pub fn update_section(&self, update: SectionUpdate) -> Result<Database> {
        update.validate()?;
        let section = update.section();
        let db = self.modify(|db| {
            update.apply(db);
            Ok(())
        })?;
        log::debug!("Updated section '{section}'");
        Ok(db)
    }

    /// Like [`update_section`](Self::update_section), from a key and raw JSON value.
    pub fn update_section_raw(&self, key: &str, value: serde_json::Value) -> Result<Database> {
        self.update_section(SectionUpdate::parse(key, value)?)
    }

    /// Merge a partial document into the stored one.
    ///
    /// Every section is parsed and validated before anything is written, and all
    /// of them are applied in a single write.
    pub fn merge(&self, partial: serde_json::Value) -> Result<Database> {
        let updates = SectionUpdate::from_partial(partial)?;
        for update in &updates {
            update.validate()?;
        }
        let sections: Vec<&str> = updates.iter().map(|u| u.section().as_str()).collect();
        log::info!("Merging sections: {}", sections.join(", "));

        self.modify(|db| {
            for update in updates {
                update.apply(db);
            }
            Ok(())
        })
    }

    /// Visitor counter handle.
    pub fn visitors(&self) -> Visitors<'_> {
        Visitors::new(self)
    }

    /// Section editor handle for one list section.
    pub fn editor<T: SectionEntry>(&self) -> SectionEditor<'_, T> {
        SectionEditor::new(self)
    }
}
