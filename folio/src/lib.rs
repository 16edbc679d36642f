pub mod auth;
pub mod backend;
pub mod config;
pub mod contact;
pub mod content;
pub mod editor;
pub mod error;
pub mod section;
pub mod store;
pub mod validation;
pub mod visitor;

pub use auth::{SessionGate, SessionMarker, SessionState};
pub use backend::{Backend, FileBackend, MemoryBackend};
pub use config::Config;
pub use contact::ContactForm;
pub use content::{Database, Language, Section};
pub use error::{ErrorKind, FolioError, Result};
pub use section::SectionUpdate;
pub use store::ContentStore;
