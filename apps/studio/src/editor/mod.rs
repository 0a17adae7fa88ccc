//! Editor session, inline validation, draft persistence and debounced autosave.

pub mod autosave;
pub mod persistence;
pub mod session;
pub mod validation;

pub use autosave::{AutoSaver, Debouncer, SaveStatus};
pub use persistence::{JsonFileStore, MemoryStore, PersistedState, Persistence, PersistenceError};
pub use session::{EditorSession, PreviewRequest};
pub use validation::{check_readiness, FieldErrors};
