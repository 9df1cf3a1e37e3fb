mod engine;
mod error;
mod types;

pub use engine::{Engine, GENERAL_SETTINGS_LABEL};
pub use error::{BackupError, BackupErrorCode};
pub use types::{ApplyEntry, ApplyOutcome, ApplyReport, Classification, ImportOption};
