use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupErrorCode {
    Parse,
    EmptyStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupError {
    pub code: BackupErrorCode,
    pub message: String,
}

impl BackupError {
    pub fn new(code: BackupErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for BackupError {}
