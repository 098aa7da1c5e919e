use std::path::PathBuf;
use thiserror::Error;

/// Core error types for fwsim
#[derive(Debug, Error)]
pub enum Error {
    /// Rules or packets could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be used
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Input-source errors. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid JSON format in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} contains {count} records (max: {max})", path.display())]
    TooManyRecords {
        path: PathBuf,
        count: usize,
        max: usize,
    },
}

impl LoadError {
    /// Path of the input that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Malformed { path, .. }
            | LoadError::Io { path, .. }
            | LoadError::TooManyRecords { path, .. } => path,
        }
    }
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl Error {
    /// Translates an error into a user-facing message with suggestions.
    pub fn translate(&self) -> ErrorTranslation {
        match self {
            Error::Load(LoadError::NotFound { path }) => {
                ErrorTranslation::new(format!("Error: {} not found.", path.display()))
                    .with_suggestion("Check the path passed with --rules / --packets / --log")
                    .with_suggestion("Relative paths are resolved from the current directory")
            }
            Error::Load(LoadError::Malformed { path, source }) => {
                let translation = ErrorTranslation::new(format!(
                    "Error: Invalid JSON format in {}.",
                    path.display()
                ));
                match source.classify() {
                    serde_json::error::Category::Data => translation
                        .with_suggestion(format!("{source}"))
                        .with_suggestion(
                            "Every entry needs string fields src, dst, port, protocol (rules also need action)",
                        ),
                    _ => translation
                        .with_suggestion(format!("{source}"))
                        .with_suggestion("The file must contain a JSON array of objects"),
                }
            }
            Error::Load(LoadError::TooManyRecords { max, .. }) => {
                ErrorTranslation::new(format!("Error: {self}."))
                    .with_suggestion(format!("Split the input into batches of at most {max}"))
            }
            Error::Load(LoadError::Io { .. }) | Error::Io(_) => {
                let translation = ErrorTranslation::new(format!("Error: {self}."));
                if self.to_string().to_lowercase().contains("permission denied") {
                    translation.with_suggestion("Check file permissions")
                } else {
                    translation
                }
            }
            Error::Serialization(_) => ErrorTranslation::new(format!("Error: {self}.")),
            Error::Config(_) => ErrorTranslation::new(format!("Error: {self}."))
                .with_suggestion("Fix or remove the configuration file to use defaults"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
