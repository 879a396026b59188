use thiserror::Error;

/// How a store error is reported to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    NotFound,
    /// Server-side failure; the detail stays in the log.
    Internal,
}

// === BookmarkError ===

/// Errors related to bookmark store and ingestion operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Bookmark with the given ID does not exist or belongs to another user.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The referenced category is not visible to the user.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    /// Input failed validation (missing or malformed URL, bad patch).
    #[error("Invalid bookmark: {0}")]
    Validation(String),
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
}

impl BookmarkError {
    pub fn class(&self) -> ErrorClass {
        match self {
            BookmarkError::NotFound(_) | BookmarkError::CategoryNotFound(_) => ErrorClass::NotFound,
            BookmarkError::Validation(_) => ErrorClass::Validation,
            BookmarkError::DatabaseError(_) => ErrorClass::Internal,
        }
    }

    /// True for errors caused by the caller's input (4xx class).
    pub fn is_client_error(&self) -> bool {
        self.class() != ErrorClass::Internal
    }
}

impl From<rusqlite::Error> for BookmarkError {
    fn from(e: rusqlite::Error) -> Self {
        BookmarkError::DatabaseError(e.to_string())
    }
}

impl From<CategoryError> for BookmarkError {
    fn from(e: CategoryError) -> Self {
        match e {
            CategoryError::NotFound(id) | CategoryError::ParentNotFound(id) => {
                BookmarkError::CategoryNotFound(id)
            }
            CategoryError::Validation(msg) => BookmarkError::Validation(msg),
            CategoryError::DatabaseError(msg) => BookmarkError::DatabaseError(msg),
        }
    }
}

// === CategoryError ===

/// Errors related to category store operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Category with the given ID does not exist or belongs to another user.
    #[error("Category not found: {0}")]
    NotFound(String),
    /// The requested parent category is not visible to the user.
    #[error("Parent category not found: {0}")]
    ParentNotFound(String),
    /// Input failed validation (empty name, bad color, cyclic parent).
    #[error("Invalid category: {0}")]
    Validation(String),
    /// Database operation failed.
    #[error("Category database error: {0}")]
    DatabaseError(String),
}

impl CategoryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CategoryError::NotFound(_) | CategoryError::ParentNotFound(_) => ErrorClass::NotFound,
            CategoryError::Validation(_) => ErrorClass::Validation,
            CategoryError::DatabaseError(_) => ErrorClass::Internal,
        }
    }

    /// True for errors caused by the caller's input (4xx class).
    pub fn is_client_error(&self) -> bool {
        self.class() != ErrorClass::Internal
    }
}

impl From<rusqlite::Error> for CategoryError {
    fn from(e: rusqlite::Error) -> Self {
        CategoryError::DatabaseError(e.to_string())
    }
}

// === FetchError ===

/// Failures of outbound HTTP calls. Never surfaced past the enrichment layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within its time budget.
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// The remote answered with a non-success status.
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),
    /// Connection, DNS or TLS failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The body could not be read or decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

// === SettingsError ===

/// Errors related to loading configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading the config file failed.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// The config file is not valid JSON for `Settings`.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// A value was out of range.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

// === AppError ===

/// Errors raised while wiring the application together at startup.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Database initialization failed: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}
