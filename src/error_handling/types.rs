use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadAddressFormatting(String),
    BadPort(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadAddressFormatting(e) => write!(f, "Address formatting error: {}", e),
            ConfigError::BadPort(e) => write!(f, "Port error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures reported by a `Storage` backend.
///
/// Lookups never fail; they return an empty or absent result instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The referenced entity does not exist.
    NotFound(String),
    /// A uniqueness invariant would be broken (duplicate handle).
    Conflict(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(e) => write!(f, "Not found: {}", e),
            StorageError::Conflict(e) => write!(f, "Conflict: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

/// Malformed request input, rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Failures surfaced by the HTTP layer, one variant per response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    MethodNotAllowed,
    Conflict(String),
    Internal(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadRequest(e) => write!(f, "Bad request: {}", e),
            WebError::Unauthorized => write!(f, "Authentication required"),
            WebError::Forbidden => write!(f, "Forbidden"),
            WebError::NotFound(e) => write!(f, "{}", e),
            WebError::MethodNotAllowed => write!(f, "Method not allowed"),
            WebError::Conflict(e) => write!(f, "{}", e),
            WebError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

impl From<StorageError> for WebError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(e) => WebError::NotFound(e),
            StorageError::Conflict(e) => WebError::Conflict(e),
        }
    }
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        WebError::BadRequest(err.to_string())
    }
}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    WebError(WebError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}
