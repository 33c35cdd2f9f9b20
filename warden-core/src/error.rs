//! Error types for Warden.
//!
//! Provides structured errors with:
//! - Unique error codes for logs and operator tooling
//! - Source error chaining
//! - Client vs server error categorization

use thiserror::Error;

/// Result type for Warden core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes.
///
/// Codes are structured as:
/// - 1xxx: Validation errors
/// - 2xxx: Not found errors
/// - 5xxx: Storage errors
/// - 6xxx: Internal errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Validation errors (1xxx)
    InvalidKey = 1002,
    InvalidBlock = 1005,
    InvalidFormat = 1008,

    // Not found errors (2xxx)
    BlockNotFound = 2002,
    MemberNotFound = 2005,

    // Storage errors (5xxx)
    StorageRead = 5001,
    StorageWrite = 5002,
    StorageCorruption = 5003,

    // Internal errors (6xxx)
    Serialization = 6001,
    Deserialization = 6002,
    Internal = 6003,
}

impl ErrorCode {
    /// Get the numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Check if this is a client error.
    pub fn is_client_error(self) -> bool {
        (1000..5000).contains(&self.code())
    }

    /// Check if this is a server error.
    pub fn is_server_error(self) -> bool {
        self.code() >= 5000
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Errors that can occur in Warden core types.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid federation member key.
    #[error("[{code}] invalid key: {message}")]
    InvalidKey {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Block or header failed validation.
    #[error("[{code}] invalid block: {message}")]
    InvalidBlock { code: ErrorCode, message: String },

    /// Item not found.
    #[error("[{code}] not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    /// Storage operation failed.
    #[error("[{code}] storage error: {message}")]
    Storage {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization failed.
    #[error("[{code}] serialization error: {message}")]
    Serialization {
        code: ErrorCode,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error.
    #[error("[{code}] internal error: {message}")]
    Internal { code: ErrorCode, message: String },
}

impl Error {
    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidKey { code, .. } => *code,
            Error::InvalidBlock { code, .. } => *code,
            Error::NotFound { code, .. } => *code,
            Error::Storage { code, .. } => *code,
            Error::Serialization { code, .. } => *code,
            Error::Internal { code, .. } => *code,
        }
    }

    /// Check if this is a client error.
    pub fn is_client_error(&self) -> bool {
        self.code().is_client_error()
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        self.code().is_server_error()
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Create an InvalidKey error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            code: ErrorCode::InvalidKey,
            message: message.into(),
            source: None,
        }
    }

    /// Create an InvalidBlock error.
    pub fn invalid_block(message: impl Into<String>) -> Self {
        Error::InvalidBlock {
            code: ErrorCode::InvalidBlock,
            message: message.into(),
        }
    }

    /// Create a NotFound error for blocks.
    pub fn block_not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            code: ErrorCode::BlockNotFound,
            message: message.into(),
        }
    }

    /// Create a NotFound error for federation members.
    pub fn member_not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            code: ErrorCode::MemberNotFound,
            message: message.into(),
        }
    }

    /// Create a Storage read error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            code: ErrorCode::StorageRead,
            message: message.into(),
            source: None,
        }
    }

    /// Create a Storage write error.
    pub fn storage_write(message: impl Into<String>) -> Self {
        Error::Storage {
            code: ErrorCode::StorageWrite,
            message: message.into(),
            source: None,
        }
    }

    /// Create a Storage corruption error.
    pub fn corruption(message: impl Into<String>) -> Self {
        Error::Storage {
            code: ErrorCode::StorageCorruption,
            message: message.into(),
            source: None,
        }
    }

    /// Create an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            code: ErrorCode::Internal,
            message: message.into(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization {
            code: ErrorCode::Serialization,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            code: ErrorCode::Deserialization,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::InvalidKey {
            code: ErrorCode::InvalidFormat,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}

impl From<bitcoin::secp256k1::Error> for Error {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        Error::InvalidKey {
            code: ErrorCode::InvalidKey,
            message: e.to_string(),
            source: Some(Box::new(e)),
        }
    }
}
