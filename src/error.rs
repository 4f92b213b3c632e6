//! Error types for Persona Panel
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - HTTP status mapping that separates caller errors from backend failures
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

use crate::persona::PersonaId;

/// Result type alias for panel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Connection errors (3xx)
    BindFailed = 300,

    // Request errors (4xx)
    RequestMalformed = 400,
    PersonaUnknown = 401,
    RequestTooLarge = 413,

    // Generation errors (5xx)
    GenerationFailed = 500,
    GenerationTimeout = 501,
    GenerationRejected = 502,
    GenerationMalformed = 503,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E401")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the panel
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Connection Errors
    // ─────────────────────────────────────────────────────────────

    /// HTTP listener could not bind
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Request Errors
    // ─────────────────────────────────────────────────────────────

    /// Request body could not be decoded
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// Request body exceeded the configured size limit
    #[error("Request body exceeds the {limit}-byte limit")]
    RequestTooLarge { limit: usize },

    /// Request named a persona that is not in the registry
    #[error("Unknown persona '{persona}'. Valid: {valid}")]
    UnknownPersona { persona: String, valid: String },

    // ─────────────────────────────────────────────────────────────
    // Generation Errors
    // ─────────────────────────────────────────────────────────────

    /// Transport-level failure talking to the generation backend
    #[error("Generation request failed: {message}")]
    GenerationFailed { message: String },

    /// Generation backend did not answer in time
    #[error("Generation request timed out after {timeout_secs}s")]
    GenerationTimeout { timeout_secs: u64 },

    /// Generation backend answered with a non-success status
    #[error("Generation backend returned {status}: {message}")]
    GenerationRejected { status: u16, message: String },

    /// Generation backend answered with an undecodable body
    #[error("Malformed generation response: {message}")]
    GenerationMalformed { message: String },

    /// A single persona's generation failed
    #[error("Persona '{persona}' failed: {source}")]
    PersonaFailed {
        persona: PersonaId,
        #[source]
        source: Box<Error>,
    },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::Bind { .. } => ErrorCode::BindFailed,

            Error::MalformedRequest { .. } => ErrorCode::RequestMalformed,
            Error::UnknownPersona { .. } => ErrorCode::PersonaUnknown,
            Error::RequestTooLarge { .. } => ErrorCode::RequestTooLarge,

            Error::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            Error::GenerationTimeout { .. } => ErrorCode::GenerationTimeout,
            Error::GenerationRejected { .. } => ErrorCode::GenerationRejected,
            Error::GenerationMalformed { .. } => ErrorCode::GenerationMalformed,
            Error::PersonaFailed { source, .. } => source.code(),

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the caller caused this error (bad input rather than a failing dependency)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedRequest { .. }
                | Error::UnknownPersona { .. }
                | Error::RequestTooLarge { .. }
        )
    }

    /// HTTP status the failure envelope is sent with
    pub fn status_code(&self) -> StatusCode {
        if let Error::RequestTooLarge { .. } = self {
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'persona-panel config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-panel config validate' to see details.",
            ),
            Error::ConfigValidation { .. } => {
                Some("Review the configuration file and fix the invalid values.")
            }
            Error::Bind { .. } => Some(
                "Another process may be using the port. Pick another one with --port or PANEL_PORT.",
            ),
            Error::UnknownPersona { .. } => {
                Some("Run 'persona-panel personas list' to see the available personas.")
            }
            Error::RequestTooLarge { .. } => {
                Some("Raise server.max_body_bytes (or PANEL_MAX_BODY_BYTES) to accept larger blueprints.")
            }
            Error::GenerationTimeout { .. } => Some(
                "The generation backend is slow or unreachable. Raise 'timeout_secs' under [generation].",
            ),
            Error::GenerationRejected { status: 401, .. }
            | Error::GenerationRejected { status: 403, .. } => Some(
                "Check the API key (PANEL_OPENAI_API_KEY or OPENAI_API_KEY).",
            ),
            Error::GenerationFailed { .. } => Some(
                "Check network connectivity and the 'base_url' under [generation].",
            ),
            Error::PersonaFailed { source, .. } => source.suggestion(),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    pub fn config_parse(message: impl Into<String>, source: toml::de::Error) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn malformed_request(message: impl Into<String>) -> Self {
        Error::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Error::GenerationFailed {
            message: message.into(),
        }
    }

    pub fn generation_malformed(message: impl Into<String>) -> Self {
        Error::GenerationMalformed {
            message: message.into(),
        }
    }

    /// Attach the persona whose generation produced this error
    pub fn for_persona(self, persona: PersonaId) -> Self {
        Error::PersonaFailed {
            persona,
            source: Box::new(self),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
