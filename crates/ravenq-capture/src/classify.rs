//! Closed classification of captured errors onto the backend severity
//! scale.

use ravenq_core::Severity;

/// Severity carried by structured application errors, on the host
/// application's own scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppSeverity {
    Deprecation,
    Notice,
    Warning,
    Recoverable,
    Fatal,
}

impl AppSeverity {
    /// Translate onto the backend's severity scale.
    pub fn translate(&self) -> Severity {
        match self {
            AppSeverity::Deprecation => Severity::Warning,
            AppSeverity::Notice => Severity::Info,
            AppSeverity::Warning => Severity::Warning,
            AppSeverity::Recoverable => Severity::Error,
            AppSeverity::Fatal => Severity::Fatal,
        }
    }
}

/// A captured error, either a structured application error carrying an
/// explicit severity or a generic error classified fatal.
#[derive(Debug, Clone)]
pub enum CapturedError {
    Structured {
        message: String,
        severity: AppSeverity,
    },
    Generic {
        type_name: String,
        message: String,
    },
}

impl CapturedError {
    pub fn structured(message: impl Into<String>, severity: AppSeverity) -> Self {
        CapturedError::Structured {
            message: message.into(),
            severity,
        }
    }

    /// Wrap any error type, recording its type name for the event body.
    pub fn generic<E: std::fmt::Display>(error: &E) -> Self {
        CapturedError::Generic {
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CapturedError::Structured { message, .. } => message,
            CapturedError::Generic { message, .. } => message,
        }
    }

    /// Unstructured errors default to fatal.
    pub fn severity(&self) -> Severity {
        match self {
            CapturedError::Structured { severity, .. } => severity.translate(),
            CapturedError::Generic { .. } => Severity::Fatal,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            CapturedError::Structured { .. } => "ApplicationError",
            CapturedError::Generic { type_name, .. } => type_name,
        }
    }
}
