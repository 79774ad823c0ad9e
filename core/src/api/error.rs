//! Public error types for the compiler API.
//!
//! Internal errors of each pass are converted to these public types at the
//! API boundary, in the same way for every pass: one [`Diagnostic`] per
//! recorded error.

use core::fmt;

use crate::analyzer::TypeError;
use crate::compiler::CompileError;
use crate::resolver::ResolveError;

/// Public error type for all compiler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Name resolution failed; every error found in the run is included.
    #[error("Resolution failed with {} error(s)", diagnostics.len())]
    Resolution { diagnostics: Vec<Diagnostic> },

    /// Type checking failed.
    ///
    /// Holds the recovered declaration errors plus the fatal one, if any.
    #[error("Type checking failed with {} error(s)", diagnostics.len())]
    TypeCheck { diagnostics: Vec<Diagnostic> },

    /// Code generation found a tree that was not fully resolved.
    #[error("Code generation error: {0}")]
    Codegen(#[from] CompileError),
}

impl Error {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Resolution { diagnostics } | Error::TypeCheck { diagnostics } => diagnostics,
            Error::Codegen(_) => &[],
        }
    }
}

/// A diagnostic message with the source line it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source line of the primary issue.
    pub line: u32,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "T001") for documentation lookup.
    pub code: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.severity, self.line, self.message)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref help) = self.help {
            write!(f, "\nhelp: {}", help)?;
        }
        Ok(())
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<Vec<ResolveError>> for Error {
    fn from(errors: Vec<ResolveError>) -> Self {
        Error::Resolution {
            diagnostics: errors.iter().map(ResolveError::to_diagnostic).collect(),
        }
    }
}

impl From<Vec<TypeError>> for Error {
    fn from(errors: Vec<TypeError>) -> Self {
        Error::TypeCheck {
            diagnostics: errors.iter().map(TypeError::to_diagnostic).collect(),
        }
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::TypeCheck {
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}
