use core::fmt;

use crate::api::{Diagnostic, Severity};
use crate::ast::Line;

/// What kind of declaration a name refers to, for messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Function,
    Parameter,
    Class,
    Field,
    Method,
    Object,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Variable => "variable",
            DeclKind::Function => "function",
            DeclKind::Parameter => "parameter",
            DeclKind::Class => "class",
            DeclKind::Field => "field",
            DeclKind::Method => "method",
            DeclKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A symbol error recorded during resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveErrorKind {
    #[error("{what} '{name}' already declared")]
    Redeclared { name: String, what: DeclKind },

    #[error("{what} '{name}' not declared")]
    Undeclared { name: String, what: DeclKind },

    #[error("class '{name}' not declared")]
    UndeclaredClass { name: String },

    #[error("superclass '{name}' not declared")]
    UndeclaredSuperclass { name: String },

    #[error("object '{receiver}' has no method '{method}'")]
    UnknownMethod { receiver: String, method: String },

    #[error("'{name}' is not an object")]
    NotAnObject { name: String },

    /// A field overriding an inherited method, or the other way round.
    #[error("{what} '{name}' in class '{class}' overrides an inherited member of another kind")]
    OverrideKindMismatch {
        name: String,
        class: String,
        what: DeclKind,
    },
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, line: Line) -> Self {
        Self { kind, line }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ResolveErrorKind::Redeclared { .. } => (
                "R001",
                Some("Names must be unique within one scope; the last declaration wins"),
            ),
            ResolveErrorKind::Undeclared { .. } => (
                "R002",
                Some("Make sure the name is declared before use"),
            ),
            ResolveErrorKind::UndeclaredClass { .. } => (
                "R003",
                Some("Classes must be declared before they are referenced"),
            ),
            ResolveErrorKind::UndeclaredSuperclass { .. } => ("R004", None),
            ResolveErrorKind::UnknownMethod { .. } => (
                "R005",
                Some("Check the method name against the receiver's class"),
            ),
            ResolveErrorKind::NotAnObject { .. } => (
                "R006",
                Some("Only variables of class type have methods"),
            ),
            ResolveErrorKind::OverrideKindMismatch { .. } => (
                "R007",
                Some("A field can only override a field and a method only a method"),
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            line: self.line,
            help: help.map(|s| s.to_string()),
            code: Some(code.to_string()),
        }
    }
}
