use crate::api::{Diagnostic, Severity};
use crate::ast::Line;
use crate::types::Type;

/// Type error with the line it was found at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub line: Line,
}

/// Specific kinds of type errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeErrorKind {
    /// Arithmetic operand not an integer
    #[error("Non integers in '{op}': found {left} and {right}")]
    NonIntegerOperands {
        op: String,
        left: Type,
        right: Type,
    },
    /// Neither operand is a subtype of the other
    #[error("Incompatible types in '{op}': {left} and {right}")]
    IncomparableOperands {
        op: String,
        left: Type,
        right: Type,
    },
    /// Negation of a non-integer
    #[error("Incompatible type in '!': found {found}")]
    NonIntegerNegation { found: Type },
    #[error("Non boolean condition in if: found {found}")]
    NonBooleanCondition { found: Type },
    /// Branches with no common supertype
    #[error("Incompatible types in then-else branches: {then_type} and {else_type}")]
    IncompatibleBranches { then_type: Type, else_type: Type },
    #[error("Incompatible value for variable '{name}': expected {expected}, found {found}")]
    IncompatibleValue {
        name: String,
        expected: Type,
        found: Type,
    },
    #[error("Wrong return type for '{name}': expected {expected}, found {found}")]
    WrongReturnType {
        name: String,
        expected: Type,
        found: Type,
    },
    #[error("Invocation of a non-function '{name}' of type {found}")]
    NotCallable { name: String, found: Type },
    #[error("Wrong number of arguments in the invocation of '{name}': expected {expected}, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// `position` counts from 1
    #[error("Wrong type for argument {position} in the invocation of '{name}': expected {expected}, found {found}")]
    WrongArgumentType {
        name: String,
        position: usize,
        expected: Type,
        found: Type,
    },
    /// A function or method named without calling it
    #[error("Wrong usage of function identifier '{name}'")]
    FunctionAsValue { name: String },
    #[error("Wrong usage of class identifier '{name}'")]
    ClassAsValue { name: String },
    #[error("'{name}' is not a class")]
    NotAClass { name: String },
    /// Subclass field not a subtype of the inherited one
    #[error("Field {index} of class '{class}' has type {found}, not a subtype of inherited {expected}")]
    UnsafeFieldOverride {
        class: String,
        index: usize,
        expected: Type,
        found: Type,
    },
    #[error("Method {index} of class '{class}' has type {found}, not a subtype of inherited {expected}")]
    UnsafeMethodOverride {
        class: String,
        index: usize,
        expected: Type,
        found: Type,
    },
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, line: Line) -> Self {
        Self { kind, line }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            TypeErrorKind::NonIntegerOperands { .. } => {
                ("T001", Some("Arithmetic needs int (or bool) operands"))
            }
            TypeErrorKind::IncomparableOperands { .. } => (
                "T002",
                Some("One operand's type must be a subtype of the other's"),
            ),
            TypeErrorKind::NonIntegerNegation { .. } => ("T003", None),
            TypeErrorKind::NonBooleanCondition { .. } => ("T004", None),
            TypeErrorKind::IncompatibleBranches { .. } => (
                "T005",
                Some("One branch's type must be a subtype of the other's"),
            ),
            TypeErrorKind::IncompatibleValue { .. } => ("T006", None),
            TypeErrorKind::WrongReturnType { .. } => ("T007", None),
            TypeErrorKind::NotCallable { .. } => ("T008", Some("Only functions and methods can be called")),
            TypeErrorKind::ArityMismatch { .. } => (
                "T009",
                Some("Check the number of arguments in the call"),
            ),
            TypeErrorKind::WrongArgumentType { .. } => ("T010", None),
            TypeErrorKind::FunctionAsValue { .. } => (
                "T011",
                Some("Functions can only be called, not used as values"),
            ),
            TypeErrorKind::ClassAsValue { .. } => ("T012", Some("Use 'new' to create an object")),
            TypeErrorKind::NotAClass { .. } => ("T013", None),
            TypeErrorKind::UnsafeFieldOverride { .. } => (
                "T014",
                Some("An overriding field must keep a subtype of the inherited type"),
            ),
            TypeErrorKind::UnsafeMethodOverride { .. } => (
                "T015",
                Some("An overriding method must accept at least the inherited parameters and return a subtype"),
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

/// Outcome of checking one construct that did not produce a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A binding was never attached by resolution; discarded at the nearest
    /// declaration-list boundary without a report.
    Incomplete,
    Type(TypeError),
}

impl From<TypeError> for CheckError {
    fn from(err: TypeError) -> Self {
        CheckError::Type(err)
    }
}
