//! Lexical scope stack used by name resolution.
//!
//! One [`Scope`] per nesting level, searched from the innermost scope
//! outward. The stack length always equals the current nesting level plus
//! one while a program is being resolved:
//! ```fool
//! let var x:int = 1          // level 0
//!     fun f:int(y:int) x + y // f's body at level 1 sees `y` then `x`
//! in f(2)
//! ```

use core::fmt;

use hashbrown::HashMap;

use crate::ast::EntryRef;

/// Bindings declared at one nesting level.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, EntryRef>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a scope with bindings that already exist, e.g. the members a class
    /// inherits from its superclass.
    pub fn from_bindings(bindings: HashMap<String, EntryRef>) -> Self {
        Self { bindings }
    }

    pub fn lookup(&self, name: &str) -> Option<&EntryRef> {
        self.bindings.get(name)
    }

    /// Insert a binding, returning the one it replaced in this same scope.
    pub fn declare(&mut self, name: &str, entry: EntryRef) -> Option<EntryRef> {
        self.bindings.insert(name.to_string(), entry)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A stack of scopes for name lookup.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Create a new empty scope stack.
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pop the topmost scope from the stack.
    ///
    /// Returns an error if the stack is empty.
    pub fn pop(&mut self) -> Result<Scope, PopError> {
        self.scopes.pop().ok_or(PopError::EmptyStack)
    }

    /// Drop every scope above `depth`.
    ///
    /// Used to unwind to a known depth after a subtree is done, whatever path
    /// the traversal took out of it.
    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }

    /// Current nesting level, 0 for the outermost scope.
    ///
    /// Only meaningful while at least one scope is pushed.
    pub fn nesting_level(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up a name, searching scopes from innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<&EntryRef> {
        self.scopes.iter().rev().find_map(|scope| scope.lookup(name))
    }

    /// Declare a name in the innermost scope.
    ///
    /// Returns the binding that was overwritten in that same scope, if any.
    /// Outer-scope bindings of the same name are shadowed, never reported.
    pub fn declare(&mut self, name: &str, entry: EntryRef) -> Result<Option<EntryRef>, PopError> {
        let scope = self.scopes.last_mut().ok_or(PopError::EmptyStack)?;
        Ok(scope.declare(name, entry))
    }

    /// Declare a name in the outermost scope, regardless of the current level.
    pub fn declare_global(
        &mut self,
        name: &str,
        entry: EntryRef,
    ) -> Result<Option<EntryRef>, PopError> {
        let scope = self.scopes.first_mut().ok_or(PopError::EmptyStack)?;
        Ok(scope.declare(name, entry))
    }

    /// Look a name up in the outermost scope only.
    pub fn lookup_global(&self, name: &str) -> Option<&EntryRef> {
        self.scopes.first().and_then(|scope| scope.lookup(name))
    }
}

/// Error when the stack has no scope to operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopError {
    /// The stack is empty.
    EmptyStack,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::EmptyStack => write!(f, "Cannot use an empty scope stack"),
        }
    }
}
