use std::rc::Rc;

use crate::types::Type;

/// A resolved binding: variable, parameter, function, class, field or method.
///
/// Entries are created once by resolution and shared read-only between every
/// node that refers to the same declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub nesting_level: usize,
    pub ty: Type,
    pub offset: i32,
}

pub type EntryRef = Rc<Entry>;

impl Entry {
    pub fn new(nesting_level: usize, ty: Type, offset: i32) -> EntryRef {
        Rc::new(Entry {
            nesting_level,
            ty,
            offset,
        })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.ty, Type::Method(_))
    }

    /// Fields are the non-method members of a class scope.
    pub fn is_field(&self) -> bool {
        !self.is_method()
    }
}

/// Binding attached to an identifier use or a call site.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub entry: EntryRef,
    /// Nesting level of the use site.
    pub nesting_level: usize,
}

impl Binding {
    /// Number of access links to follow from the use site to the frame that
    /// holds the declaration.
    pub fn hops(&self) -> usize {
        self.nesting_level.saturating_sub(self.entry.nesting_level)
    }
}

/// Binding attached to a qualified call `receiver.method(..)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    pub receiver: EntryRef,
    pub method: EntryRef,
    pub nesting_level: usize,
}

impl MethodBinding {
    pub fn hops(&self) -> usize {
        self.nesting_level.saturating_sub(self.receiver.nesting_level)
    }
}
