//! Subtype relation over type descriptors.
//!
//! The relation is nominal for class references (following `extends` edges)
//! and structural for arrow types (contravariant parameters, covariant
//! return). `bool` coerces to `int` and the empty type sits below everything.

use hashbrown::HashMap;

use crate::types::{ArrowType, Type};

/// Direct-superclass edges, `class name -> superclass name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassHierarchy {
    supertypes: HashMap<String, String>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `class` directly extends `superclass`.
    pub fn add_edge(&mut self, class: impl Into<String>, superclass: impl Into<String>) {
        self.supertypes.insert(class.into(), superclass.into());
    }

    pub fn superclass(&self, class: &str) -> Option<&str> {
        self.supertypes.get(class).map(String::as_str)
    }

    /// The class itself followed by its superclasses, nearest first.
    ///
    /// The walk is bounded by the number of edges, so a malformed map with a
    /// cycle still terminates.
    pub fn ancestors<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        core::iter::successors(Some(class), move |current| self.superclass(current))
            .take(self.supertypes.len() + 1)
    }

    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        self.ancestors(class).any(|name| name == ancestor)
    }

    /// `a <: b`.
    pub fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        match (a, b) {
            (Type::Ref(a), Type::Ref(b)) => self.is_subclass(a, b),
            (Type::Arrow(a), Type::Arrow(b)) => self.is_arrow_subtype(a, b),
            _ => a.is_same_kind(b) || matches!((a, b), (Type::Bool, Type::Int)) || *a == Type::Empty,
        }
    }

    /// Mutual comparability: either side is a subtype of the other.
    pub fn are_comparable(&self, a: &Type, b: &Type) -> bool {
        self.is_subtype(a, b) || self.is_subtype(b, a)
    }

    /// The wider of two types when one is a subtype of the other.
    pub fn join(&self, a: &Type, b: &Type) -> Option<Type> {
        if self.is_subtype(a, b) {
            Some(b.clone())
        } else if self.is_subtype(b, a) {
            Some(a.clone())
        } else {
            None
        }
    }

    pub fn is_arrow_subtype(&self, a: &ArrowType, b: &ArrowType) -> bool {
        a.arity() == b.arity()
            && self.is_subtype(&a.ret, &b.ret)
            && a
                .params
                .iter()
                .zip(b.params.iter())
                .all(|(a_param, b_param)| self.is_subtype(b_param, a_param))
    }
}

/// Free-function form of [`ClassHierarchy::is_subtype`].
pub fn is_subtype(a: &Type, b: &Type, hierarchy: &ClassHierarchy) -> bool {
    hierarchy.is_subtype(a, b)
}
