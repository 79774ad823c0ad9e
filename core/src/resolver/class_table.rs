//! Class layouts: the virtual table of every declared class.
//!
//! Layouts live in an arena indexed by [`ClassId`]. A subclass starts from a
//! clone of its superclass's layout, so inherited slots keep their offsets and
//! dispatch stays index based.

use hashbrown::HashMap;

use crate::ast::{Entry, EntryRef};
use crate::types::{ArrowType, ClassType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// One named slot of a class layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub entry: EntryRef,
}

/// Where a member landed when it was added to a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A new slot at the end of the table.
    Fresh,
    /// Replaced an inherited (or earlier) slot of the same kind.
    Override,
    /// The name already named a member of the other kind; a new slot was
    /// taken anyway.
    KindMismatch,
}

/// Fields and methods of one class, inherited members included.
///
/// `fields[i]` has offset `-(i + 1)`, `methods[i]` has offset `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassLayout {
    fields: Vec<Slot>,
    methods: Vec<Slot>,
    members: HashMap<String, EntryRef>,
}

impl ClassLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Slot] {
        &self.fields
    }

    pub fn methods(&self) -> &[Slot] {
        &self.methods
    }

    /// Name lookup over fields and methods; the last added member wins.
    pub fn member(&self, name: &str) -> Option<&EntryRef> {
        self.members.get(name)
    }

    pub fn method(&self, name: &str) -> Option<&EntryRef> {
        self.member(name).filter(|entry| entry.is_method())
    }

    /// Every member visible inside the class body.
    pub fn members(&self) -> &HashMap<String, EntryRef> {
        &self.members
    }

    /// Add a field at `nesting_level`, overriding an inherited field of the
    /// same name in place.
    pub fn add_field(&mut self, name: &str, ty: Type, nesting_level: usize) -> (EntryRef, Placement) {
        let (index, placement) = match self.members.get(name) {
            Some(existing) if existing.is_field() => (field_index(existing.offset), Placement::Override),
            Some(_) => (self.fields.len(), Placement::KindMismatch),
            None => (self.fields.len(), Placement::Fresh),
        };
        let entry = Entry::new(nesting_level, ty, -(index as i32) - 1);
        place(&mut self.fields, index, name, entry.clone());
        self.members.insert(name.to_string(), entry.clone());
        (entry, placement)
    }

    /// Add a method at `nesting_level`, overriding an inherited method of the
    /// same name in its dispatch slot.
    pub fn add_method(
        &mut self,
        name: &str,
        signature: ArrowType,
        nesting_level: usize,
    ) -> (EntryRef, Placement) {
        let (index, placement) = match self.members.get(name) {
            Some(existing) if existing.is_method() => (existing.offset as usize, Placement::Override),
            Some(_) => (self.methods.len(), Placement::KindMismatch),
            None => (self.methods.len(), Placement::Fresh),
        };
        let entry = Entry::new(nesting_level, Type::Method(signature), index as i32);
        place(&mut self.methods, index, name, entry.clone());
        self.members.insert(name.to_string(), entry.clone());
        (entry, placement)
    }

    /// The class shape: field types by field index, method signatures by
    /// dispatch offset.
    pub fn shape(&self) -> ClassType {
        ClassType {
            fields: self.fields.iter().map(|slot| slot.entry.ty.clone()).collect(),
            methods: self
                .methods
                .iter()
                .filter_map(|slot| slot.entry.ty.as_callable().cloned())
                .collect(),
        }
    }
}

fn field_index(offset: i32) -> usize {
    (-offset - 1) as usize
}

fn place(slots: &mut Vec<Slot>, index: usize, name: &str, entry: EntryRef) {
    let slot = Slot {
        name: name.to_string(),
        entry,
    };
    match slots.get_mut(index) {
        Some(existing) => *existing = slot,
        None => slots.push(slot),
    }
}

/// Arena of class layouts, indexed by class name.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    layouts: Vec<ClassLayout>,
    entries: Vec<Option<EntryRef>>,
    index: HashMap<String, ClassId>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout under `name`. A second class with the same name
    /// replaces the first in the index; its layout stays in the arena.
    pub fn insert(&mut self, name: &str, layout: ClassLayout, entry: EntryRef) -> ClassId {
        let id = ClassId(self.layouts.len());
        self.layouts.push(layout);
        self.entries.push(Some(entry));
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn layout(&self, id: ClassId) -> &ClassLayout {
        &self.layouts[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<&ClassLayout> {
        self.id(name).map(|id| self.layout(id))
    }

    /// Global entry of the class registered under `name`.
    pub fn entry(&self, name: &str) -> Option<&EntryRef> {
        self.id(name).and_then(|id| self.entries[id.0].as_ref())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offsets(slots: &[Slot]) -> Vec<(String, i32)> {
        slots.iter().map(|s| (s.name.clone(), s.entry.offset)).collect()
    }

    #[test]
    fn test_fresh_fields_grow_downward() {
        let mut layout = ClassLayout::new();
        layout.add_field("a", Type::Int, 1);
        layout.add_field("b", Type::Bool, 1);
        assert_eq!(
            offsets(layout.fields()),
            vec![("a".to_string(), -1), ("b".to_string(), -2)]
        );
    }

    #[test]
    fn test_inherited_method_keeps_slot() {
        let mut base = ClassLayout::new();
        base.add_method("m", ArrowType::new(vec![], Type::Int), 1);
        base.add_method("n", ArrowType::new(vec![], Type::Int), 1);

        let mut derived = base.clone();
        let (entry, placement) = derived.add_method("n", ArrowType::new(vec![], Type::Bool), 1);
        assert_eq!(placement, Placement::Override);
        assert_eq!(entry.offset, 1);
        assert_eq!(derived.methods().len(), 2);

        let (entry, placement) = derived.add_method("o", ArrowType::new(vec![], Type::Int), 1);
        assert_eq!(placement, Placement::Fresh);
        assert_eq!(entry.offset, 2);
    }

    #[test]
    fn test_field_over_method_takes_new_slot() {
        let mut layout = ClassLayout::new();
        layout.add_method("x", ArrowType::new(vec![], Type::Int), 1);
        let (entry, placement) = layout.add_field("x", Type::Int, 1);
        assert_eq!(placement, Placement::KindMismatch);
        assert_eq!(entry.offset, -1);
        assert!(layout.method("x").is_none());
    }

    #[test]
    fn test_shape_follows_slots() {
        let mut layout = ClassLayout::new();
        layout.add_field("a", Type::Int, 1);
        layout.add_method("m", ArrowType::new(vec![Type::Int], Type::Bool), 1);
        let shape = layout.shape();
        assert_eq!(shape.fields, vec![Type::Int]);
        assert_eq!(shape.methods, vec![ArrowType::new(vec![Type::Int], Type::Bool)]);
    }

    #[test]
    fn test_table_lookup_by_name() {
        let mut table = ClassTable::new();
        let entry = Entry::new(0, Type::Class(ClassType::default()), -2);
        table.insert("A", ClassLayout::new(), entry);
        assert!(table.contains("A"));
        assert_eq!(table.entry("A").map(|e| e.offset), Some(-2));
        assert!(table.lookup("B").is_none());
        assert_eq!(table.len(), 1);
    }
}
