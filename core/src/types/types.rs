use core::fmt::Display;

/// A type descriptor.
///
/// The same representation is used for type annotations written in the
/// source program and for the types computed by the checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    // Primitives.
    Int,
    Bool,

    /// Bottom type of `null`, a subtype of everything.
    Empty,

    /// Statically dispatched function.
    Arrow(ArrowType),

    /// Virtually dispatched method, wrapping its functional type.
    Method(ArrowType),

    /// Reference to an object of the named class.
    Ref(String),

    /// Shape of a class, carried only by the declaring class's own entry.
    Class(ClassType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrowType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
}

/// Fields and methods of a class, both indexed by slot.
///
/// Field `i` lives at offset `-(i + 1)` of the object, method `i` at index
/// `i` of the dispatch table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub fields: Vec<Type>,
    pub methods: Vec<ArrowType>,
}

impl Type {
    pub fn arrow(params: Vec<Type>, ret: Type) -> Type {
        Type::Arrow(ArrowType::new(params, ret))
    }

    pub fn method(params: Vec<Type>, ret: Type) -> Type {
        Type::Method(ArrowType::new(params, ret))
    }

    pub fn class_ref(name: impl Into<String>) -> Type {
        Type::Ref(name.into())
    }

    /// The functional type behind a callable: functions and methods alike.
    pub fn as_callable(&self) -> Option<&ArrowType> {
        match self {
            Type::Arrow(arrow) | Type::Method(arrow) => Some(arrow),
            _ => None,
        }
    }

    pub fn is_same_kind(&self, other: &Type) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Names of the classes this type mentions, for well-formedness checks.
    pub fn referenced_classes(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_classes(&mut names);
        names
    }

    fn collect_classes<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Type::Int | Type::Bool | Type::Empty => {}
            Type::Ref(name) => names.push(name),
            Type::Arrow(arrow) | Type::Method(arrow) => arrow.collect_classes(names),
            Type::Class(class) => {
                for field in &class.fields {
                    field.collect_classes(names);
                }
                for method in &class.methods {
                    method.collect_classes(names);
                }
            }
        }
    }
}

impl ArrowType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        ArrowType {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    fn collect_classes<'a>(&'a self, names: &mut Vec<&'a str>) {
        for param in &self.params {
            param.collect_classes(names);
        }
        self.ret.collect_classes(names);
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Empty => write!(f, "null"),
            Type::Arrow(arrow) => write!(f, "{}", arrow),
            Type::Method(arrow) => write!(f, "method {}", arrow),
            Type::Ref(name) => write!(f, "{}", name),
            Type::Class(class) => {
                let field_strs: Vec<String> = class.fields.iter().map(|ty| ty.to_string()).collect();
                let method_strs: Vec<String> =
                    class.methods.iter().map(|m| m.to_string()).collect();
                write!(
                    f,
                    "class {{ fields: [{}], methods: [{}] }}",
                    field_strs.join(", "),
                    method_strs.join(", ")
                )
            }
        }
    }
}

impl Display for ArrowType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let param_strs: Vec<String> = self.params.iter().map(|ty| ty.to_string()).collect();
        write!(f, "({}) -> {}", param_strs.join(", "), self.ret)
    }
}
