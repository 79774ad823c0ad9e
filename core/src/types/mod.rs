pub mod subtype;
mod types;


pub use subtype::{ClassHierarchy, is_subtype};
pub use types::{ArrowType, ClassType, Type};
