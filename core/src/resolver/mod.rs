pub mod class_table;
pub mod error;
#[allow(clippy::module_inception)]
pub mod resolver;


pub use class_table::{ClassId, ClassLayout, ClassTable, Placement, Slot};
pub use error::{DeclKind, ResolveError, ResolveErrorKind};
pub use resolver::{Resolver, resolve};
