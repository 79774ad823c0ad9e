#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod error;


pub use analyzer::{analyze, hierarchy_of};
pub use error::{CheckError, TypeError, TypeErrorKind};
