//! Metadata value types
//!
//! This module defines keys, value shapes and language alternatives shared by
//! every namespace.

pub mod key;
pub mod lang_alt;
pub mod value;

pub use key::{Key, Namespace, QualifiedName};
pub use lang_alt::{LangAlt, X_DEFAULT};
pub use value::{Scalar, Value, XmpStruct};
