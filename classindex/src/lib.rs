//! Reads Java class files (JVMS §4) and builds a static index over the
//! `RuntimeVisible`/`RuntimeInvisible` annotations, superclasses, and
//! declared interfaces they contain, so a caller can later ask "who is
//! annotated with X" or "what implements Y" without re-parsing anything.
//!
//! The crate is split into the constant-pool and class-file readers
//! ([`constant_pool`], [`class_file`]), the typed value model an annotation
//! decodes into ([`annotation`], [`types`]), the dotted-name interner
//! ([`name`]) that keeps the whole thing memory-light, and the builder that
//! ties many class files together into one frozen [`index::Index`].

pub mod access_flags;
pub mod annotation;
pub mod class_file;
pub mod constant_pool;
pub mod error;
pub mod index;
pub mod name;
pub mod types;

pub use annotation::{AnnotationInstance, AnnotationTarget, AnnotationValue, Numeric};
pub use class_file::{read_class_file, ClassDescriptor, FieldDescriptor, MethodDescriptor};
pub use error::{ClassFileError, IndexBuildError, InvalidAnnotationValueAccess};
pub use index::{BuildPolicy, Index, IndexBuilder};
pub use name::{DottedName, Interner};
pub use types::{Primitive, Type, TypeKind};
