use std::io;

/// Everything that can go wrong while decoding a single class file.
///
/// A `MalformedClassFile` always means the byte stream being read does not
/// describe a class file this reader understands; the caller is expected to
/// either abort the whole build or skip the offending file, per
/// [`crate::index::BuildPolicy`].
#[derive(Debug, thiserror::Error)]
pub enum ClassFileError {
    #[error("truncated class file: {0}")]
    Truncated(#[from] io::Error),

    #[error("bad magic number: expected 0xCAFEBABE, found {found:#010X}")]
    BadMagic { found: u32 },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {index} out of range (pool has {len} entries)")]
    IndexOutOfRange { index: u16, len: u16 },

    #[error("constant pool index {index} does not refer to a slot reserved by a preceding Long or Double")]
    UnusableSlot { index: u16 },

    #[error("expected constant pool entry {index} to be {expected}, found {found}")]
    WrongConstantKind {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid Modified UTF-8 sequence in constant pool entry {index}")]
    InvalidModifiedUtf8 { index: u16 },

    #[error("unknown annotation element_value tag '{tag}'")]
    UnknownElementValueTag { tag: char },

    #[error("invalid type descriptor: {descriptor}")]
    InvalidDescriptor { descriptor: String },

    #[error("{attribute} attribute found outside of a method")]
    ParameterAnnotationsOutsideMethod { attribute: &'static str },

    #[error("attribute {name} declared length {declared} does not match {actual} bytes actually read")]
    AttributeLengthMismatch {
        name: String,
        declared: u32,
        actual: u32,
    },
}

/// Errors raised while assembling an [`crate::index::Index`] from many class files.
#[derive(Debug, thiserror::Error)]
pub enum IndexBuildError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),

    #[error("duplicate class {name}: already present in this build")]
    DuplicateClass { name: String },
}

/// Raised when a caller asks an [`crate::annotation::AnnotationValue`] for a kind
/// of value it does not hold.
#[derive(Debug, thiserror::Error)]
#[error("expected annotation value of kind {expected}, found {found}")]
pub struct InvalidAnnotationValueAccess {
    pub expected: &'static str,
    pub found: &'static str,
}

pub type ClassFileResult<T> = Result<T, ClassFileError>;
pub type IndexBuildResult<T> = Result<T, IndexBuildError>;
