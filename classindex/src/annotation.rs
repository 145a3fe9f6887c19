//! Annotation values and instances (JVMS §4.7.16): the typed tree an
//! `annotation` structure decodes into, plus the widening/narrowing
//! accessors a caller uses to read a numeric value back out as whichever
//! numeric type it expects.

use crate::error::InvalidAnnotationValueAccess;
use crate::name::DottedName;
use crate::types::Type;

/// The eight JVMS primitive element-value kinds, kept as one enum so a
/// caller can ask for any of them and get Java's narrowing-conversion
/// semantics rather than a hard type-mismatch error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(u16),
    Float(f32),
    Double(f64),
    Boolean(bool),
}

impl Numeric {
    fn as_i32(self) -> Result<i32, InvalidAnnotationValueAccess> {
        Ok(match self {
            Numeric::Byte(v) => v as i32,
            Numeric::Short(v) => v as i32,
            Numeric::Int(v) => v,
            // Java's long -> int narrowing keeps the low-order 32 bits,
            // which is exactly what `as i32` truncation does here.
            Numeric::Long(v) => v as i32,
            Numeric::Char(v) => v as i32,
            // Rust's float -> int `as` cast has saturated on overflow and
            // mapped NaN to 0 since 1.45, which is precisely JLS 5.1.3's
            // narrowing conversion from a floating type to `int`.
            Numeric::Float(v) => v as i32,
            Numeric::Double(v) => v as i32,
            Numeric::Boolean(_) => {
                return Err(InvalidAnnotationValueAccess {
                    expected: "numeric",
                    found: "boolean",
                })
            }
        })
    }

    pub fn as_byte(self) -> Result<i8, InvalidAnnotationValueAccess> {
        self.as_i32().map(|v| v as i8)
    }

    pub fn as_short(self) -> Result<i16, InvalidAnnotationValueAccess> {
        self.as_i32().map(|v| v as i16)
    }

    pub fn as_char(self) -> Result<u16, InvalidAnnotationValueAccess> {
        self.as_i32().map(|v| v as u16)
    }

    pub fn as_int(self) -> Result<i32, InvalidAnnotationValueAccess> {
        self.as_i32()
    }

    pub fn as_long(self) -> Result<i64, InvalidAnnotationValueAccess> {
        Ok(match self {
            Numeric::Byte(v) => v as i64,
            Numeric::Short(v) => v as i64,
            Numeric::Int(v) => v as i64,
            Numeric::Long(v) => v,
            Numeric::Char(v) => v as i64,
            Numeric::Float(v) => v as i64,
            Numeric::Double(v) => v as i64,
            Numeric::Boolean(_) => {
                return Err(InvalidAnnotationValueAccess {
                    expected: "numeric",
                    found: "boolean",
                })
            }
        })
    }

    pub fn as_float(self) -> Result<f32, InvalidAnnotationValueAccess> {
        Ok(match self {
            Numeric::Byte(v) => v as f32,
            Numeric::Short(v) => v as f32,
            Numeric::Int(v) => v as f32,
            Numeric::Long(v) => v as f32,
            Numeric::Char(v) => v as f32,
            Numeric::Float(v) => v,
            Numeric::Double(v) => v as f32,
            Numeric::Boolean(_) => {
                return Err(InvalidAnnotationValueAccess {
                    expected: "numeric",
                    found: "boolean",
                })
            }
        })
    }

    pub fn as_double(self) -> Result<f64, InvalidAnnotationValueAccess> {
        Ok(match self {
            Numeric::Byte(v) => v as f64,
            Numeric::Short(v) => v as f64,
            Numeric::Int(v) => v as f64,
            Numeric::Long(v) => v as f64,
            Numeric::Char(v) => v as f64,
            Numeric::Float(v) => v as f64,
            Numeric::Double(v) => v,
            Numeric::Boolean(_) => {
                return Err(InvalidAnnotationValueAccess {
                    expected: "numeric",
                    found: "boolean",
                })
            }
        })
    }

    pub fn as_boolean(self) -> Result<bool, InvalidAnnotationValueAccess> {
        match self {
            Numeric::Boolean(v) => Ok(v),
            other => Err(InvalidAnnotationValueAccess {
                expected: "boolean",
                found: other.kind_name(),
            }),
        }
    }

    fn kind_name(self) -> &'static str {
        match self {
            Numeric::Byte(_) => "byte",
            Numeric::Short(_) => "short",
            Numeric::Int(_) => "int",
            Numeric::Long(_) => "long",
            Numeric::Char(_) => "char",
            Numeric::Float(_) => "float",
            Numeric::Double(_) => "double",
            Numeric::Boolean(_) => "boolean",
        }
    }
}

/// One `element_value` entry. `name` is the annotation parameter it was
/// declared under, or empty when this value is itself an element of an
/// enclosing [`AnnotationValue::Array`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Primitive { name: String, value: Numeric },
    String { name: String, value: String },
    Class { name: String, value: Type },
    Enum { name: String, type_name: DottedName, constant_name: String },
    Nested { name: String, value: Box<AnnotationInstance> },
    Array { name: String, values: Vec<AnnotationValue> },
}

impl AnnotationValue {
    pub fn name(&self) -> &str {
        match self {
            AnnotationValue::Primitive { name, .. }
            | AnnotationValue::String { name, .. }
            | AnnotationValue::Class { name, .. }
            | AnnotationValue::Enum { name, .. }
            | AnnotationValue::Nested { name, .. }
            | AnnotationValue::Array { name, .. } => name,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            AnnotationValue::Primitive { .. } => "primitive",
            AnnotationValue::String { .. } => "string",
            AnnotationValue::Class { .. } => "class",
            AnnotationValue::Enum { .. } => "enum",
            AnnotationValue::Nested { .. } => "nested annotation",
            AnnotationValue::Array { .. } => "array",
        }
    }

    fn numeric(&self) -> Result<Numeric, InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::Primitive { value, .. } => Ok(*value),
            other => Err(InvalidAnnotationValueAccess {
                expected: "primitive",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_byte(&self) -> Result<i8, InvalidAnnotationValueAccess> {
        self.numeric()?.as_byte()
    }
    pub fn as_short(&self) -> Result<i16, InvalidAnnotationValueAccess> {
        self.numeric()?.as_short()
    }
    pub fn as_int(&self) -> Result<i32, InvalidAnnotationValueAccess> {
        self.numeric()?.as_int()
    }
    pub fn as_long(&self) -> Result<i64, InvalidAnnotationValueAccess> {
        self.numeric()?.as_long()
    }
    pub fn as_char(&self) -> Result<u16, InvalidAnnotationValueAccess> {
        self.numeric()?.as_char()
    }
    pub fn as_float(&self) -> Result<f32, InvalidAnnotationValueAccess> {
        self.numeric()?.as_float()
    }
    pub fn as_double(&self) -> Result<f64, InvalidAnnotationValueAccess> {
        self.numeric()?.as_double()
    }
    pub fn as_boolean(&self) -> Result<bool, InvalidAnnotationValueAccess> {
        self.numeric()?.as_boolean()
    }

    pub fn as_string(&self) -> Result<&str, InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::String { value, .. } => Ok(value),
            other => Err(InvalidAnnotationValueAccess {
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_class(&self) -> Result<&Type, InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::Class { value, .. } => Ok(value),
            other => Err(InvalidAnnotationValueAccess {
                expected: "class",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_enum(&self) -> Result<(&DottedName, &str), InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::Enum {
                type_name,
                constant_name,
                ..
            } => Ok((type_name, constant_name)),
            other => Err(InvalidAnnotationValueAccess {
                expected: "enum",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_nested(&self) -> Result<&AnnotationInstance, InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::Nested { value, .. } => Ok(value),
            other => Err(InvalidAnnotationValueAccess {
                expected: "nested annotation",
                found: other.kind_name(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<&[AnnotationValue], InvalidAnnotationValueAccess> {
        match self {
            AnnotationValue::Array { values, .. } => Ok(values),
            other => Err(InvalidAnnotationValueAccess {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }
}

/// Where an [`AnnotationInstance`] was found. Addressed by class name plus
/// 0-based field/method position rather than by owning pointer, so the
/// whole index stays free of reference cycles and trivially movable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    Class(DottedName),
    Field { class: DottedName, field_index: usize },
    Method { class: DottedName, method_index: usize },
    Parameter {
        class: DottedName,
        method_index: usize,
        parameter_index: usize,
    },
}

/// An applied annotation at a given site. `target` is absent for a nested
/// annotation reached through another annotation's `@`-tagged value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInstance {
    pub annotation_type: DottedName,
    pub target: Option<AnnotationTarget>,
    pub values: Vec<AnnotationValue>,
}

impl AnnotationInstance {
    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.iter().find(|v| v.name() == name)
    }
}
