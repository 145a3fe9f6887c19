//! The class-file reader proper (JVMS §4): one synchronous pass over a
//! single class file's bytes producing a [`ClassDescriptor`] plus every
//! annotation instance found on the class, its fields, its methods, and its
//! method parameters.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::annotation::{AnnotationInstance, AnnotationTarget, AnnotationValue, Numeric};
use crate::constant_pool::ConstantPool;
use crate::error::{ClassFileError, ClassFileResult};
use crate::name::{DottedName, Interner};
use crate::types::{self, Type};

const CLASS_FILE_MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: Type,
    pub access_flags: FieldAccessFlags,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub return_type: Type,
    pub parameter_types: Vec<Type>,
    pub access_flags: MethodAccessFlags,
}

/// One scanned class or interface. Fields and methods are addressed by
/// their position in these two lists — that position, paired with `name`,
/// is how an [`AnnotationTarget`] finds its way back to a member without
/// holding a pointer into this struct.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    pub name: DottedName,
    pub super_name: Option<DottedName>,
    pub interfaces: Vec<DottedName>,
    pub access_flags: ClassAccessFlags,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

enum AttributeOwner<'a> {
    Class(&'a DottedName),
    Field { class: &'a DottedName, field_index: usize },
    Method { class: &'a DottedName, method_index: usize },
}

impl<'a> AttributeOwner<'a> {
    fn base_target(&self) -> AnnotationTarget {
        match *self {
            AttributeOwner::Class(name) => AnnotationTarget::Class(name.clone()),
            AttributeOwner::Field { class, field_index } => AnnotationTarget::Field {
                class: class.clone(),
                field_index,
            },
            AttributeOwner::Method { class, method_index } => AnnotationTarget::Method {
                class: class.clone(),
                method_index,
            },
        }
    }

    fn is_method(&self) -> bool {
        matches!(self, AttributeOwner::Method { .. })
    }

    fn parameter_target(&self, parameter_index: usize) -> AnnotationTarget {
        match *self {
            AttributeOwner::Method { class, method_index } => AnnotationTarget::Parameter {
                class: class.clone(),
                method_index,
                parameter_index,
            },
            _ => unreachable!("parameter_target is only called after is_method() is checked"),
        }
    }
}

/// Parses exactly one class file. Returns the class descriptor together
/// with every annotation instance found anywhere in it; the builder in
/// [`crate::index`] is what distributes those instances into the index's
/// maps.
pub fn read_class_file(
    bytes: &[u8],
    interner: &mut Interner,
) -> ClassFileResult<(ClassDescriptor, Vec<AnnotationInstance>)> {
    let mut cursor = Cursor::new(bytes);

    let magic = cursor.read_u32::<BigEndian>()?;
    if magic != CLASS_FILE_MAGIC {
        return Err(ClassFileError::BadMagic { found: magic });
    }
    let _minor_version = cursor.read_u16::<BigEndian>()?;
    let _major_version = cursor.read_u16::<BigEndian>()?;

    let pool = ConstantPool::read(&mut cursor)?;

    let access_flags = ClassAccessFlags::from_bits_retain(cursor.read_u16::<BigEndian>()?);
    let this_class_index = cursor.read_u16::<BigEndian>()?;
    let class_name = pool.read_class_name(this_class_index, interner)?;

    let super_class_index = cursor.read_u16::<BigEndian>()?;
    let super_name = if super_class_index == 0 {
        None
    } else {
        Some(pool.read_class_name(super_class_index, interner)?)
    };

    let interfaces_count = cursor.read_u16::<BigEndian>()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = cursor.read_u16::<BigEndian>()?;
        interfaces.push(pool.read_class_name(index, interner)?);
    }

    let mut annotations = Vec::new();

    let fields_count = cursor.read_u16::<BigEndian>()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for field_index in 0..fields_count as usize {
        let (field, field_annotations) =
            read_field(&mut cursor, &pool, interner, &class_name, field_index)?;
        fields.push(field);
        annotations.extend(field_annotations);
    }

    let methods_count = cursor.read_u16::<BigEndian>()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for method_index in 0..methods_count as usize {
        let (method, method_annotations) =
            read_method(&mut cursor, &pool, interner, &class_name, method_index)?;
        methods.push(method);
        annotations.extend(method_annotations);
    }

    let class_annotations = read_attributes(
        &mut cursor,
        &pool,
        interner,
        &AttributeOwner::Class(&class_name),
    )?;
    annotations.extend(class_annotations);

    let descriptor = ClassDescriptor {
        name: class_name,
        super_name,
        interfaces,
        access_flags,
        fields,
        methods,
    };
    Ok((descriptor, annotations))
}

fn read_field(
    cursor: &mut Cursor<&[u8]>,
    pool: &ConstantPool,
    interner: &mut Interner,
    class_name: &DottedName,
    field_index: usize,
) -> ClassFileResult<(FieldDescriptor, Vec<AnnotationInstance>)> {
    let access_flags = FieldAccessFlags::from_bits_retain(cursor.read_u16::<BigEndian>()?);
    let name_index = cursor.read_u16::<BigEndian>()?;
    let descriptor_index = cursor.read_u16::<BigEndian>()?;
    let name = pool.read_utf8(name_index)?.to_string();
    let descriptor_str = pool.read_utf8(descriptor_index)?;
    let descriptor = types::parse_field_descriptor(descriptor_str, interner)?;

    let owner = AttributeOwner::Field {
        class: class_name,
        field_index,
    };
    let annotations = read_attributes(cursor, pool, interner, &owner)?;

    Ok((
        FieldDescriptor {
            name,
            descriptor,
            access_flags,
        },
        annotations,
    ))
}

fn read_method(
    cursor: &mut Cursor<&[u8]>,
    pool: &ConstantPool,
    interner: &mut Interner,
    class_name: &DottedName,
    method_index: usize,
) -> ClassFileResult<(MethodDescriptor, Vec<AnnotationInstance>)> {
    let access_flags = MethodAccessFlags::from_bits_retain(cursor.read_u16::<BigEndian>()?);
    let name_index = cursor.read_u16::<BigEndian>()?;
    let descriptor_index = cursor.read_u16::<BigEndian>()?;
    let name = pool.read_utf8(name_index)?.to_string();
    let descriptor_str = pool.read_utf8(descriptor_index)?;
    let shape = types::parse_method_descriptor(descriptor_str, interner)?;

    let owner = AttributeOwner::Method {
        class: class_name,
        method_index,
    };
    let annotations = read_attributes(cursor, pool, interner, &owner)?;

    Ok((
        MethodDescriptor {
            name,
            return_type: shape.return_type,
            parameter_types: shape.parameter_types,
            access_flags,
        },
        annotations,
    ))
}

/// Reads one `attributes[]` table (class-, field-, or method-level),
/// dispatching on attribute name. Annotation-bearing attributes are
/// decoded; everything else is skipped by its declared byte length, per
/// JVMS's forward-compatibility rule for unrecognized attributes.
fn read_attributes(
    cursor: &mut Cursor<&[u8]>,
    pool: &ConstantPool,
    interner: &mut Interner,
    owner: &AttributeOwner,
) -> ClassFileResult<Vec<AnnotationInstance>> {
    let count = cursor.read_u16::<BigEndian>()?;
    let mut annotations = Vec::new();

    for _ in 0..count {
        let name_index = cursor.read_u16::<BigEndian>()?;
        let length = cursor.read_u32::<BigEndian>()?;
        let name = pool.read_utf8(name_index)?;
        let start = cursor.position();

        match name {
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                let num = cursor.read_u16::<BigEndian>()?;
                for _ in 0..num {
                    annotations.push(read_annotation(
                        cursor,
                        pool,
                        interner,
                        Some(owner.base_target()),
                    )?);
                }
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                if !owner.is_method() {
                    let attribute = if name == "RuntimeVisibleParameterAnnotations" {
                        "RuntimeVisibleParameterAnnotations"
                    } else {
                        "RuntimeInvisibleParameterAnnotations"
                    };
                    return Err(ClassFileError::ParameterAnnotationsOutsideMethod { attribute });
                }
                let num_parameters = cursor.read_u8()?;
                for parameter_index in 0..num_parameters as usize {
                    let num = cursor.read_u16::<BigEndian>()?;
                    for _ in 0..num {
                        annotations.push(read_annotation(
                            cursor,
                            pool,
                            interner,
                            Some(owner.parameter_target(parameter_index)),
                        )?);
                    }
                }
            }
            _ => {
                cursor.seek(SeekFrom::Current(length as i64))?;
            }
        }

        let consumed = cursor.position() - start;
        if consumed != length as u64 {
            return Err(ClassFileError::AttributeLengthMismatch {
                name: name.to_string(),
                declared: length,
                actual: consumed as u32,
            });
        }
    }

    Ok(annotations)
}

fn parse_annotation_type_name(
    descriptor: &str,
    interner: &mut Interner,
) -> ClassFileResult<DottedName> {
    if descriptor.len() < 2 || !descriptor.starts_with('L') || !descriptor.ends_with(';') {
        return Err(ClassFileError::InvalidDescriptor {
            descriptor: descriptor.to_string(),
        });
    }
    let internal = &descriptor[1..descriptor.len() - 1];
    Ok(interner.intern_internal_name(internal))
}

fn read_annotation(
    cursor: &mut Cursor<&[u8]>,
    pool: &ConstantPool,
    interner: &mut Interner,
    target: Option<AnnotationTarget>,
) -> ClassFileResult<AnnotationInstance> {
    let type_index = cursor.read_u16::<BigEndian>()?;
    let type_descriptor = pool.read_utf8(type_index)?;
    let annotation_type = parse_annotation_type_name(type_descriptor, interner)?;

    let num_pairs = cursor.read_u16::<BigEndian>()?;
    let mut values = Vec::with_capacity(num_pairs as usize);
    for _ in 0..num_pairs {
        let element_name_index = cursor.read_u16::<BigEndian>()?;
        let element_name = pool.read_utf8(element_name_index)?.to_string();
        values.push(read_element_value(cursor, pool, interner, element_name)?);
    }

    Ok(AnnotationInstance {
        annotation_type,
        target,
        values,
    })
}

fn read_element_value(
    cursor: &mut Cursor<&[u8]>,
    pool: &ConstantPool,
    interner: &mut Interner,
    name: String,
) -> ClassFileResult<AnnotationValue> {
    let tag = char::from(cursor.read_u8()?);
    let value = match tag {
        'B' => AnnotationValue::Primitive {
            name,
            value: Numeric::Byte(pool.read_int(cursor.read_u16::<BigEndian>()?)? as i8),
        },
        'C' => AnnotationValue::Primitive {
            name,
            value: Numeric::Char(pool.read_int(cursor.read_u16::<BigEndian>()?)? as u16),
        },
        'D' => AnnotationValue::Primitive {
            name,
            value: Numeric::Double(pool.read_double(cursor.read_u16::<BigEndian>()?)?),
        },
        'F' => AnnotationValue::Primitive {
            name,
            value: Numeric::Float(pool.read_float(cursor.read_u16::<BigEndian>()?)?),
        },
        'I' => AnnotationValue::Primitive {
            name,
            value: Numeric::Int(pool.read_int(cursor.read_u16::<BigEndian>()?)?),
        },
        'J' => AnnotationValue::Primitive {
            name,
            value: Numeric::Long(pool.read_long(cursor.read_u16::<BigEndian>()?)?),
        },
        'S' => AnnotationValue::Primitive {
            name,
            value: Numeric::Short(pool.read_int(cursor.read_u16::<BigEndian>()?)? as i16),
        },
        'Z' => AnnotationValue::Primitive {
            name,
            value: Numeric::Boolean(pool.read_int(cursor.read_u16::<BigEndian>()?)? != 0),
        },
        's' => {
            let index = cursor.read_u16::<BigEndian>()?;
            AnnotationValue::String {
                name,
                value: pool.read_utf8(index)?.to_string(),
            }
        }
        'e' => {
            let type_name_index = cursor.read_u16::<BigEndian>()?;
            let const_name_index = cursor.read_u16::<BigEndian>()?;
            let type_descriptor = pool.read_utf8(type_name_index)?;
            let type_name = parse_annotation_type_name(type_descriptor, interner)?;
            let constant_name = pool.read_utf8(const_name_index)?.to_string();
            AnnotationValue::Enum {
                name,
                type_name,
                constant_name,
            }
        }
        'c' => {
            let class_info_index = cursor.read_u16::<BigEndian>()?;
            let descriptor_str = pool.read_utf8(class_info_index)?;
            let value = types::parse_field_descriptor(descriptor_str, interner)?;
            AnnotationValue::Class { name, value }
        }
        '@' => {
            let nested = read_annotation(cursor, pool, interner, None)?;
            AnnotationValue::Nested {
                name,
                value: Box::new(nested),
            }
        }
        '[' => {
            let num_values = cursor.read_u16::<BigEndian>()?;
            let mut values = Vec::with_capacity(num_values as usize);
            for _ in 0..num_values {
                values.push(read_element_value(cursor, pool, interner, String::new())?);
            }
            AnnotationValue::Array { name, values }
        }
        other => return Err(ClassFileError::UnknownElementValueTag { tag: other }),
    };
    Ok(value)
}
