//! The constant pool (JVMS §4.4): one contiguous table of differently-shaped
//! entries, indexed from `1` (index `0` is never a valid entry, and the slot
//! right after a `Long`/`Double` entry is reserved and equally unusable).

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

use crate::error::{ClassFileError, ClassFileResult};
use crate::name::{DottedName, Interner};

#[derive(Debug, Clone)]
enum Entry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    /// The slot following a `Long` or `Double` entry. JVMS §4.4.5: "a ... in
    /// the constant_pool table at index n+1 must be considered invalid".
    Unusable,
}

impl Entry {
    fn kind_name(&self) -> &'static str {
        match self {
            Entry::Utf8(_) => "Utf8",
            Entry::Integer(_) => "Integer",
            Entry::Float(_) => "Float",
            Entry::Long(_) => "Long",
            Entry::Double(_) => "Double",
            Entry::Class { .. } => "Class",
            Entry::String { .. } => "String",
            Entry::FieldRef { .. } => "Fieldref",
            Entry::MethodRef { .. } => "Methodref",
            Entry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            Entry::NameAndType { .. } => "NameAndType",
            Entry::Unusable => "unusable slot",
        }
    }
}

pub struct ConstantPool {
    entries: Vec<Entry>,
}

impl ConstantPool {
    /// Reads `constant_pool_count` and then that many (minus one) entries,
    /// per JVMS §4.1. `constant_pool_count` is one greater than the number
    /// of real entries, and entry indices start at 1.
    pub fn read<R: Read>(reader: &mut R) -> ClassFileResult<Self> {
        let count = reader.read_u16::<BigEndian>()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Entry::Unusable); // index 0 is never valid
        let mut index = 1u16;
        while index < count {
            let tag = reader.read_u8()?;
            let entry = match tag {
                1 => {
                    let len = reader.read_u16::<BigEndian>()?;
                    let mut buf = vec![0u8; len as usize];
                    reader.read_exact(&mut buf)?;
                    let decoded = cesu8::from_java_cesu8(&buf)
                        .map_err(|_| ClassFileError::InvalidModifiedUtf8 { index })?;
                    Entry::Utf8(decoded.into_owned())
                }
                3 => Entry::Integer(reader.read_i32::<BigEndian>()?),
                4 => Entry::Float(reader.read_f32::<BigEndian>()?),
                5 => Entry::Long(reader.read_i64::<BigEndian>()?),
                6 => Entry::Double(reader.read_f64::<BigEndian>()?),
                7 => Entry::Class {
                    name_index: reader.read_u16::<BigEndian>()?,
                },
                8 => Entry::String {
                    string_index: reader.read_u16::<BigEndian>()?,
                },
                9 => Entry::FieldRef {
                    class_index: reader.read_u16::<BigEndian>()?,
                    name_and_type_index: reader.read_u16::<BigEndian>()?,
                },
                10 => Entry::MethodRef {
                    class_index: reader.read_u16::<BigEndian>()?,
                    name_and_type_index: reader.read_u16::<BigEndian>()?,
                },
                11 => Entry::InterfaceMethodRef {
                    class_index: reader.read_u16::<BigEndian>()?,
                    name_and_type_index: reader.read_u16::<BigEndian>()?,
                },
                12 => Entry::NameAndType {
                    name_index: reader.read_u16::<BigEndian>()?,
                    descriptor_index: reader.read_u16::<BigEndian>()?,
                },
                other => return Err(ClassFileError::UnknownTag { tag: other, index }),
            };
            let occupies_two_slots = matches!(entry, Entry::Long(_) | Entry::Double(_));
            entries.push(entry);
            index += 1;
            if occupies_two_slots {
                entries.push(Entry::Unusable);
                index += 1;
            }
        }
        Ok(ConstantPool { entries })
    }

    fn get(&self, index: u16) -> ClassFileResult<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) => Err(ClassFileError::UnusableSlot { index }),
            Some(entry) => Ok(entry),
            None => Err(ClassFileError::IndexOutOfRange {
                index,
                len: self.entries.len() as u16,
            }),
        }
    }

    pub fn read_utf8(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Entry::Utf8(s) => Ok(s),
            other => Err(ClassFileError::WrongConstantKind {
                index,
                expected: "Utf8",
                found: other.kind_name(),
            }),
        }
    }

    /// Resolves a `Class` entry's internal name (`java/lang/String`) into a
    /// dotted, interner-shared name.
    pub fn read_class_name(&self, index: u16, interner: &mut Interner) -> ClassFileResult<DottedName> {
        let name_index = match self.get(index)? {
            Entry::Class { name_index } => *name_index,
            other => {
                return Err(ClassFileError::WrongConstantKind {
                    index,
                    expected: "Class",
                    found: other.kind_name(),
                })
            }
        };
        let raw = self.read_utf8(name_index)?;
        Ok(interner.intern_internal_name(raw))
    }

    pub fn read_string(&self, index: u16) -> ClassFileResult<&str> {
        let string_index = match self.get(index)? {
            Entry::String { string_index } => *string_index,
            other => {
                return Err(ClassFileError::WrongConstantKind {
                    index,
                    expected: "String",
                    found: other.kind_name(),
                })
            }
        };
        self.read_utf8(string_index)
    }

    pub fn read_int(&self, index: u16) -> ClassFileResult<i32> {
        match self.get(index)? {
            Entry::Integer(v) => Ok(*v),
            other => Err(ClassFileError::WrongConstantKind {
                index,
                expected: "Integer",
                found: other.kind_name(),
            }),
        }
    }

    pub fn read_float(&self, index: u16) -> ClassFileResult<f32> {
        match self.get(index)? {
            Entry::Float(v) => Ok(*v),
            other => Err(ClassFileError::WrongConstantKind {
                index,
                expected: "Float",
                found: other.kind_name(),
            }),
        }
    }

    pub fn read_long(&self, index: u16) -> ClassFileResult<i64> {
        match self.get(index)? {
            Entry::Long(v) => Ok(*v),
            other => Err(ClassFileError::WrongConstantKind {
                index,
                expected: "Long",
                found: other.kind_name(),
            }),
        }
    }

    pub fn read_double(&self, index: u16) -> ClassFileResult<f64> {
        match self.get(index)? {
            Entry::Double(v) => Ok(*v),
            other => Err(ClassFileError::WrongConstantKind {
                index,
                expected: "Double",
                found: other.kind_name(),
            }),
        }
    }
}
