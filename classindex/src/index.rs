//! The aggregate index: many class files in, one frozen, many-reader-safe
//! [`Index`] out. [`IndexBuilder::build`] is the single publication barrier
//! between the single-writer build phase and the lock-free read phase —
//! everything returned after that point is immutable.

use indexmap::IndexMap;
use std::io::{self, Write};
use std::sync::Arc;

use crate::annotation::{AnnotationInstance, AnnotationTarget, AnnotationValue, Numeric};
use crate::class_file::{read_class_file, ClassDescriptor};
use crate::error::{IndexBuildError, IndexBuildResult};
use crate::name::{DottedName, Interner};

/// How the builder reacts to a malformed class file or a class name it has
/// already seen. `LenientSkip` is the friendlier default for "scan every
/// `.class` file under this tree and do your best"; `Strict` is for callers
/// that would rather fail the whole build than produce a silently partial
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPolicy {
    Strict,
    LenientSkip,
}

pub struct IndexBuilder {
    policy: BuildPolicy,
    interner: Interner,
    classes: IndexMap<DottedName, Arc<ClassDescriptor>>,
    subclasses: IndexMap<DottedName, Vec<Arc<ClassDescriptor>>>,
    implementors: IndexMap<DottedName, Vec<Arc<ClassDescriptor>>>,
    annotations: IndexMap<DottedName, Vec<AnnotationInstance>>,
    skipped: usize,
    replaced: usize,
}

impl IndexBuilder {
    pub fn new(policy: BuildPolicy) -> Self {
        IndexBuilder {
            policy,
            interner: Interner::new(),
            classes: IndexMap::new(),
            subclasses: IndexMap::new(),
            implementors: IndexMap::new(),
            annotations: IndexMap::new(),
            skipped: 0,
            replaced: 0,
        }
    }

    /// Parses one class file's bytes and folds it into the in-progress
    /// index. A parse failure or duplicate class name either aborts the
    /// build (`Strict`) or is recorded and skipped (`LenientSkip`),
    /// depending on the policy this builder was constructed with.
    pub fn append(&mut self, class_file_bytes: &[u8]) -> IndexBuildResult<()> {
        let (descriptor, annotations) = match read_class_file(class_file_bytes, &mut self.interner)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                return match self.policy {
                    BuildPolicy::Strict => Err(IndexBuildError::ClassFile(err)),
                    BuildPolicy::LenientSkip => {
                        self.skipped += 1;
                        Ok(())
                    }
                };
            }
        };

        if self.classes.contains_key(&descriptor.name) {
            match self.policy {
                BuildPolicy::Strict => {
                    return Err(IndexBuildError::DuplicateClass {
                        name: descriptor.name.to_string(),
                    })
                }
                BuildPolicy::LenientSkip => self.replaced += 1,
            }
        }

        let descriptor = Arc::new(descriptor);

        if let Some(super_name) = &descriptor.super_name {
            self.subclasses
                .entry(super_name.clone())
                .or_default()
                .push(descriptor.clone());
        }
        for interface in &descriptor.interfaces {
            self.implementors
                .entry(interface.clone())
                .or_default()
                .push(descriptor.clone());
        }
        for annotation in annotations {
            self.annotations
                .entry(annotation.annotation_type.clone())
                .or_default()
                .push(annotation);
        }

        self.classes.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// How many class files were skipped outright due to a parse error
    /// under `LenientSkip` policy.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// How many duplicate class names were resolved by last-write-wins
    /// under `LenientSkip` policy.
    pub fn replaced_count(&self) -> usize {
        self.replaced
    }

    /// Freezes the builder into a read-only [`Index`], consuming it.
    pub fn build(self) -> Index {
        Index {
            classes: self.classes,
            subclasses: self.subclasses,
            implementors: self.implementors,
            annotations: self.annotations,
        }
    }
}

/// The frozen, read-only product of a scan. Every map and list here is
/// immutable; once built, an `Index` requires no synchronization to read
/// concurrently from many threads.
pub struct Index {
    classes: IndexMap<DottedName, Arc<ClassDescriptor>>,
    subclasses: IndexMap<DottedName, Vec<Arc<ClassDescriptor>>>,
    implementors: IndexMap<DottedName, Vec<Arc<ClassDescriptor>>>,
    annotations: IndexMap<DottedName, Vec<AnnotationInstance>>,
}

impl Index {
    pub fn get_annotations(&self, name: &DottedName) -> &[AnnotationInstance] {
        self.annotations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_known_direct_subclasses(&self, name: &DottedName) -> &[Arc<ClassDescriptor>] {
        self.subclasses.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_known_direct_implementors(&self, name: &DottedName) -> &[Arc<ClassDescriptor>] {
        self.implementors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_class_by_name(&self, name: &DottedName) -> Option<&ClassDescriptor> {
        self.classes.get(name).map(|rc| rc.as_ref())
    }

    pub fn known_classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values().map(|rc| rc.as_ref())
    }

    /// Resolves a target to a human-readable label for diagnostic dumps,
    /// reaching back into `classes` by name+position rather than following
    /// an owning pointer (see the annotation-target design note).
    pub fn render_target(&self, target: &AnnotationTarget) -> String {
        match target {
            AnnotationTarget::Class(name) => format!("Class: {name}"),
            AnnotationTarget::Field { class, field_index } => {
                let field_name = self
                    .get_class_by_name(class)
                    .and_then(|c| c.fields.get(*field_index))
                    .map(|f| f.name.as_str())
                    .unwrap_or("<unknown field>");
                format!("Field: {class}.{field_name}")
            }
            AnnotationTarget::Method { class, method_index } => {
                let method_name = self
                    .get_class_by_name(class)
                    .and_then(|c| c.methods.get(*method_index))
                    .map(|m| m.name.as_str())
                    .unwrap_or("<unknown method>");
                format!("Method: {class}.{method_name}")
            }
            AnnotationTarget::Parameter {
                class,
                method_index,
                parameter_index,
            } => {
                let method_name = self
                    .get_class_by_name(class)
                    .and_then(|c| c.methods.get(*method_index))
                    .map(|m| m.name.as_str())
                    .unwrap_or("<unknown method>");
                format!("Parameter: {class}.{method_name}#{parameter_index}")
            }
        }
    }

    pub fn print_annotations<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for (annotation_type, instances) in &self.annotations {
            writeln!(sink, "{annotation_type}:")?;
            for instance in instances {
                match &instance.target {
                    Some(target) => writeln!(sink, "    {}", self.render_target(target))?,
                    None => writeln!(sink, "    <nested>")?,
                }
                if !instance.values.is_empty() {
                    let rendered = instance
                        .values
                        .iter()
                        .map(|v| format!("{} = {}", v.name(), render_value(v)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    writeln!(sink, "        ({rendered})")?;
                }
            }
        }
        Ok(())
    }

    pub fn print_subclasses<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for (super_name, subclasses) in &self.subclasses {
            writeln!(sink, "{super_name}:")?;
            for subclass in subclasses {
                writeln!(sink, "    {}", subclass.name)?;
            }
        }
        Ok(())
    }
}

fn render_numeric(value: Numeric) -> String {
    match value {
        Numeric::Byte(v) => v.to_string(),
        Numeric::Short(v) => v.to_string(),
        Numeric::Int(v) => v.to_string(),
        Numeric::Long(v) => v.to_string(),
        Numeric::Char(v) => v.to_string(),
        Numeric::Float(v) => v.to_string(),
        Numeric::Double(v) => v.to_string(),
        Numeric::Boolean(v) => v.to_string(),
    }
}

fn render_value(value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Primitive { value, .. } => render_numeric(*value),
        AnnotationValue::String { value, .. } => format!("{value:?}"),
        AnnotationValue::Class { value, .. } => format!("{}.class", value.name()),
        AnnotationValue::Enum {
            type_name,
            constant_name,
            ..
        } => format!("{type_name}.{constant_name}"),
        AnnotationValue::Nested { value, .. } => format!("@{}", value.annotation_type),
        AnnotationValue::Array { values, .. } => {
            let items = values.iter().map(render_value).collect::<Vec<_>>().join(", ");
            format!("{{{items}}}")
        }
    }
}
