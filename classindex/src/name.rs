//! Dotted Java names (`java.lang.String`), interned and shared by component.
//!
//! Most names seen while scanning a set of class files share long common
//! prefixes (`java.lang.*`, `java.util.*`, the caller's own package). Rather
//! than store a fresh `String` per occurrence, each name is a chain of
//! `(parent, local component)` nodes, and the chain is deduplicated through
//! an [`Interner`] scoped to one index build.

use std::cmp::Eq;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

struct NameNode {
    parent: Option<DottedName>,
    local: String,
    rendered: String,
    /// Whether this node came from the shared intern table. Informational
    /// only: equality and hashing never look at it, so a [`DottedName::simple`]
    /// leaf compares equal to an interned name with the same rendered form.
    shared: bool,
}

/// A fully-qualified Java name, e.g. `java.lang.String`.
///
/// Cloning is a reference-count bump, not a string copy. Two `DottedName`s
/// are equal exactly when their dotted renderings match, regardless of
/// whether either went through the intern table.
#[derive(Clone)]
pub struct DottedName(Arc<NameNode>);

impl DottedName {
    /// Build a name directly from an already-dotted string, without
    /// consulting an [`Interner`]. Useful for one-off names that are not
    /// worth sharing (diagnostics, synthetic labels); structurally and
    /// hash-equal to an interned name with the same text, but not
    /// deduplicated against it.
    pub fn simple(flat: impl Into<String>) -> Self {
        let rendered = flat.into();
        DottedName(Arc::new(NameNode {
            parent: None,
            local: rendered.clone(),
            rendered,
            shared: false,
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.0.rendered
    }

    pub fn local_component(&self) -> &str {
        &self.0.local
    }

    pub fn parent(&self) -> Option<&DottedName> {
        self.0.parent.as_ref()
    }

    pub fn is_shared(&self) -> bool {
        self.0.shared
    }
}

impl PartialEq for DottedName {
    fn eq(&self, other: &Self) -> bool {
        self.0.rendered == other.0.rendered
    }
}

impl Eq for DottedName {}

impl Hash for DottedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.rendered.hash(state);
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.rendered)
    }
}

impl fmt::Debug for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DottedName({})", self.0.rendered)
    }
}

/// Deduplicates [`DottedName`] chains for the lifetime of one index build.
///
/// Scoped per-builder rather than process-wide: separate builds never share
/// mutable state, which keeps a frozen [`crate::index::Index`] trivially
/// `Send`/`Sync` without needing a lock around the table itself.
#[derive(Default)]
pub struct Interner {
    components: std::collections::HashMap<(Option<DottedName>, String), DottedName>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a single `(parent, local)` step, reusing a previously interned
    /// node for the same pair if one exists.
    pub fn intern_component(&mut self, parent: Option<DottedName>, local: &str) -> DottedName {
        let key = (parent.clone(), local.to_string());
        if let Some(existing) = self.components.get(&key) {
            return existing.clone();
        }
        let rendered = match &parent {
            Some(p) => format!("{}.{}", p.as_str(), local),
            None => local.to_string(),
        };
        let node = DottedName(Arc::new(NameNode {
            parent,
            local: local.to_string(),
            rendered,
            shared: true,
        }));
        self.components.insert(key, node.clone());
        node
    }

    /// Intern a dot-separated fully-qualified name, e.g. `java.lang.String`.
    pub fn intern(&mut self, flat: &str) -> DottedName {
        self.intern_with_separator(flat, '.')
    }

    /// Intern a class-file internal name (`/`-separated, e.g.
    /// `java/lang/String`) directly into dotted form, without an
    /// intermediate string replace.
    pub fn intern_internal_name(&mut self, internal: &str) -> DottedName {
        self.intern_with_separator(internal, '/')
    }

    fn intern_with_separator(&mut self, name: &str, sep: char) -> DottedName {
        let mut current: Option<DottedName> = None;
        for component in name.split(sep) {
            current = Some(self.intern_component(current, component));
        }
        current.unwrap_or_else(|| self.intern_component(None, ""))
    }
}
