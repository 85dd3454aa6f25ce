use indexmap::IndexMap;

use dolly_core::Value;

use crate::association::Association;
use crate::hook::Hook;
use crate::sequence::Sequence;

/// One named blueprint option.
///
/// Fields, sequences, associations and hooks share a single namespace: a
/// later option under an existing name replaces the earlier one.
#[derive(Debug, Clone)]
pub enum Attr {
    Value(Value),
    Sequence(Sequence),
    Association(Association),
    Hook(Hook),
}

/// Declarative blueprint options, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub(crate) attrs: IndexMap<String, Attr>,
    pub(crate) table: Option<String>,
    pub(crate) primary_key: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, attr: Attr) -> Self {
        self.attrs.insert(name.into(), attr);
        self
    }

    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attr(name, Attr::Value(value.into()))
    }

    pub fn sequence(self, name: impl Into<String>, sequence: Sequence) -> Self {
        self.attr(name, Attr::Sequence(sequence))
    }

    pub fn association(self, name: impl Into<String>, association: Association) -> Self {
        self.attr(name, Attr::Association(association))
    }

    pub fn hook(self, name: impl Into<String>, hook: Hook) -> Self {
        self.attr(name, Attr::Hook(hook))
    }

    /// Use `table` instead of the pluralized blueprint name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Column that receives the storage-generated identifier.
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.attrs.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn primary_key_name(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }
}
