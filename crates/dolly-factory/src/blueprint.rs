use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use dolly_core::{Field, Fields, Record, Result, Storage, Value};

use crate::association::{Association, AssociationKind, Resolution};
use crate::hook::{Hook, Phase};
use crate::options::{Attr, Options};
use crate::sequence::Sequence;

/// Default slot of a blueprint field.
#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    Sequence(Sequence),
}

/// How the caller's overrides stand in for an association.
#[derive(Debug)]
enum Supplied {
    /// A record (or record list for has-many) was passed under the
    /// association's own name.
    Attached,
    /// A raw key was passed under the association's foreign-key column.
    ForeignKey(Value),
}

/// Named template for one record type.
///
/// Sequence counters live inside the blueprint and persist across `create`
/// calls. Association targets are shared, so a blueprint graph containing a
/// cycle of belongs-to (or has-one) relations recurses without bound; keeping
/// the graph acyclic is up to the caller.
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    table: String,
    defaults: IndexMap<String, Slot>,
    associations: IndexMap<String, Association>,
    primary_key: Option<String>,
    before_hooks: Vec<Hook>,
    after_hooks: Vec<Hook>,
}

impl Blueprint {
    /// Build a blueprint; the table defaults to the name with an `s` appended.
    pub fn new(name: impl Into<String>, options: Options) -> Self {
        let name = name.into();
        let mut blueprint = Self {
            table: format!("{name}s"),
            name,
            defaults: IndexMap::new(),
            associations: IndexMap::new(),
            primary_key: None,
            before_hooks: Vec::new(),
            after_hooks: Vec::new(),
        };
        blueprint.apply(options, true);
        blueprint
    }

    /// Overlay `options` on a copy of this blueprint.
    ///
    /// Fields, sequences, hooks, table and primary key are layered on top;
    /// the association set is kept as is and association options are ignored.
    /// Copied sequences count independently of the original.
    pub fn extend(&self, name: impl Into<String>, options: Options) -> Self {
        let mut blueprint = self.clone();
        blueprint.name = name.into();
        blueprint.apply(options, false);
        blueprint
    }

    fn apply(&mut self, options: Options, with_associations: bool) {
        if let Some(table) = options.table {
            self.table = table;
        }
        if let Some(primary_key) = options.primary_key {
            self.primary_key = Some(primary_key);
        }

        for (name, attr) in options.attrs {
            match attr {
                Attr::Value(value) => {
                    self.defaults.insert(name, Slot::Value(value));
                }
                Attr::Sequence(sequence) => {
                    self.defaults.insert(name, Slot::Sequence(sequence));
                }
                Attr::Association(association) if with_associations => {
                    self.associations.insert(name, association);
                }
                Attr::Association(_) => {
                    warn!(
                        blueprint = %self.name,
                        field = %name,
                        "association options are ignored when extending"
                    );
                }
                Attr::Hook(hook) => self.register_hook(hook),
            }
        }
    }

    fn register_hook(&mut self, hook: Hook) {
        match hook.phase() {
            Phase::Before => self.before_hooks.push(hook),
            Phase::After => self.after_hooks.push(hook),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Names of the default fields and sequences, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }

    pub fn associations(&self) -> impl Iterator<Item = (&str, &Association)> {
        self.associations
            .iter()
            .map(|(name, association)| (name.as_str(), association))
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.get(name)
    }

    pub fn hook_count(&self, phase: Phase) -> usize {
        match phase {
            Phase::Before => self.before_hooks.len(),
            Phase::After => self.after_hooks.len(),
        }
    }

    /// Rewind every sequence owned by this blueprint.
    pub fn reset_sequences(&self) {
        for slot in self.defaults.values() {
            if let Slot::Sequence(sequence) = slot {
                sequence.reset();
            }
        }
    }

    /// Materialize and persist one record.
    ///
    /// Overrides win over defaults key by key. Belongs-to associations are
    /// resolved before the insert, has-one and has-many after it, each in
    /// declaration order. A storage failure aborts the call; records already
    /// inserted for associations stay in storage.
    pub fn create(&self, overrides: Fields, storage: &mut dyn Storage) -> Result<Record> {
        debug!(
            blueprint = %self.name,
            table = %self.table,
            overrides = overrides.len(),
            "resolving blueprint"
        );

        let supplied = self.supplied_associations(&overrides);
        let mut fields = self.default_fields(&overrides);
        for (name, field) in overrides {
            fields.insert(name, field);
        }

        let mut record = Record::with_fields(self.table.as_str(), fields);
        if let Some(primary_key) = &self.primary_key {
            record.set_primary_key(primary_key.as_str());
        }

        for hook in &self.before_hooks {
            hook.run(&mut record);
        }

        self.resolve(Resolution::BeforeSave, &supplied, storage, &mut record)?;
        record.save(storage)?;
        self.resolve(Resolution::AfterSave, &supplied, storage, &mut record)?;

        for hook in &self.after_hooks {
            hook.run(&mut record);
        }

        debug!(blueprint = %self.name, table = %self.table, "record created");
        Ok(record)
    }

    /// Defaults in declaration order, with sequences advanced unless the
    /// caller overrides them.
    fn default_fields(&self, overrides: &Fields) -> Fields {
        let mut fields = Fields::new();
        for (name, slot) in &self.defaults {
            let value = match slot {
                Slot::Value(value) => value.clone(),
                // Placeholder keeps the column position; the override replaces it.
                Slot::Sequence(_) if overrides.contains(name) => Value::Null,
                Slot::Sequence(sequence) => sequence.next(),
            };
            fields.insert(name.as_str(), value);
        }
        fields
    }

    fn supplied_associations(&self, overrides: &Fields) -> HashMap<String, Supplied> {
        let mut supplied = HashMap::new();

        for (name, association) in &self.associations {
            let attached = match (overrides.get(name), association.kind()) {
                (Some(Field::Record(_)), _) => true,
                (Some(Field::Records(_)), AssociationKind::HasMany) => true,
                _ => false,
            };
            if attached {
                supplied.insert(name.clone(), Supplied::Attached);
                continue;
            }

            if let Some(Field::Scalar(value)) = overrides.get(association.foreign_key()) {
                if !value.is_null() {
                    supplied.insert(name.clone(), Supplied::ForeignKey(value.clone()));
                }
            }
        }

        supplied
    }

    fn resolve(
        &self,
        resolution: Resolution,
        supplied: &HashMap<String, Supplied>,
        storage: &mut dyn Storage,
        record: &mut Record,
    ) -> Result<()> {
        let associations = self
            .associations
            .iter()
            .filter(|(_, association)| association.resolution() == resolution);

        for (name, association) in associations {
            match supplied.get(name) {
                None => {
                    debug!(blueprint = %self.name, field = %name, "creating association");
                    let created = association.create(storage, record)?;
                    record.set(name.as_str(), created);
                }
                Some(Supplied::Attached) => {
                    debug!(blueprint = %self.name, field = %name, "using supplied association");
                    if resolution == Resolution::BeforeSave {
                        let key = record.record(name)?.value(association.key())?.clone();
                        record.set(association.foreign_key(), key);
                    }
                }
                Some(Supplied::ForeignKey(value)) => {
                    debug!(
                        blueprint = %self.name,
                        field = %name,
                        foreign_key = %association.foreign_key(),
                        "association suppressed by supplied key"
                    );
                    if resolution == Resolution::BeforeSave {
                        record.set(association.foreign_key(), value.clone());
                    }
                }
            }
        }

        Ok(())
    }
}
