use std::rc::Rc;

use indexmap::IndexMap;
use tracing::info;

use dolly_core::{DEFAULT_PRIMARY_KEY, Error, Fields, Record, Result, Storage};

use crate::association::{Association, AssociationKind};
use crate::blueprint::Blueprint;
use crate::options::Options;

/// Registry of named blueprints plus the storage they create records in.
///
/// One factory is meant to live for one test (or one test process); `clear`
/// drops every definition together with its sequence counters.
pub struct Factory<S> {
    blueprints: IndexMap<String, Rc<Blueprint>>,
    storage: Option<S>,
}

impl<S> Default for Factory<S> {
    fn default() -> Self {
        Self {
            blueprints: IndexMap::new(),
            storage: None,
        }
    }
}

impl<S: Storage> Factory<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(storage: S) -> Self {
        Self {
            blueprints: IndexMap::new(),
            storage: Some(storage),
        }
    }

    /// Install the storage every later `create` persists through.
    pub fn setup(&mut self, storage: S) {
        self.storage = Some(storage);
    }

    pub fn storage(&self) -> Option<&S> {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> Option<&mut S> {
        self.storage.as_mut()
    }

    pub fn define(&mut self, name: &str, options: Options) -> Result<Rc<Blueprint>> {
        self.ensure_available(name)?;
        let blueprint = Rc::new(Blueprint::new(name, options));
        self.blueprints.insert(name.to_string(), Rc::clone(&blueprint));
        info!(blueprint = %name, table = %blueprint.table(), "blueprint defined");
        Ok(blueprint)
    }

    /// Register `name` as `base` overlaid with `options`.
    pub fn extend(&mut self, base: &str, name: &str, options: Options) -> Result<Rc<Blueprint>> {
        let parent = self
            .blueprints
            .get(base)
            .cloned()
            .ok_or_else(|| Error::MissingBaseBlueprint(base.to_string()))?;
        self.ensure_available(name)?;

        let blueprint = Rc::new(parent.extend(name, options));
        self.blueprints.insert(name.to_string(), Rc::clone(&blueprint));
        info!(blueprint = %name, base = %base, "blueprint extended");
        Ok(blueprint)
    }

    pub fn create(&mut self, name: &str, overrides: Fields) -> Result<Record> {
        let blueprint = self.blueprint(name)?;
        let storage = self.storage.as_mut().ok_or(Error::StorageNotConfigured)?;
        blueprint.create(overrides, storage)
    }

    /// Create `count` records, each with its own copy of `overrides`.
    pub fn create_list(&mut self, name: &str, count: usize, overrides: Fields) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.create(name, overrides.clone())?);
        }
        Ok(records)
    }

    pub fn blueprint(&self, name: &str) -> Result<Rc<Blueprint>> {
        self.blueprints
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnregisteredBlueprint(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    /// Registered names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blueprints.keys().map(String::as_str)
    }

    pub fn belongs_to(&self, name: &str, foreign_key: &str) -> Result<Association> {
        self.association(AssociationKind::BelongsTo, name, foreign_key)
    }

    pub fn has_one(&self, name: &str, foreign_key: &str) -> Result<Association> {
        self.association(AssociationKind::HasOne, name, foreign_key)
    }

    pub fn has_many(&self, name: &str, foreign_key: &str) -> Result<Association> {
        self.association(AssociationKind::HasMany, name, foreign_key)
    }

    /// Belongs-to reading `key` on the parent instead of `id`.
    pub fn belongs_to_with_key(&self, name: &str, foreign_key: &str, key: &str) -> Result<Association> {
        self.association_with_key(AssociationKind::BelongsTo, name, foreign_key, key)
    }

    /// Has-one reading `key` on the owner instead of `id`.
    pub fn has_one_with_key(&self, name: &str, foreign_key: &str, key: &str) -> Result<Association> {
        self.association_with_key(AssociationKind::HasOne, name, foreign_key, key)
    }

    pub fn has_many_with_key(&self, name: &str, foreign_key: &str, key: &str) -> Result<Association> {
        self.association_with_key(AssociationKind::HasMany, name, foreign_key, key)
    }

    pub fn association(
        &self,
        kind: AssociationKind,
        name: &str,
        foreign_key: &str,
    ) -> Result<Association> {
        self.association_with_key(kind, name, foreign_key, DEFAULT_PRIMARY_KEY)
    }

    pub fn association_with_key(
        &self,
        kind: AssociationKind,
        name: &str,
        foreign_key: &str,
        key: &str,
    ) -> Result<Association> {
        Ok(Association::new(kind, self.blueprint(name)?, foreign_key).with_key(key))
    }

    /// Drop every definition. The configured storage is kept.
    pub fn clear(&mut self) {
        self.blueprints.clear();
    }

    /// Rewind the sequences of every registered blueprint.
    pub fn reset_sequences(&self) {
        for blueprint in self.blueprints.values() {
            blueprint.reset_sequences();
        }
    }

    fn ensure_available(&self, name: &str) -> Result<()> {
        if self.blueprints.contains_key(name) {
            return Err(Error::DuplicateDefinition(name.to_string()));
        }
        Ok(())
    }
}
