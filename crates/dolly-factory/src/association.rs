use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dolly_core::{DEFAULT_PRIMARY_KEY, Field, Fields, Record, Result, Storage};

use crate::blueprint::Blueprint;

/// Relation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// The owner stores the related record's key; the related record is
    /// created first.
    BelongsTo,
    /// The related record stores the owner's key; created after the owner.
    HasOne,
    /// Like `HasOne`, attached as a list. Always creates a single record.
    HasMany,
}

/// When an association resolves relative to the owner's insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    BeforeSave,
    AfterSave,
}

impl AssociationKind {
    pub fn resolution(self) -> Resolution {
        match self {
            AssociationKind::BelongsTo => Resolution::BeforeSave,
            AssociationKind::HasOne | AssociationKind::HasMany => Resolution::AfterSave,
        }
    }
}

/// Relation from an owning blueprint to a target blueprint.
///
/// `foreign_key` is the column written on the child side of the relation,
/// `key` the column read on the parent side (`id` unless overridden). The
/// target is shared: several blueprints may point at the same one.
#[derive(Debug, Clone)]
pub struct Association {
    kind: AssociationKind,
    target: Rc<Blueprint>,
    foreign_key: String,
    key: String,
}

impl Association {
    pub fn new(kind: AssociationKind, target: Rc<Blueprint>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            foreign_key: foreign_key.into(),
            key: DEFAULT_PRIMARY_KEY.to_string(),
        }
    }

    pub fn belongs_to(target: Rc<Blueprint>, foreign_key: impl Into<String>) -> Self {
        Self::new(AssociationKind::BelongsTo, target, foreign_key)
    }

    pub fn has_one(target: Rc<Blueprint>, foreign_key: impl Into<String>) -> Self {
        Self::new(AssociationKind::HasOne, target, foreign_key)
    }

    pub fn has_many(target: Rc<Blueprint>, foreign_key: impl Into<String>) -> Self {
        Self::new(AssociationKind::HasMany, target, foreign_key)
    }

    /// Read `key` instead of `id` on the parent side.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    pub fn resolution(&self) -> Resolution {
        self.kind.resolution()
    }

    pub fn target(&self) -> &Rc<Blueprint> {
        &self.target
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Create the related record(s) for `owner`.
    ///
    /// Belongs-to creates the parent and writes its key into the owner's
    /// foreign key. Has-one and has-many read `owner[key]`, which must exist
    /// by then (normally the primary key assigned by `save`).
    pub fn create(&self, storage: &mut dyn Storage, owner: &mut Record) -> Result<Field> {
        match self.kind {
            AssociationKind::BelongsTo => {
                let parent = self.target.create(Fields::new(), storage)?;
                let key = parent.value(&self.key)?.clone();
                debug!(
                    target_blueprint = %self.target.name(),
                    foreign_key = %self.foreign_key,
                    key = %key,
                    "belongs-to parent created"
                );
                owner.set(self.foreign_key.as_str(), key);
                Ok(Field::from(parent))
            }
            AssociationKind::HasOne => Ok(Field::from(self.create_child(storage, owner)?)),
            AssociationKind::HasMany => Ok(Field::Records(vec![self.create_child(storage, owner)?])),
        }
    }

    fn create_child(&self, storage: &mut dyn Storage, owner: &Record) -> Result<Record> {
        let key = owner.value(&self.key)?.clone();
        debug!(
            target_blueprint = %self.target.name(),
            foreign_key = %self.foreign_key,
            key = %key,
            "creating child record"
        );
        self.target
            .create(Fields::new().with(self.foreign_key.as_str(), key), storage)
    }
}
