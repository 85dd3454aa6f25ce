//! Blueprint resolution engine for Dolly.
//!
//! Blueprints declare default fields, sequences, associations and hooks for
//! one record type. `Blueprint::create` merges per-call overrides into those
//! defaults, creates related records before or after the owner is saved, and
//! returns the persisted record. `Factory` is the named registry tests use.

pub mod association;
pub mod blueprint;
pub mod definitions;
pub mod errors;
pub mod factory;
pub mod hook;
pub mod options;
pub mod sequence;

pub use association::{Association, AssociationKind, Resolution};
pub use blueprint::Blueprint;
pub use definitions::{AssociationDefinition, BlueprintDefinition, DefinitionFile};
pub use errors::DefinitionError;
pub use factory::Factory;
pub use hook::{Hook, Phase};
pub use options::{Attr, Options};
pub use sequence::Sequence;

pub use dolly_core::{Error, Field, Fields, Record, Result, Storage, Value};
