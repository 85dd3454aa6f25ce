use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::DEFAULT_PRIMARY_KEY;
use crate::error::{Error, Result};
use crate::field::{Field, Fields};
use crate::sql::InsertStatement;
use crate::storage::Storage;
use crate::value::Value;

/// Materialized row bound to a table.
///
/// A record starts out as the merged field set of a blueprint, is mutated by
/// hooks and association resolution, and becomes persisted once `save`
/// succeeds. Attached association records travel inside the field bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: String,
    primary_key: Option<String>,
    fields: Fields,
}

impl Record {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_fields(table, Fields::new())
    }

    pub fn with_fields(table: impl Into<String>, fields: Fields) -> Self {
        Self {
            table: table.into(),
            primary_key: None,
            fields,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Replace the whole field bag.
    pub fn set_fields(&mut self, fields: Fields) {
        self.fields = fields;
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn set_primary_key(&mut self, name: impl Into<String>) {
        self.primary_key = Some(name.into());
    }

    pub fn get(&self, name: &str) -> Result<&Field> {
        self.fields.get(name).ok_or_else(|| Error::UnknownField {
            table: self.table.clone(),
            field: name.to_string(),
        })
    }

    /// Scalar value of a field.
    pub fn value(&self, name: &str) -> Result<&Value> {
        self.get(name)?.as_value().ok_or_else(|| Error::NotScalar {
            table: self.table.clone(),
            field: name.to_string(),
        })
    }

    /// Single attached record, e.g. the result of a belongs-to association.
    pub fn record(&self, name: &str) -> Result<&Record> {
        self.get(name)?.as_record().ok_or_else(|| Error::NotRecord {
            table: self.table.clone(),
            field: name.to_string(),
        })
    }

    /// Attached record list, e.g. the result of a has-many association.
    pub fn records(&self, name: &str) -> Result<&[Record]> {
        self.get(name)?.as_records().ok_or_else(|| Error::NotRecordList {
            table: self.table.clone(),
            field: name.to_string(),
        })
    }

    pub fn set(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        self.fields.insert(name, field);
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Build the insert for every scalar field, quoted through `storage`.
    pub fn insert_statement(&self, storage: &dyn Storage) -> InsertStatement {
        let mut statement = InsertStatement::new(self.table.as_str());
        for (name, value) in self.fields.scalars() {
            statement.push(name, storage.quote(value));
        }
        statement
    }

    /// Insert the record and adopt the identifier the storage generated.
    ///
    /// The identifier goes to the declared primary key. Without one, `id`
    /// becomes the primary key unless the caller already supplied an `id`.
    pub fn save(&mut self, storage: &mut dyn Storage) -> Result<()> {
        let statement = self.insert_statement(storage).to_string();
        debug!(table = %self.table, statement = %statement, "inserting record");

        if let Err(err) = storage.query(&statement) {
            warn!(table = %self.table, error = %err, "insert failed");
            return Err(err.into());
        }

        let Some(id) = storage.last_insert_id().filter(Value::is_truthy) else {
            debug!(table = %self.table, "storage returned no insert id");
            return Ok(());
        };

        match self.primary_key.clone() {
            Some(primary_key) => {
                self.fields.insert(primary_key, id);
            }
            None if !self.has_id() => {
                self.primary_key = Some(DEFAULT_PRIMARY_KEY.to_string());
                self.fields.insert(DEFAULT_PRIMARY_KEY, id);
            }
            None => {
                debug!(table = %self.table, "keeping caller supplied id");
            }
        }

        Ok(())
    }

    fn has_id(&self) -> bool {
        match self.fields.get(DEFAULT_PRIMARY_KEY) {
            Some(Field::Scalar(value)) => !value.is_null(),
            Some(_) => true,
            None => false,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
