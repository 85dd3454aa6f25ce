use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use uuid::Uuid;

use crate::record::Record;
use crate::value::Value;

/// Content of a single record field.
///
/// Only scalars become insert columns; attached records are resolved
/// relations and never reach the statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Scalar(Value),
    Record(Box<Record>),
    Records(Vec<Record>),
}

impl Field {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Field::Scalar(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Field::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Field::Records(records) => Some(records),
            _ => None,
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Scalar(value)
    }
}

impl From<Record> for Field {
    fn from(record: Record) -> Self {
        Field::Record(Box::new(record))
    }
}

impl From<Vec<Record>> for Field {
    fn from(records: Vec<Record>) -> Self {
        Field::Records(records)
    }
}

macro_rules! scalar_field_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Field {
                fn from(value: $ty) -> Self {
                    Field::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_field_from!(&str, String, bool, i32, i64, u32, f64, Uuid, NaiveDate, NaiveDateTime);

/// Insertion-ordered field map.
///
/// Serves as the record field bag and as the per-call override set passed
/// to a blueprint. Replacing an existing key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: IndexMap<String, Field>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.insert(name, field);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, field: impl Into<Field>) -> Option<Field> {
        self.entries.insert(name.into(), field.into())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.entries.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Scalar entries only, in field order.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter()
            .filter_map(|(name, field)| field.as_value().map(|value| (name, value)))
    }
}

impl<K: Into<String>, F: Into<Field>> FromIterator<(K, F)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, field) in iter {
            fields.insert(name, field);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Field);
    type IntoIter = indexmap::map::IntoIter<String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, field) in &self.entries {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}
