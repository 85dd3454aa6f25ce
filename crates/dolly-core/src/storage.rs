use rand::Rng;

use crate::error::StorageError;
use crate::value::Value;

/// Capability the factory persists records through.
///
/// Implementations own connection handling and dialect details; the factory
/// only quotes scalars, runs single-row inserts and asks for the generated
/// identifier.
pub trait Storage {
    /// Escape a scalar for embedding between single quotes.
    fn quote(&self, value: &Value) -> String;

    /// Execute a statement.
    fn query(&mut self, statement: &str) -> Result<(), StorageError>;

    /// Identifier generated by the most recent insert, if the engine has one.
    fn last_insert_id(&mut self) -> Option<Value>;
}

/// Adapter that accepts everything and persists nothing.
///
/// Hands out random identifiers so primary-key assignment still happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blackhole;

impl Blackhole {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for Blackhole {
    fn quote(&self, value: &Value) -> String {
        value.to_string()
    }

    fn query(&mut self, _statement: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn last_insert_id(&mut self) -> Option<Value> {
        Some(Value::Int(rand::rng().random_range(1..=10_000)))
    }
}

/// In-memory adapter that records every statement it is given.
///
/// Identifiers are sequential from 1. Used by tests to observe insert order
/// and by the CLI for dry runs.
#[derive(Debug, Clone)]
pub struct RecordingStorage {
    statements: Vec<String>,
    next_id: i64,
    last_id: Option<i64>,
    generate_ids: bool,
    /// Successful queries still allowed before the armed failure fires.
    failure: Option<(usize, String)>,
}

impl Default for RecordingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            next_id: 0,
            last_id: None,
            generate_ids: true,
            failure: None,
        }
    }

    /// Storage whose inserts never report a generated identifier.
    pub fn without_ids() -> Self {
        Self {
            generate_ids: false,
            ..Self::new()
        }
    }

    /// Make the next `query` call fail with `message`.
    pub fn fail_next_query(&mut self, message: impl Into<String>) {
        self.fail_query_after(0, message);
    }

    /// Let `successes` queries through, then fail the one after them with
    /// `message`. Failures fire once.
    pub fn fail_query_after(&mut self, successes: usize, message: impl Into<String>) {
        self.failure = Some((successes, message.into()));
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn take_statements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }

    /// Position of the first statement inserting into `table`.
    pub fn position_of(&self, table: &str) -> Option<usize> {
        let prefix = format!("INSERT INTO {table} (");
        self.statements
            .iter()
            .position(|statement| statement.starts_with(&prefix))
    }

    pub fn reset(&mut self) {
        *self = Self {
            generate_ids: self.generate_ids,
            ..Self::new()
        };
    }
}

impl Storage for RecordingStorage {
    fn quote(&self, value: &Value) -> String {
        value.to_string().replace('\'', "''")
    }

    fn query(&mut self, statement: &str) -> Result<(), StorageError> {
        match self.failure.take() {
            Some((0, message)) => {
                self.last_id = None;
                return Err(StorageError::new(message));
            }
            Some((remaining, message)) => self.failure = Some((remaining - 1, message)),
            None => {}
        }

        self.statements.push(statement.to_string());
        if self.generate_ids {
            self.next_id += 1;
            self.last_id = Some(self.next_id);
        }
        Ok(())
    }

    fn last_insert_id(&mut self) -> Option<Value> {
        self.last_id.map(Value::Int)
    }
}
