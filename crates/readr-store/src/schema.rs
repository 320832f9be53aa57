//! Static per-record-type column tables and the registry that validates them.

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use std::collections::HashMap;

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub is_identity: bool,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            is_identity: false,
            nullable: false,
        }
    }

    pub const fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Declaration-ordered column table for one record type.
///
/// ```rust
/// use readr_store::{ColumnDef, TableSchema};
///
/// const MEMBERS: TableSchema = TableSchema::new(
///     "members",
///     &[
///         ColumnDef::new("user_id").identity(),
///         ColumnDef::new("name").nullable(),
///         ColumnDef::new("active").nullable(),
///     ],
/// )
/// .with_status_column("active");
///
/// assert!(MEMBERS.validate().is_ok());
/// assert_eq!(MEMBERS.identity().unwrap().name, "user_id");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [ColumnDef],
    /// Column overwritten with the "deleted" code on soft delete.
    pub status_column: Option<&'static str>,
}

impl TableSchema {
    pub const fn new(table: &'static str, columns: &'static [ColumnDef]) -> Self {
        Self {
            table,
            columns,
            status_column: None,
        }
    }

    pub const fn with_status_column(mut self, column: &'static str) -> Self {
        self.status_column = Some(column);
        self
    }

    /// Check the table shape: valid identifiers, no duplicate columns,
    /// exactly one identity column, and a status column that exists and is
    /// not the identity.
    pub fn validate(&self) -> StoreResult<()> {
        if !is_valid_sql_ident(self.table) {
            return Err(StoreError::schema(format!(
                "invalid table name '{}'",
                self.table
            )));
        }

        for (idx, col) in self.columns.iter().enumerate() {
            if !is_valid_sql_ident(col.name) {
                return Err(StoreError::schema(format!(
                    "{}: invalid column name '{}'",
                    self.table, col.name
                )));
            }
            if self.columns[..idx].iter().any(|c| c.name == col.name) {
                return Err(StoreError::schema(format!(
                    "{}: duplicate column '{}'",
                    self.table, col.name
                )));
            }
        }

        self.identity()?;

        if let Some(status) = self.status_column {
            match self.column(status) {
                None => {
                    return Err(StoreError::schema(format!(
                        "{}: status column '{}' is not declared",
                        self.table, status
                    )));
                }
                Some(col) if col.is_identity => {
                    return Err(StoreError::schema(format!(
                        "{}: status column '{}' cannot be the identity column",
                        self.table, status
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// The single identity column.
    pub fn identity(&self) -> StoreResult<&ColumnDef> {
        let mut ids = self.columns.iter().filter(|c| c.is_identity);
        match (ids.next(), ids.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(StoreError::schema(format!(
                "{}: no identity column declared",
                self.table
            ))),
            (Some(a), Some(b)) => Err(StoreError::schema(format!(
                "{}: multiple identity columns ('{}', '{}')",
                self.table, a.name, b.name
            ))),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if this table has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Registry for record schemas.
///
/// Register every record type at startup; registration fails fast on a bad
/// shape so no request ever sees it.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: HashMap<&'static str, TableSchema>,
}

impl SchemaRegistry {
    /// Create a new empty schema registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a record type.
    ///
    /// Re-registering an identical schema is a no-op. Two different shapes
    /// claiming the same table is a schema error.
    pub fn register<R: Record>(&mut self) -> StoreResult<&TableSchema> {
        self.register_schema(*R::schema())
    }

    pub fn register_schema(&mut self, schema: TableSchema) -> StoreResult<&TableSchema> {
        schema.validate()?;
        if let Some(existing) = self.tables.get(schema.table) {
            if *existing != schema {
                return Err(StoreError::schema(format!(
                    "{}: registered twice with different columns",
                    schema.table
                )));
            }
        }
        tracing::debug!(
            target: "readr_store::schema",
            table = schema.table,
            columns = schema.columns.len(),
            "registered record schema"
        );
        Ok(self.tables.entry(schema.table).or_insert(schema))
    }

    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
