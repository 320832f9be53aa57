use super::{StatementMode, TemplateKey};
use crate::error::{StoreError, StoreResult};
use crate::field::FieldDescriptor;
use std::fmt;
use tokio_postgres::types::ToSql;

/// Synthesized SQL text plus the column bookkeeping needed to bind it.
///
/// The named form (`:col`) is what callers see and compare; the positional
/// form (`$n`) is what goes to the driver. Both are rendered once, at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplate {
    key: TemplateKey,
    sql: String,
    positional: String,
}

impl StatementTemplate {
    pub fn from_key(key: TemplateKey) -> Self {
        let TemplateKey {
            table,
            mode,
            columns,
            identity,
        } = &key;
        let sql = render(table, *mode, columns, *identity, |_, col| format!(":{col}"));
        let positional = render(table, *mode, columns, *identity, |n, _| format!("${n}"));
        Self {
            key,
            sql,
            positional,
        }
    }

    pub fn key(&self) -> &TemplateKey {
        &self.key
    }

    /// SQL text with named placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL text with positional `$n` placeholders, in [`Self::placeholders`] order.
    pub fn positional_sql(&self) -> &str {
        &self.positional
    }

    pub fn table(&self) -> &str {
        &self.key.table
    }

    pub fn mode(&self) -> StatementMode {
        self.key.mode
    }

    /// Included columns: the INSERT list, the SET list, or the SELECT list.
    pub fn columns(&self) -> &[&'static str] {
        &self.key.columns
    }

    /// Identity column used in WHERE, if the mode has one.
    pub fn identity(&self) -> Option<&'static str> {
        self.key.identity
    }

    /// Whether an update template ended up with nothing to SET.
    pub fn is_empty_set(&self) -> bool {
        self.key.columns.is_empty()
    }

    /// Placeholder names in positional order.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let TemplateKey {
            mode,
            columns,
            identity,
            ..
        } = &self.key;
        match mode {
            StatementMode::Insert => columns.clone(),
            StatementMode::FullUpdate | StatementMode::PartialUpdate => {
                columns.iter().copied().chain(*identity).collect()
            }
            StatementMode::SelectByIdentity => identity.iter().copied().collect(),
        }
    }

    /// Pair each placeholder with the matching descriptor's value.
    ///
    /// The WHERE placeholder binds to the descriptor carrying the identity
    /// marker. A placeholder with no matching descriptor is a schema error.
    pub fn bind<'s, 'a>(
        &'s self,
        descriptors: &[FieldDescriptor<'a>],
    ) -> StoreResult<BoundStatement<'s, 'a>> {
        let names = self.placeholders();
        let mut params = Vec::with_capacity(names.len());
        for name in names {
            let wants_identity =
                self.key.identity == Some(name) && self.key.mode != StatementMode::Insert;
            let found = descriptors
                .iter()
                .find(|d| d.column == name && (!wants_identity || d.is_identity))
                .ok_or_else(|| {
                    StoreError::schema(format!(
                        "{}: no value for placeholder ':{name}'",
                        self.key.table
                    ))
                })?;
            params.push(found.param);
        }
        Ok(BoundStatement {
            sql: &self.positional,
            params,
        })
    }
}

impl fmt::Display for StatementTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Positional SQL plus parameters, ready for the driver.
pub struct BoundStatement<'s, 'a> {
    pub sql: &'s str,
    pub params: Vec<&'a (dyn ToSql + Sync)>,
}

impl BoundStatement<'_, '_> {
    pub fn params(&self) -> &[&(dyn ToSql + Sync)] {
        &self.params
    }
}

impl fmt::Debug for BoundStatement<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStatement")
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .finish()
    }
}

fn render(
    table: &str,
    mode: StatementMode,
    columns: &[&'static str],
    identity: Option<&'static str>,
    placeholder: impl Fn(usize, &str) -> String,
) -> String {
    match mode {
        StatementMode::Insert => {
            let values: Vec<String> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| placeholder(i + 1, c))
                .collect();
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                values.join(", ")
            )
        }
        StatementMode::FullUpdate | StatementMode::PartialUpdate => {
            let set: Vec<String> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{c} = {}", placeholder(i + 1, c)))
                .collect();
            let id = identity.unwrap_or_default();
            let mut sql = format!("UPDATE {table} SET");
            if !set.is_empty() {
                sql.push(' ');
                sql.push_str(&set.join(", "));
            }
            sql.push_str(&format!(
                " WHERE {id} = {}",
                placeholder(columns.len() + 1, id)
            ));
            sql
        }
        StatementMode::SelectByIdentity => {
            let id = identity.unwrap_or_default();
            format!(
                "SELECT {} FROM {table} WHERE {id} = {}",
                columns.join(", "),
                placeholder(1, id)
            )
        }
    }
}
