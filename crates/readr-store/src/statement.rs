//! Statement synthesis.
//!
//! Turns a record's field descriptors into parameterized SQL text with named
//! placeholders (`:column`). Synthesis is pure: equal inputs give
//! byte-identical text, and nothing here touches shared state.
//!
//! ```rust
//! use readr_store::{FieldDescriptor, NullString, StatementMode, synthesize};
//!
//! let id = 7i64;
//! let name = NullString::of("Alice".into());
//! let bio = NullString::absent();
//! let active = true;
//! let fields = [
//!     FieldDescriptor::identity("id", &id),
//!     FieldDescriptor::field("name", &name),
//!     FieldDescriptor::field("bio", &bio),
//!     FieldDescriptor::field("active", &active),
//! ];
//!
//! let stmt = synthesize("t", StatementMode::PartialUpdate, &fields).unwrap();
//! assert_eq!(stmt.sql(), "UPDATE t SET name = :name, active = :active WHERE id = :id");
//! ```
//!
//! Column and table names are written verbatim. They must come from a
//! declared schema, never from request input.

mod cache;
mod template;

pub use cache::{TemplateCache, TemplateKey};
pub use template::{BoundStatement, StatementTemplate};

use crate::error::{StoreError, StoreResult};
use crate::field::FieldDescriptor;
use crate::policy::{TextPresence, select_partial};
use crate::schema::TableSchema;

/// What a synthesized statement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementMode {
    /// Every descriptor, identity included.
    Insert,
    /// Every non-identity descriptor in SET, identity in WHERE.
    FullUpdate,
    /// Only descriptors the presence policy selects in SET, identity in WHERE.
    PartialUpdate,
    /// Single-row lookup on the identity column.
    SelectByIdentity,
}

impl StatementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::FullUpdate => "full_update",
            Self::PartialUpdate => "partial_update",
            Self::SelectByIdentity => "select_by_identity",
        }
    }

    fn is_update(self) -> bool {
        matches!(self, Self::FullUpdate | Self::PartialUpdate)
    }
}

/// Synthesize with the legacy text-presence rule.
pub fn synthesize(
    table: &str,
    mode: StatementMode,
    descriptors: &[FieldDescriptor<'_>],
) -> StoreResult<StatementTemplate> {
    synthesize_with(table, mode, descriptors, TextPresence::default())
}

/// Synthesize a statement template for `mode`.
///
/// Update modes need exactly one identity descriptor, otherwise this is a
/// schema error. A partial update whose policy selects nothing still yields
/// a template; check [`StatementTemplate::is_empty_set`] before executing.
///
/// `SelectByIdentity` selects the descriptor columns; use
/// [`select_by_identity`] to select a whole schema.
pub fn synthesize_with(
    table: &str,
    mode: StatementMode,
    descriptors: &[FieldDescriptor<'_>],
    text: TextPresence,
) -> StoreResult<StatementTemplate> {
    plan(table, mode, descriptors, text).map(StatementTemplate::from_key)
}

/// Decide which columns a statement includes, without rendering it.
///
/// The returned key is everything the rendered text depends on, which makes
/// it the cache key for [`TemplateCache`].
pub fn plan(
    table: &str,
    mode: StatementMode,
    descriptors: &[FieldDescriptor<'_>],
    text: TextPresence,
) -> StoreResult<TemplateKey> {
    let (columns, identity) = match mode {
        StatementMode::Insert => (descriptors.iter().map(|d| d.column).collect(), None),
        StatementMode::FullUpdate => {
            let identity = single_identity(table, descriptors.iter().filter(|d| d.is_identity))?;
            let columns = descriptors
                .iter()
                .filter(|d| !d.is_identity)
                .map(|d| d.column)
                .collect();
            (columns, Some(identity))
        }
        StatementMode::PartialUpdate => {
            let selection = select_partial(descriptors, text);
            let identity = single_identity(table, selection.identities.iter().copied())?;
            (selection.set_columns(), Some(identity))
        }
        StatementMode::SelectByIdentity => {
            let identity = single_identity(table, descriptors.iter().filter(|d| d.is_identity))?;
            (descriptors.iter().map(|d| d.column).collect(), Some(identity))
        }
    };
    Ok(TemplateKey {
        table: table.to_string(),
        mode,
        columns,
        identity,
    })
}

/// `SELECT <all columns> FROM <table> WHERE <identity> = :<identity>`.
pub fn select_by_identity(schema: &TableSchema) -> StoreResult<StatementTemplate> {
    select_key(schema).map(StatementTemplate::from_key)
}

pub(crate) fn select_key(schema: &TableSchema) -> StoreResult<TemplateKey> {
    let identity = schema.identity()?.name;
    Ok(TemplateKey {
        table: schema.table.to_string(),
        mode: StatementMode::SelectByIdentity,
        columns: schema.column_names().collect(),
        identity: Some(identity),
    })
}

fn single_identity<'d, 'a: 'd>(
    table: &str,
    mut ids: impl Iterator<Item = &'d FieldDescriptor<'a>>,
) -> StoreResult<&'static str> {
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id.column),
        (None, _) => Err(StoreError::schema(format!(
            "{table}: no identity field among descriptors"
        ))),
        (Some(a), Some(b)) => Err(StoreError::schema(format!(
            "{table}: multiple identity fields ('{}', '{}')",
            a.column, b.column
        ))),
    }
}

/// Reject an update template with nothing to SET.
pub(crate) fn require_set(template: &StatementTemplate) -> StoreResult<()> {
    if template.mode().is_update() && template.is_empty_set() {
        return Err(StoreError::EmptyUpdate {
            table: template.table().to_string(),
        });
    }
    Ok(())
}
