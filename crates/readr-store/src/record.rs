//! The capability every persisted record type implements.

use crate::field::{FieldDescriptor, FieldKind};
use crate::row::FromRow;
use crate::schema::TableSchema;

/// A row-shaped entity the store can create, update, delete, and fetch.
///
/// Normally derived:
///
/// ```ignore
/// use readr_store::{NullString, NullInt, Record};
///
/// #[derive(Record)]
/// #[orm(table = "members")]
/// struct Member {
///     #[orm(id, column = "user_id")]
///     id: String,
///     name: NullString,
///     #[orm(status)]
///     active: NullInt,
/// }
/// ```
pub trait Record: FromRow + Send + Sync {
    /// Type of the identity column.
    type Id: FieldKind + Send;

    /// Static column table, in declaration order.
    fn schema() -> &'static TableSchema;

    /// Live descriptors for this instance, in the schema's column order.
    fn describe_fields(&self) -> Vec<FieldDescriptor<'_>>;

    fn identity(&self) -> &Self::Id;

    fn table() -> &'static str {
        Self::schema().table
    }
}
