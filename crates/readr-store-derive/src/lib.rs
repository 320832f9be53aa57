//! Derive macro for readr-store
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;
mod sql_ident;

/// Derive `Record` (and `FromRow`) for a struct.
///
/// # Example
///
/// ```ignore
/// use readr_store::{NullInt, NullString, NullTime, Record};
///
/// #[derive(Record)]
/// #[orm(table = "members")]
/// struct Member {
///     #[orm(id, column = "user_id")]
///     id: String,
///     name: NullString,
///     birthday: NullTime,
///     #[orm(status)]
///     active: NullInt,
/// }
/// ```
///
/// # Generated
///
/// - a static `TableSchema`, columns in field declaration order
/// - `describe_fields(&self)`, one `FieldDescriptor` per field
/// - `identity(&self)`, borrowing the `#[orm(id)]` field
/// - `FromRow`, decoding every column by name
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (defaults to the snake_case struct name)
/// - `#[orm(id)]` - The identity column; exactly one field must carry it
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(status)]` - Column overwritten on soft delete; at most one
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
