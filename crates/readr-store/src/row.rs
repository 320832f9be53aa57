//! Row mapping traits

use crate::error::{StoreError, StoreResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust struct.
///
/// `#[derive(Record)]` implements this alongside [`crate::Record`]. A row
/// either decodes completely or not at all; callers never observe a
/// partially populated value.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> StoreResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning `StoreError::Decode` on failure
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> StoreResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column).map_err(|e| column_error(column, e))
    }
}

/// Missing columns and type mismatches both surface as [`StoreError::Decode`].
fn column_error(column: &str, err: tokio_postgres::Error) -> StoreError {
    StoreError::decode(column, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_failure_is_a_decode_error() {
        let cause = "not a url ::"
            .parse::<tokio_postgres::Config>()
            .unwrap_err();
        let message = cause.to_string();

        let err = column_error("score", cause);
        assert!(matches!(
            err,
            StoreError::Decode { ref column, message: ref m } if column == "score" && *m == message
        ));
        assert!(!err.is_execution_error());
    }
}
