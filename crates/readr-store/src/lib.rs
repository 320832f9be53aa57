//! # readr-store
//!
//! Schema-described record persistence for PostgreSQL.
//!
//! ## Pieces
//!
//! - **Nullable values**: [`Nullable<T>`] keeps "absent" apart from a zero
//!   value across JSON, SQL parameters, and result columns
//! - **Descriptor tables**: `#[derive(Record)]` builds a static
//!   [`TableSchema`] and live [`FieldDescriptor`]s for each record type
//! - **Statement synthesis**: [`synthesize`] renders insert, full update, and
//!   partial update SQL with named placeholders; [`StatementTemplate::bind`]
//!   turns them into positional parameters
//! - **Façade**: [`Repository`] and the pool-backed [`Store`] map driver
//!   results to typed outcomes ([`StoreError`])
//!
//! ## Example
//!
//! ```ignore
//! use readr_store::{NullInt, NullString, Record, Repository, StoreConfig};
//!
//! #[derive(Debug, Record)]
//! #[orm(table = "members")]
//! struct Member {
//!     #[orm(id, column = "user_id")]
//!     id: String,
//!     name: NullString,
//!     #[orm(status)]
//!     active: NullInt,
//! }
//!
//! let repo = Repository::<Member>::new(StoreConfig::new())?.with_deleted_code(-1);
//!
//! // UPDATE members SET name = $1 WHERE user_id = $2
//! repo.update(&client, &Member {
//!     id: "u-1".into(),
//!     name: NullString::of("Alice".into()),
//!     active: NullInt::absent(),
//! })
//! .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod field;
pub mod nullable;
pub mod policy;
pub mod pool;
pub mod record;
pub mod repository;
pub mod row;
pub mod schema;
pub mod statement;
pub mod store;

pub use client::GenericClient;
pub use config::{DatabaseConfig, StoreConfig, StoreSection};
pub use error::{ExecutionFailure, StoreError, StoreResult};
pub use field::{FieldDescriptor, FieldKind, FieldValue};
pub use nullable::{
    NullBool, NullInt, NullString, NullTime, Nullable, NullableKind, ScalarKind, decode_json,
};
pub use policy::{Selection, SkippedField, TextPresence, select_partial};
pub use pool::{create_pool, create_pool_with_manager_config, create_pool_with_tls};
pub use record::Record;
pub use repository::{Repository, UpdateMode};
pub use row::{FromRow, RowExt};
pub use schema::{ColumnDef, SchemaRegistry, TableSchema};
pub use statement::{
    BoundStatement, StatementMode, StatementTemplate, TemplateCache, TemplateKey, plan,
    select_by_identity, synthesize, synthesize_with,
};
pub use store::Store;

#[cfg(feature = "derive")]
pub use readr_store_derive::Record;

pub use deadpool_postgres;

// Re-exported for derive-generated code.
#[doc(hidden)]
pub use tokio_postgres;
