//! Pre-write rules applied to a record before it reaches the store.

use crate::error::ModelResult;
use crate::status::{ModelKind, StatusTable};
use chrono::{DateTime, Utc};

pub trait Lifecycle {
    /// Which status table governs this record's status column.
    const KIND: ModelKind;

    /// Stamp timestamps and fill defaults for a new record.
    fn prepare_create(&mut self, status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()>;

    /// Drop fields callers may not change and stamp the edit time.
    fn prepare_update(&mut self, status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()>;

    /// Reject status codes the configuration does not define.
    fn check_codes(&self, status: &StatusTable) -> ModelResult<()> {
        let _ = status;
        Ok(())
    }
}
