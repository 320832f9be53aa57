use crate::error::{ModelError, ModelResult};
use crate::lifecycle::Lifecycle;
use crate::status::{ModelKind, Status, StatusTable};
use chrono::{DateTime, Utc};
use readr_store::{NullInt, NullString, NullTime, Record};
use serde::{Deserialize, Serialize};

/// A reader comment on a resource (post, memo, or project URL).
#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[orm(table = "comments")]
#[serde(default)]
pub struct Comment {
    #[orm(id)]
    pub id: i64,
    pub author: NullInt,
    pub body: NullString,
    pub og_title: NullString,
    pub og_description: NullString,
    pub og_image: NullString,
    pub like_amount: NullInt,
    pub parent_id: NullInt,
    pub resource: NullString,
    #[orm(status)]
    pub status: NullInt,
    pub ip: NullString,
    pub created_at: NullTime,
    pub updated_at: NullTime,
}

impl Lifecycle for Comment {
    const KIND: ModelKind = ModelKind::Comment;

    fn prepare_create(&mut self, status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        if self.author.is_absent() || self.resource.is_absent() {
            return Err(ModelError::lifecycle("comment needs an author and a resource"));
        }
        self.created_at = NullTime::of(now);
        self.updated_at = NullTime::of(now);
        if self.status.is_absent() {
            self.status = NullInt::of(status.code(Self::KIND, Status::Active));
        }
        Ok(())
    }

    fn prepare_update(&mut self, _status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        self.created_at = NullTime::absent();
        self.updated_at = NullTime::of(now);
        Ok(())
    }

    fn check_codes(&self, status: &StatusTable) -> ModelResult<()> {
        if let Some(code) = self.status.get() {
            status.validate(Self::KIND, *code)?;
        }
        Ok(())
    }
}
