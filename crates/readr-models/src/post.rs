use crate::error::{ModelError, ModelResult};
use crate::lifecycle::Lifecycle;
use crate::status::{ModelKind, PublishStatus, Status, StatusTable};
use chrono::{DateTime, Utc};
use readr_store::{NullInt, NullString, NullTime, Record};
use serde::{Deserialize, Serialize};

/// An article, link, or video entry.
#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[orm(table = "posts")]
#[serde(default)]
pub struct Post {
    #[orm(id, column = "post_id")]
    pub id: i64,
    pub author: NullInt,
    pub title: NullString,
    pub content: NullString,
    #[orm(column = "type")]
    #[serde(rename = "type")]
    pub kind: NullInt,
    pub link: NullString,
    pub og_title: NullString,
    pub og_description: NullString,
    pub og_image: NullString,
    #[orm(status)]
    pub active: NullInt,
    pub publish_status: NullInt,
    pub comment_amount: NullInt,
    pub created_at: NullTime,
    pub updated_at: NullTime,
    pub updated_by: NullInt,
    pub published_at: NullTime,
}

impl Post {
    /// `updated_by` if set, otherwise the author.
    fn stamp_editor(&mut self) -> ModelResult<()> {
        if self.updated_by.is_present() {
            return Ok(());
        }
        match self.author.get() {
            Some(author) => {
                self.updated_by = NullInt::of(*author);
                Ok(())
            }
            None => Err(ModelError::lifecycle(
                "neither updated_by nor author is set",
            )),
        }
    }
}

impl Lifecycle for Post {
    const KIND: ModelKind = ModelKind::Post;

    fn prepare_create(&mut self, status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        if self.author.is_absent() {
            return Err(ModelError::lifecycle("post author is required"));
        }
        self.created_at = NullTime::of(now);
        self.updated_at = NullTime::of(now);
        if self.active.is_absent() {
            self.active = NullInt::of(status.code(Self::KIND, Status::Active));
        }
        if self.publish_status.is_absent() {
            self.publish_status = NullInt::of(status.publish_code(PublishStatus::Draft));
        }
        self.stamp_editor()
    }

    fn prepare_update(&mut self, _status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        self.created_at = NullTime::absent();
        self.updated_at = NullTime::of(now);
        self.stamp_editor()
    }

    fn check_codes(&self, status: &StatusTable) -> ModelResult<()> {
        if let Some(code) = self.active.get() {
            status.validate(Self::KIND, *code)?;
        }
        if let Some(code) = self.publish_status.get() {
            status.validate_publish(*code)?;
        }
        Ok(())
    }
}
