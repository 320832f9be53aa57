use crate::error::ModelResult;
use crate::lifecycle::Lifecycle;
use crate::status::{ModelKind, Status, StatusTable};
use chrono::{DateTime, Utc};
use readr_store::{NullInt, NullString, NullTime, Record};
use serde::{Deserialize, Serialize};

/// A registered reader or writer.
#[derive(Debug, Clone, Default, PartialEq, Record, Serialize, Deserialize)]
#[orm(table = "members")]
#[serde(default)]
pub struct Member {
    #[orm(id, column = "user_id")]
    pub id: String,
    pub name: NullString,
    #[orm(column = "nick")]
    #[serde(rename = "nickname")]
    pub nickname: NullString,
    pub birthday: NullTime,
    pub gender: NullString,
    #[orm(column = "work")]
    #[serde(rename = "occupation")]
    pub occupation: NullString,
    pub mail: NullString,
    pub register_mode: NullString,
    #[serde(skip_serializing_if = "NullString::is_absent")]
    pub social_id: NullString,
    #[orm(column = "create_time")]
    #[serde(rename = "created_at")]
    pub created_at: NullTime,
    pub updated_at: NullTime,
    pub updated_by: NullString,
    #[serde(skip_serializing)]
    pub password: NullString,
    pub description: NullString,
    #[orm(column = "profile_picture")]
    #[serde(rename = "profile_image")]
    pub profile_image: NullString,
    pub identity: NullString,
    #[orm(column = "c_editor")]
    #[serde(rename = "custom_editor")]
    pub custom_editor: bool,
    pub hide_profile: bool,
    pub profile_push: bool,
    pub post_push: bool,
    pub comment_push: bool,
    #[orm(status)]
    pub active: NullInt,
}

impl Lifecycle for Member {
    const KIND: ModelKind = ModelKind::Member;

    fn prepare_create(&mut self, status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        self.created_at = NullTime::of(now);
        self.updated_at = NullTime::of(now);
        if self.active.is_absent() {
            self.active = NullInt::of(status.code(Self::KIND, Status::Active));
        }
        Ok(())
    }

    fn prepare_update(&mut self, _status: &StatusTable, now: DateTime<Utc>) -> ModelResult<()> {
        self.created_at = NullTime::absent();
        // Members may carry their own edit time (profile sync).
        if self.updated_at.is_absent() {
            self.updated_at = NullTime::of(now);
        }
        Ok(())
    }

    fn check_codes(&self, status: &StatusTable) -> ModelResult<()> {
        if let Some(code) = self.active.get() {
            status.validate(Self::KIND, *code)?;
        }
        Ok(())
    }
}
