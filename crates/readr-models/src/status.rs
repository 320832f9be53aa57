//! Typed status codes, resolved from configuration at load time.
//!
//! Storage keeps plain integers. Each model kind maps [`Status`] (and, for
//! posts, [`PublishStatus`]) onto its own integer codes.

use crate::error::{ModelError, ModelResult};
use serde::Deserialize;

/// Lifecycle state of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Active,
    Inactive,
    Deleted,
}

/// Editorial state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishStatus {
    Draft,
    Publish,
    Schedule,
}

/// Which code table a record uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Member,
    Post,
    Comment,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "members",
            Self::Post => "posts",
            Self::Comment => "comments",
        }
    }
}

/// `[status.<model>]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusCodes {
    pub active: i64,
    pub inactive: i64,
    pub deleted: i64,
}

impl StatusCodes {
    pub fn code(&self, status: Status) -> i64 {
        match status {
            Status::Active => self.active,
            Status::Inactive => self.inactive,
            Status::Deleted => self.deleted,
        }
    }

    pub fn status(&self, code: i64) -> Option<Status> {
        [Status::Active, Status::Inactive, Status::Deleted]
            .into_iter()
            .find(|s| self.code(*s) == code)
    }

    fn check_distinct(&self, model: &str) -> ModelResult<()> {
        distinct(model, &[self.active, self.inactive, self.deleted])
    }
}

/// `[status.post_publish]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishCodes {
    pub draft: i64,
    pub publish: i64,
    pub schedule: i64,
}

impl PublishCodes {
    pub fn code(&self, status: PublishStatus) -> i64 {
        match status {
            PublishStatus::Draft => self.draft,
            PublishStatus::Publish => self.publish,
            PublishStatus::Schedule => self.schedule,
        }
    }

    pub fn status(&self, code: i64) -> Option<PublishStatus> {
        [
            PublishStatus::Draft,
            PublishStatus::Publish,
            PublishStatus::Schedule,
        ]
        .into_iter()
        .find(|s| self.code(*s) == code)
    }
}

/// Every status code the models use.
///
/// ```toml
/// [status.members]
/// active = 1
/// inactive = 0
/// deleted = -1
///
/// [status.post_publish]
/// draft = 0
/// publish = 2
/// schedule = 1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusTable {
    pub members: StatusCodes,
    pub posts: StatusCodes,
    pub comments: StatusCodes,
    pub post_publish: PublishCodes,
}

impl StatusTable {
    pub fn codes(&self, kind: ModelKind) -> &StatusCodes {
        match kind {
            ModelKind::Member => &self.members,
            ModelKind::Post => &self.posts,
            ModelKind::Comment => &self.comments,
        }
    }

    pub fn code(&self, kind: ModelKind, status: Status) -> i64 {
        self.codes(kind).code(status)
    }

    pub fn publish_code(&self, status: PublishStatus) -> i64 {
        self.post_publish.code(status)
    }

    /// Resolve an incoming status code, rejecting anything unconfigured.
    pub fn validate(&self, kind: ModelKind, code: i64) -> ModelResult<Status> {
        self.codes(kind)
            .status(code)
            .ok_or(ModelError::InvalidStatus {
                model: kind.as_str(),
                code,
            })
    }

    pub fn validate_publish(&self, code: i64) -> ModelResult<PublishStatus> {
        self.post_publish
            .status(code)
            .ok_or(ModelError::InvalidStatus {
                model: "post_publish",
                code,
            })
    }

    /// Codes must be distinct within each table.
    pub fn check(&self) -> ModelResult<()> {
        self.members.check_distinct("members")?;
        self.posts.check_distinct("posts")?;
        self.comments.check_distinct("comments")?;
        let p = &self.post_publish;
        distinct("post_publish", &[p.draft, p.publish, p.schedule])
    }
}

fn distinct(model: &str, codes: &[i64]) -> ModelResult<()> {
    for (i, code) in codes.iter().enumerate() {
        if codes[..i].contains(code) {
            return Err(ModelError::config(format!(
                "status.{model}: code {code} is used twice"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StatusTable {
        let codes = StatusCodes {
            active: 1,
            inactive: 0,
            deleted: -1,
        };
        StatusTable {
            members: codes,
            posts: codes,
            comments: StatusCodes {
                active: 1,
                inactive: 2,
                deleted: 3,
            },
            post_publish: PublishCodes {
                draft: 0,
                publish: 2,
                schedule: 1,
            },
        }
    }

    #[test]
    fn codes_resolve_both_ways() {
        let t = table();
        assert_eq!(t.code(ModelKind::Post, Status::Deleted), -1);
        assert_eq!(t.code(ModelKind::Comment, Status::Deleted), 3);
        assert_eq!(t.validate(ModelKind::Member, 0).unwrap(), Status::Inactive);
        assert_eq!(t.publish_code(PublishStatus::Schedule), 1);
        assert_eq!(t.validate_publish(2).unwrap(), PublishStatus::Publish);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let t = table();
        let err = t.validate(ModelKind::Post, 9).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidStatus {
                model: "posts",
                code: 9
            }
        ));
        assert!(t.validate_publish(-5).is_err());
    }

    #[test]
    fn duplicate_codes_fail_check() {
        let mut t = table();
        assert!(t.check().is_ok());
        t.posts.deleted = t.posts.active;
        let err = t.check().unwrap_err();
        assert!(err.to_string().contains("status.posts"));
    }
}
