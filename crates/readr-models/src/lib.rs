//! # readr-models
//!
//! The member, post, and comment records, their pre-write rules, and the
//! configuration that supplies status codes.
//!
//! ```ignore
//! let config = AppConfig::load("readr.toml")?;
//! let models = Models::connect(&config)?;
//!
//! let client = models.client().await?;
//! let mut post = Post { id: 1, author: NullInt::of(42), ..Default::default() };
//! models.posts.create(&client, &mut post).await?;
//! models.posts.delete(&client, &post.id).await?;
//! ```

pub mod comment;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod member;
pub mod post;
pub mod service;
pub mod status;

pub use comment::Comment;
pub use config::AppConfig;
pub use error::{ModelError, ModelResult};
pub use lifecycle::Lifecycle;
pub use member::Member;
pub use post::Post;
pub use service::{Models, Service};
pub use status::{ModelKind, PublishCodes, PublishStatus, Status, StatusCodes, StatusTable};
