use readr_models::{
    AppConfig, Comment, Lifecycle, Member, ModelError, Models, Post, PublishCodes, Service,
    StatusCodes, StatusTable,
};
use readr_store::{
    DatabaseConfig, GenericClient, NullInt, NullString, NullTime, StoreConfig, StoreError,
    StoreResult, create_pool,
};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Default)]
struct RecordingClient {
    statements: Mutex<Vec<(String, Vec<String>)>>,
    affected: Option<u64>,
}

impl RecordingClient {
    fn affecting(n: u64) -> Self {
        Self {
            affected: Some(n),
            ..Default::default()
        }
    }

    fn statements(&self) -> Vec<(String, Vec<String>)> {
        self.statements.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.statements.lock().unwrap().push((
            sql.to_string(),
            params.iter().map(|p| format!("{p:?}")).collect(),
        ));
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<Vec<Row>> {
        self.record(sql, params);
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> StoreResult<u64> {
        self.record(sql, params);
        Ok(self.affected.unwrap_or(1))
    }
}

fn status() -> StatusTable {
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

fn service<R: readr_store::Record + Lifecycle>() -> Service<R> {
    // The pool connects lazily; these tests never check a connection out.
    let pool = create_pool(&DatabaseConfig::new("postgres://readr@localhost/readr")).unwrap();
    Service::new(pool, StoreConfig::new(), status()).unwrap()
}

#[tokio::test]
async fn post_create_fills_defaults() {
    let client = RecordingClient::default();
    let mut post = Post {
        id: 10,
        author: NullInt::of(42),
        title: NullString::of("Hello".into()),
        ..Default::default()
    };
    service::<Post>().create(&client, &mut post).await.unwrap();

    assert!(post.created_at.is_present());
    assert_eq!(post.created_at, post.updated_at);
    assert_eq!(post.active, NullInt::of(1));
    assert_eq!(post.publish_status, NullInt::of(0));
    assert_eq!(post.updated_by, NullInt::of(42));

    let statements = client.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].0.starts_with("INSERT INTO posts (post_id, author, title,"));
}

#[tokio::test]
async fn post_without_author_is_rejected_before_the_store() {
    let client = RecordingClient::default();
    let mut post = Post {
        id: 10,
        ..Default::default()
    };
    let err = service::<Post>().create(&client, &mut post).await.unwrap_err();
    assert!(matches!(err, ModelError::Lifecycle(_)));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn post_update_discards_created_at_and_stamps_editor() {
    let client = RecordingClient::affecting(1);
    let mut post = Post {
        id: 10,
        author: NullInt::of(7),
        title: NullString::of("Edited".into()),
        created_at: NullTime::of(chrono::Utc::now()),
        ..Default::default()
    };
    service::<Post>().update(&client, &mut post).await.unwrap();

    assert!(post.created_at.is_absent());
    assert!(post.updated_at.is_present());
    assert_eq!(post.updated_by, NullInt::of(7));
    assert_eq!(
        client.statements()[0].0,
        "UPDATE posts SET author = $1, title = $2, updated_at = $3, updated_by = $4 WHERE post_id = $5"
    );
}

#[tokio::test]
async fn post_update_needs_an_editor() {
    let client = RecordingClient::affecting(1);
    let mut post = Post {
        id: 10,
        title: NullString::of("x".into()),
        ..Default::default()
    };
    let err = service::<Post>().update(&client, &mut post).await.unwrap_err();
    assert!(err.to_string().contains("neither updated_by nor author"));
}

#[tokio::test]
async fn unknown_status_code_is_rejected() {
    let client = RecordingClient::default();
    let mut post = Post {
        id: 1,
        author: NullInt::of(1),
        active: NullInt::of(99),
        ..Default::default()
    };
    let err = service::<Post>().create(&client, &mut post).await.unwrap_err();
    assert!(matches!(err, ModelError::InvalidStatus { model: "posts", code: 99 }));
}

#[tokio::test]
async fn member_update_keeps_supplied_updated_at() {
    let client = RecordingClient::affecting(1);
    let supplied = NullTime::of(
        chrono::DateTime::parse_from_rfc3339("2018-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
    );
    let mut member = Member {
        id: "u-1".into(),
        name: NullString::of("Alice".into()),
        updated_at: supplied.clone(),
        ..Default::default()
    };
    service::<Member>().update(&client, &mut member).await.unwrap();
    assert_eq!(member.updated_at, supplied);

    let mut fresh = Member {
        id: "u-2".into(),
        name: NullString::of("Bob".into()),
        ..Default::default()
    };
    service::<Member>().update(&client, &mut fresh).await.unwrap();
    assert!(fresh.updated_at.is_present());
}

#[tokio::test]
async fn member_create_defaults_active() {
    let client = RecordingClient::default();
    let mut member = Member {
        id: "u-1".into(),
        ..Default::default()
    };
    service::<Member>().create(&client, &mut member).await.unwrap();
    assert_eq!(member.active, NullInt::of(1));
    assert!(member.created_at.is_present());
}

#[tokio::test]
async fn delete_uses_the_model_deleted_code() {
    let client = RecordingClient::affecting(1);
    service::<Comment>().delete(&client, &5).await.unwrap();
    service::<Member>()
        .delete(&client, &"u-1".to_string())
        .await
        .unwrap();

    let statements = client.statements();
    assert_eq!(statements[0].0, "UPDATE comments SET status = $1 WHERE id = $2");
    assert_eq!(statements[0].1, vec!["Present(3)", "5"]);
    assert_eq!(statements[1].0, "UPDATE members SET active = $1 WHERE user_id = $2");
    assert_eq!(statements[1].1[0], "Present(-1)");
}

#[tokio::test]
async fn store_outcomes_pass_through() {
    let client = RecordingClient::affecting(0);
    let err = service::<Comment>().delete(&client, &5).await.unwrap_err();
    assert!(matches!(err.as_store(), Some(StoreError::NotFound(_))));

    let err = service::<Comment>().get(&client, &5).await.unwrap_err();
    assert!(err.as_store().is_some_and(StoreError::is_not_found));
}

#[test]
fn comment_create_requires_author_and_resource() {
    let mut comment = Comment {
        id: 1,
        author: NullInt::of(3),
        ..Default::default()
    };
    let err = comment
        .prepare_create(&status(), chrono::Utc::now())
        .unwrap_err();
    assert!(matches!(err, ModelError::Lifecycle(_)));

    comment.resource = NullString::of("https://www.readr.tw/post/1".into());
    comment.prepare_create(&status(), chrono::Utc::now()).unwrap();
    assert_eq!(comment.status, NullInt::of(1));
}

#[test]
fn member_json_uses_wire_names_and_hides_password() {
    let member = Member {
        id: "u-1".into(),
        nickname: NullString::of("ally".into()),
        password: NullString::of("secret".into()),
        ..Default::default()
    };
    let json = serde_json::to_value(&member).unwrap();
    assert_eq!(json["nickname"], "ally");
    assert_eq!(json["occupation"], serde_json::Value::Null);
    assert!(json.get("password").is_none());
    assert!(json.get("social_id").is_none());

    let back: Member =
        readr_store::decode_json(r#"{"id": "u-1", "nickname": "ally", "birthday": null}"#).unwrap();
    assert_eq!(back.nickname, NullString::of("ally".into()));
    assert!(back.birthday.is_absent());
}

/// Accepts connections and never answers the startup message.
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr.to_string()
}

fn config_for(host: &str, timeout_ms: u64) -> AppConfig {
    let raw = format!(
        r#"
[database]
url = "postgres://readr@{host}/readr"

[store]
query_timeout_ms = {timeout_ms}

[status.members]
active = 1
inactive = 0
deleted = -1

[status.posts]
active = 1
inactive = 0
deleted = -1

[status.comments]
active = 1
inactive = 2
deleted = 3

[status.post_publish]
draft = 0
publish = 2
schedule = 1
"#
    );
    AppConfig::from_toml_str_with(&raw, |_| None).unwrap()
}

#[tokio::test]
async fn models_client_checkout_honours_query_timeout() {
    let host = silent_server().await;
    let models = Models::connect(&config_for(&host, 100)).unwrap();
    let started = Instant::now();

    let outcome = tokio::time::timeout(Duration::from_secs(3), models.client())
        .await
        .expect("checkout ignored the query timeout");
    let Err(err) = outcome else {
        panic!("silent server produced a connection");
    };

    assert!(err.as_store().is_some_and(StoreError::is_timeout));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn every_service_checkout_is_bounded() {
    let host = silent_server().await;
    let models = Models::connect(&config_for(&host, 100)).unwrap();
    let Err(err) = models.posts.checkout().await else {
        panic!("silent server produced a connection");
    };
    assert!(err.as_store().is_some_and(StoreError::is_timeout));
    assert_eq!(models.pool().status().max_size, 16);
    assert_eq!(
        models.comments.repository().config().query_timeout,
        Some(Duration::from_millis(100))
    );
}
