use super::*;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Profile {
    name: NullString,
    birthday: NullTime,
    score: NullInt,
    verified: NullBool,
}

fn encode<T: ToSql>(value: &T, ty: &Type) -> (IsNull, BytesMut) {
    let mut buf = BytesMut::new();
    let is_null = value.to_sql(ty, &mut buf).unwrap();
    (is_null, buf)
}

#[test]
fn absent_fields_encode_as_null() {
    let json = serde_json::to_value(Profile::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": null,
            "birthday": null,
            "score": null,
            "verified": null,
        })
    );
}

#[test]
fn present_fields_encode_as_payload() {
    let profile = Profile {
        name: Nullable::of("Alice".to_string()),
        birthday: Nullable::of(Utc.with_ymd_and_hms(1990, 5, 17, 8, 30, 0).unwrap()),
        score: Nullable::of(0),
        verified: Nullable::of(false),
    };
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["birthday"], "1990-05-17T08:30:00Z");
    assert_eq!(json["score"], 0);
    assert_eq!(json["verified"], false);
}

#[test]
fn wire_round_trip_keeps_presence() {
    let profile = Profile {
        name: Nullable::of(String::new()),
        birthday: Nullable::absent(),
        score: Nullable::of(-4),
        verified: Nullable::absent(),
    };
    let text = serde_json::to_string(&profile).unwrap();
    let back: Profile = decode_json(&text).unwrap();
    assert_eq!(back, profile);
    assert!(back.name.is_present());
    assert!(back.birthday.is_absent());
}

#[test]
fn missing_and_null_both_decode_as_absent() {
    let p: Profile = decode_json(r#"{"name": null}"#).unwrap();
    assert!(p.name.is_absent());
    assert!(p.score.is_absent());
    assert_eq!(p.name.value(), "");
}

#[test]
fn malformed_token_is_a_decode_error() {
    let err = decode_json::<Profile>(r#"{"score": "ten"}"#).unwrap_err();
    assert!(matches!(err, crate::StoreError::Decode { .. }));

    let err = decode_json::<Profile>(r#"{"birthday": "yesterday"}"#).unwrap_err();
    assert!(matches!(err, crate::StoreError::Decode { .. }));
}

#[test]
fn equality_ignores_absent_payload() {
    let a = NullInt::absent();
    let b: NullInt = Nullable {
        value: 42,
        present: false,
    };
    assert_eq!(a, b);
    assert_ne!(NullInt::of(0), NullInt::absent());
    assert_ne!(NullInt::of(1), NullInt::of(2));
    assert_eq!(NullString::of("x".into()), NullString::from(Some("x".to_string())));
}

#[test]
fn absent_binds_sql_null() {
    let (is_null, buf) = encode(&NullString::absent(), &Type::TEXT);
    assert!(matches!(is_null, IsNull::Yes));
    assert!(buf.is_empty());
}

#[test]
fn column_round_trip_per_kind() {
    let name = NullString::of("Bob".into());
    let (_, buf) = encode(&name, &Type::TEXT);
    assert_eq!(NullString::from_sql(&Type::TEXT, &buf).unwrap(), name);

    let at = NullTime::of(Utc.with_ymd_and_hms(2018, 1, 2, 3, 4, 5).unwrap());
    let (_, buf) = encode(&at, &Type::TIMESTAMPTZ);
    assert_eq!(NullTime::from_sql(&Type::TIMESTAMPTZ, &buf).unwrap(), at);

    let n = NullInt::of(7);
    let (_, buf) = encode(&n, &Type::INT4);
    assert_eq!(buf.len(), 4);
    assert_eq!(NullInt::from_sql(&Type::INT4, &buf).unwrap(), n);

    let flag = NullBool::of(true);
    let (_, buf) = encode(&flag, &Type::BOOL);
    assert_eq!(NullBool::from_sql(&Type::BOOL, &buf).unwrap(), flag);
}

#[test]
fn sql_null_decodes_as_absent() {
    let v = NullTime::from_sql_nullable(&Type::TIMESTAMPTZ, None).unwrap();
    assert!(v.is_absent());
    let v = NullInt::from_sql_nullable(&Type::INT8, None).unwrap();
    assert!(v.is_absent());
}

#[test]
fn text_and_time_decode_permissively() {
    let (_, buf) = encode(&42i32, &Type::INT4);
    let v = NullString::from_sql(&Type::INT4, &buf).unwrap();
    assert_eq!(v.get().map(String::as_str), Some("42"));

    assert!(<NullTime as FromSql>::accepts(&Type::TEXT));
    let v = NullTime::from_sql(&Type::TEXT, b"not a time").unwrap();
    assert!(v.is_absent());
}

#[test]
fn text_renders_uuid_columns() {
    let (_, buf) = encode(&uuid::Uuid::nil(), &Type::UUID);
    let v = NullString::from_sql(&Type::UUID, &buf).unwrap();
    assert_eq!(
        v.get().map(String::as_str),
        Some("00000000-0000-0000-0000-000000000000")
    );
}

#[test]
fn text_from_opaque_binary_column_is_absent() {
    let v = NullString::from_sql(&Type::BYTEA, b"\x00\xff").unwrap();
    assert!(v.is_absent());

    let v = NullString::from_sql(&Type::NUMERIC, &[0, 1, 0, 0, 0, 0, 0, 0, 0, 42]).unwrap();
    assert!(v.is_absent());
}

#[test]
fn integer_and_boolean_reject_foreign_columns() {
    assert!(!<NullInt as FromSql>::accepts(&Type::TEXT));
    assert!(!<NullBool as FromSql>::accepts(&Type::INT4));
    assert!(<NullInt as FromSql>::accepts(&Type::INT2));
}

#[test]
fn integer_param_narrowing_overflow_fails() {
    let mut buf = BytesMut::new();
    let big = NullInt::of(i64::from(i32::MAX) + 1);
    assert!(big.to_sql(&Type::INT4, &mut buf).is_err());
}
