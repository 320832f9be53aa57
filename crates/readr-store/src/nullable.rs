//! Nullable scalar wrappers.
//!
//! [`Nullable<T>`] keeps "absent/null" apart from "present with a value" on
//! every boundary the store touches:
//!
//! - wire JSON: `null` or a missing field decodes as absent, absent encodes
//!   as `null` (missing fields need `#[serde(default)]` on the container);
//! - database column: SQL `NULL` decodes as absent, absent binds as `NULL`;
//! - in memory: [`Nullable::is_present`] is the authoritative flag.
//!
//! Column decoding is asymmetric. Text and timestamp kinds accept any
//! column type and fall back to a permissive conversion: text renders the
//! value when the column type has a known text form, and anything else
//! decodes as absent. Integer and boolean kinds only accept their own
//! column types, so a mismatch surfaces as a decode error from the row
//! accessor.

use crate::error::StoreResult;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// Scalar families a nullable wrapper (or a plain field) can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Timestamp,
    Integer,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// Per-kind database codec used by [`Nullable<T>`].
pub trait NullableKind: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: ScalarKind;

    /// Whether a column of type `ty` may be decoded into this kind.
    fn accepts_column(ty: &Type) -> bool;

    /// Decode a non-NULL column value. `Ok(None)` means "absent".
    fn decode_column(ty: &Type, raw: &[u8]) -> Result<Option<Self>, BoxError>;

    /// Whether this kind can be bound to a parameter of type `ty`.
    fn accepts_param(ty: &Type) -> bool;

    /// Encode the payload in the driver's native representation for `ty`.
    fn encode_param(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>;
}

/// A scalar value paired with a presence flag.
///
/// When absent, the payload sits at the kind's zero value and carries no
/// meaning; equality ignores it.
#[derive(Clone, Default)]
pub struct Nullable<T> {
    value: T,
    present: bool,
}

pub type NullString = Nullable<String>;
pub type NullTime = Nullable<DateTime<Utc>>;
pub type NullInt = Nullable<i64>;
pub type NullBool = Nullable<bool>;

impl<T> Nullable<T> {
    /// A present value.
    pub fn of(value: T) -> Self {
        Self {
            value,
            present: true,
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_absent(&self) -> bool {
        !self.present
    }

    /// The payload, if present.
    pub fn get(&self) -> Option<&T> {
        self.present.then_some(&self.value)
    }

    /// The raw payload. Meaningless when absent (zero value).
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_option(self) -> Option<T> {
        self.present.then_some(self.value)
    }
}

impl<T: Default> Nullable<T> {
    /// An absent value with a zero payload.
    pub fn absent() -> Self {
        Self {
            value: T::default(),
            present: false,
        }
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::of(v),
            None => Self::absent(),
        }
    }
}

impl<T: PartialEq> PartialEq for Nullable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.present == other.present && (!self.present || self.value == other.value)
    }
}

impl<T: Eq> Eq for Nullable<T> {}

impl<T: fmt::Debug> fmt::Debug for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.present {
            f.debug_tuple("Present").field(&self.value).finish()
        } else {
            f.write_str("Absent")
        }
    }
}

// ===== wire JSON =====

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.present {
            self.value.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

/// Decode a JSON body, mapping malformed input to [`crate::StoreError::Decode`].
pub fn decode_json<T: DeserializeOwned>(body: &str) -> StoreResult<T> {
    Ok(serde_json::from_str(body)?)
}

// ===== database column / parameter =====

impl<'a, T: NullableKind> FromSql<'a> for Nullable<T> {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(T::decode_column(ty, raw)?.into())
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Self::absent())
    }

    fn accepts(ty: &Type) -> bool {
        T::accepts_column(ty)
    }
}

impl<T: NullableKind> ToSql for Nullable<T> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if !self.present {
            return Ok(IsNull::Yes);
        }
        self.value.encode_param(ty, out)
    }

    fn accepts(ty: &Type) -> bool {
        T::accepts_param(ty)
    }

    to_sql_checked!();
}

impl NullableKind for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn accepts_column(_: &Type) -> bool {
        true
    }

    fn decode_column(ty: &Type, raw: &[u8]) -> Result<Option<Self>, BoxError> {
        if <String as FromSql>::accepts(ty) {
            return String::from_sql(ty, raw).map(Some);
        }
        let rendered = match *ty {
            Type::INT2 => i16::from_sql(ty, raw)?.to_string(),
            Type::INT4 => i32::from_sql(ty, raw)?.to_string(),
            Type::INT8 => i64::from_sql(ty, raw)?.to_string(),
            Type::FLOAT4 => f32::from_sql(ty, raw)?.to_string(),
            Type::FLOAT8 => f64::from_sql(ty, raw)?.to_string(),
            Type::BOOL => bool::from_sql(ty, raw)?.to_string(),
            Type::TIMESTAMPTZ => DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339(),
            Type::TIMESTAMP => NaiveDateTime::from_sql(ty, raw)?.and_utc().to_rfc3339(),
            Type::DATE => NaiveDate::from_sql(ty, raw)?.to_string(),
            Type::OID => u32::from_sql(ty, raw)?.to_string(),
            Type::UUID => Uuid::from_sql(ty, raw)?.to_string(),
            Type::JSON | Type::JSONB => serde_json::Value::from_sql(ty, raw)?.to_string(),
            // Binary wire formats with no text rendering here decode as absent.
            _ => return Ok(None),
        };
        Ok(Some(rendered))
    }

    fn accepts_param(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
    }

    fn encode_param(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        ToSql::to_sql(self, ty, out)
    }
}

impl NullableKind for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::Timestamp;

    fn accepts_column(_: &Type) -> bool {
        true
    }

    fn decode_column(ty: &Type, raw: &[u8]) -> Result<Option<Self>, BoxError> {
        let ts = match *ty {
            Type::TIMESTAMPTZ => DateTime::<Utc>::from_sql(ty, raw)?,
            Type::TIMESTAMP => NaiveDateTime::from_sql(ty, raw)?.and_utc(),
            Type::DATE => NaiveDate::from_sql(ty, raw)?.and_time(NaiveTime::MIN).and_utc(),
            _ => return Ok(None),
        };
        Ok(Some(ts))
    }

    fn accepts_param(ty: &Type) -> bool {
        matches!(*ty, Type::TIMESTAMPTZ | Type::TIMESTAMP | Type::DATE)
    }

    fn encode_param(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match *ty {
            Type::TIMESTAMP => self.naive_utc().to_sql(ty, out),
            Type::DATE => self.date_naive().to_sql(ty, out),
            _ => ToSql::to_sql(self, ty, out),
        }
    }
}

impl NullableKind for i64 {
    const KIND: ScalarKind = ScalarKind::Integer;

    fn accepts_column(ty: &Type) -> bool {
        matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8)
    }

    fn decode_column(ty: &Type, raw: &[u8]) -> Result<Option<Self>, BoxError> {
        let v = match *ty {
            Type::INT2 => i64::from(i16::from_sql(ty, raw)?),
            Type::INT4 => i64::from(i32::from_sql(ty, raw)?),
            _ => i64::from_sql(ty, raw)?,
        };
        Ok(Some(v))
    }

    fn accepts_param(ty: &Type) -> bool {
        Self::accepts_column(ty)
    }

    fn encode_param(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match *ty {
            Type::INT2 => i16::try_from(*self)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(*self)?.to_sql(ty, out),
            _ => ToSql::to_sql(self, ty, out),
        }
    }
}

impl NullableKind for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn accepts_column(ty: &Type) -> bool {
        *ty == Type::BOOL
    }

    fn decode_column(ty: &Type, raw: &[u8]) -> Result<Option<Self>, BoxError> {
        bool::from_sql(ty, raw).map(Some)
    }

    fn accepts_param(ty: &Type) -> bool {
        *ty == Type::BOOL
    }

    fn encode_param(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        ToSql::to_sql(self, ty, out)
    }
}

#[cfg(test)]
mod tests;
