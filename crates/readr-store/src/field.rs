//! Field descriptors: a record's live, declaration-ordered column values.

use crate::nullable::{Nullable, NullableKind, ScalarKind};
use chrono::{DateTime, Utc};
use tokio_postgres::types::ToSql;

/// The shape of a field's current value, as seen by the partial-update policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Plain text; never nullable.
    Text(&'a str),
    /// Plain integer; always considered set.
    Integer(i64),
    /// Plain boolean; always considered set.
    Boolean(bool),
    /// A [`Nullable`] wrapper of the given kind.
    Nullable { kind: ScalarKind, present: bool },
    /// Anything the policy has no rule for.
    Other { type_name: &'static str },
}

/// One column of a live record.
///
/// Built fresh from the record on every synthesis call; never cached, since
/// presence differs per instance.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor<'a> {
    pub column: &'static str,
    pub is_identity: bool,
    pub value: FieldValue<'a>,
    /// The value bound for this column's placeholder.
    pub param: &'a (dyn ToSql + Sync),
}

impl<'a> FieldDescriptor<'a> {
    pub fn of<T: FieldKind>(column: &'static str, is_identity: bool, value: &'a T) -> Self {
        Self {
            column,
            is_identity,
            value: value.field_value(),
            param: value,
        }
    }

    pub fn field(column: &'static str, value: &'a impl FieldKind) -> Self {
        Self::of(column, false, value)
    }

    pub fn identity(column: &'static str, value: &'a impl FieldKind) -> Self {
        Self::of(column, true, value)
    }
}

/// Types that can back a record field.
pub trait FieldKind: ToSql + Sync {
    /// Whether the column may hold SQL NULL.
    const NULLABLE: bool = false;

    fn field_value(&self) -> FieldValue<'_>;
}

impl FieldKind for String {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl FieldKind for i64 {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Integer(*self)
    }
}

impl FieldKind for i32 {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Integer(i64::from(*self))
    }
}

impl FieldKind for i16 {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Integer(i64::from(*self))
    }
}

impl FieldKind for bool {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Boolean(*self)
    }
}

impl<T: NullableKind> FieldKind for Nullable<T> {
    const NULLABLE: bool = true;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Nullable {
            kind: T::KIND,
            present: self.is_present(),
        }
    }
}

macro_rules! other_field_kind {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldKind for $ty {
                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Other {
                        type_name: std::any::type_name::<$ty>(),
                    }
                }
            }
        )*
    };
}

other_field_kind!(f32, f64, DateTime<Utc>, uuid::Uuid, serde_json::Value);

impl<T: ToSql + Sync> FieldKind for Option<T> {
    const NULLABLE: bool = true;

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Other {
            type_name: std::any::type_name::<Option<T>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nullable::{NullString, NullTime};

    #[test]
    fn descriptor_reflects_live_presence() {
        let name = NullString::of("Alice".into());
        let bio = NullString::absent();
        let d1 = FieldDescriptor::field("name", &name);
        let d2 = FieldDescriptor::field("bio", &bio);
        assert_eq!(
            d1.value,
            FieldValue::Nullable {
                kind: ScalarKind::Text,
                present: true
            }
        );
        assert_eq!(
            d2.value,
            FieldValue::Nullable {
                kind: ScalarKind::Text,
                present: false
            }
        );
    }

    #[test]
    fn plain_scalars_map_to_their_shapes() {
        let id = "u-1".to_string();
        assert_eq!(FieldDescriptor::identity("id", &id).value, FieldValue::Text("u-1"));
        assert!(FieldDescriptor::identity("id", &id).is_identity);
        assert_eq!(FieldValue::Integer(7), 7i32.field_value());
        assert_eq!(FieldValue::Boolean(true), true.field_value());
    }

    #[test]
    fn unsupported_shapes_report_their_type() {
        let ratio = 0.5f64;
        assert!(matches!(
            ratio.field_value(),
            FieldValue::Other { type_name } if type_name == "f64"
        ));
        assert!(<Option<i64> as FieldKind>::NULLABLE);
        assert!(<NullTime as FieldKind>::NULLABLE);
        assert!(!<String as FieldKind>::NULLABLE);
    }
}
