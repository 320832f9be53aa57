//! Which fields a partial update writes.
//!
//! Rules, per non-identity field:
//!
//! | shape                 | included when                                   |
//! |-----------------------|-------------------------------------------------|
//! | plain text            | non-empty (under [`TextPresence::NonEmpty`])    |
//! | `Nullable<T>`         | present, whatever the payload                   |
//! | plain integer/boolean | always                                          |
//! | anything else         | never; recorded as a [`SkippedField`]           |
//!
//! The identity column is picked by its marker, never by presence.

use crate::field::{FieldDescriptor, FieldValue};
use serde::Deserialize;

/// How plain (non-wrapped) text fields count as "present".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPresence {
    /// An empty string means "not supplied". Legacy behavior.
    #[default]
    NonEmpty,
    /// Plain text is always written, like plain integers and booleans.
    Always,
}

/// A field the policy had no rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedField {
    pub column: &'static str,
    pub type_name: &'static str,
}

/// Outcome of running the policy over a descriptor list.
#[derive(Debug)]
pub struct Selection<'d, 'a> {
    /// Columns to SET, in descriptor order.
    pub set: Vec<&'d FieldDescriptor<'a>>,
    /// All descriptors carrying the identity marker.
    pub identities: Vec<&'d FieldDescriptor<'a>>,
    pub skipped: Vec<SkippedField>,
}

impl Selection<'_, '_> {
    pub fn set_columns(&self) -> Vec<&'static str> {
        self.set.iter().map(|d| d.column).collect()
    }
}

/// Whether a single non-identity value participates in a partial update.
pub fn is_present(value: &FieldValue<'_>, text: TextPresence) -> Option<bool> {
    match *value {
        FieldValue::Text(s) => Some(match text {
            TextPresence::NonEmpty => !s.is_empty(),
            TextPresence::Always => true,
        }),
        FieldValue::Nullable { present, .. } => Some(present),
        FieldValue::Integer(_) | FieldValue::Boolean(_) => Some(true),
        FieldValue::Other { .. } => None,
    }
}

/// Run the partial-update policy.
///
/// Unknown shapes never abort selection; each one is logged and returned in
/// [`Selection::skipped`].
pub fn select_partial<'d, 'a>(
    descriptors: &'d [FieldDescriptor<'a>],
    text: TextPresence,
) -> Selection<'d, 'a> {
    let mut selection = Selection {
        set: Vec::with_capacity(descriptors.len()),
        identities: Vec::with_capacity(1),
        skipped: Vec::new(),
    };

    for d in descriptors {
        if d.is_identity {
            selection.identities.push(d);
            continue;
        }
        match is_present(&d.value, text) {
            Some(true) => selection.set.push(d),
            Some(false) => {}
            None => {
                let FieldValue::Other { type_name } = d.value else {
                    continue;
                };
                tracing::warn!(
                    target: "readr_store::policy",
                    column = d.column,
                    type_name,
                    "unrecognised field shape; excluded from partial update"
                );
                selection.skipped.push(SkippedField {
                    column: d.column,
                    type_name,
                });
            }
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nullable::{NullInt, NullString, NullTime};

    #[test]
    fn nullable_included_iff_present() {
        let name = NullString::of("Alice".into());
        let bio = NullString::absent();
        let zero = NullInt::of(0);
        let when = NullTime::absent();
        let fields = [
            FieldDescriptor::field("name", &name),
            FieldDescriptor::field("bio", &bio),
            FieldDescriptor::field("score", &zero),
            FieldDescriptor::field("seen_at", &when),
        ];
        let sel = select_partial(&fields, TextPresence::NonEmpty);
        assert_eq!(sel.set_columns(), vec!["name", "score"]);
        assert!(sel.skipped.is_empty());
    }

    #[test]
    fn empty_plain_text_is_absent_by_default() {
        let empty = String::new();
        let full = "x".to_string();
        let fields = [
            FieldDescriptor::field("a", &empty),
            FieldDescriptor::field("b", &full),
        ];
        assert_eq!(
            select_partial(&fields, TextPresence::NonEmpty).set_columns(),
            vec!["b"]
        );
        assert_eq!(
            select_partial(&fields, TextPresence::Always).set_columns(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn plain_bool_and_int_always_included() {
        let off = false;
        let zero = 0i64;
        let fields = [
            FieldDescriptor::field("active", &off),
            FieldDescriptor::field("count", &zero),
        ];
        assert_eq!(
            select_partial(&fields, TextPresence::NonEmpty).set_columns(),
            vec!["active", "count"]
        );
    }

    #[test]
    fn unknown_shapes_are_skipped_with_a_diagnostic() {
        let ratio = 1.5f64;
        let flag = true;
        let fields = [
            FieldDescriptor::field("ratio", &ratio),
            FieldDescriptor::field("flag", &flag),
        ];
        let sel = select_partial(&fields, TextPresence::NonEmpty);
        assert_eq!(sel.set_columns(), vec!["flag"]);
        assert_eq!(
            sel.skipped,
            vec![SkippedField {
                column: "ratio",
                type_name: "f64"
            }]
        );
    }

    #[test]
    fn identity_is_chosen_by_marker_even_when_empty() {
        let id = String::new();
        let name = NullString::of("n".into());
        let fields = [
            FieldDescriptor::identity("id", &id),
            FieldDescriptor::field("name", &name),
        ];
        let sel = select_partial(&fields, TextPresence::NonEmpty);
        assert_eq!(sel.identities.len(), 1);
        assert_eq!(sel.identities[0].column, "id");
        assert_eq!(sel.set_columns(), vec!["name"]);
    }
}
