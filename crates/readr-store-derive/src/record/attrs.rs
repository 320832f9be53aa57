//! Attribute parsing for the Record derive macro.
//!
//! Handles struct-level `#[orm(table = "...")]` and field-level
//! `#[orm(id, status, column = "...")]`. Unknown keys are errors.

use crate::sql_ident::{parse_sql_ident, parse_sql_ident_with_span};
use heck::ToSnakeCase;
use syn::spanned::Spanned;
use syn::{DeriveInput, LitStr, Result};

/// One struct field, resolved.
pub(super) struct FieldInfo {
    pub ident: syn::Ident,
    pub ty: syn::Type,
    pub column: String,
    pub is_id: bool,
    pub is_status: bool,
    pub span: proc_macro2::Span,
}

/// Table name from `#[orm(table = "...")]`, or the snake_case struct name.
pub(super) fn get_table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(parse_sql_ident(&lit, "table name")?);
                Ok(())
            } else {
                Err(meta.error("unknown struct attribute; expected `table = \"...\"`"))
            }
        })?;
    }
    match table {
        Some(t) => Ok(t),
        None => parse_sql_ident_with_span(
            &input.ident.to_string().to_snake_case(),
            input.ident.span(),
            "table name",
        ),
    }
}

pub(super) fn get_field_info(field: &syn::Field) -> Result<FieldInfo> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "Record fields must be named"))?;

    let mut is_id = false;
    let mut is_status = false;
    let mut column = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                is_id = true;
                Ok(())
            } else if meta.path.is_ident("status") {
                is_status = true;
                Ok(())
            } else if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(parse_sql_ident(&lit, "column name")?);
                Ok(())
            } else {
                Err(meta.error("unknown field attribute; expected `id`, `status`, or `column`"))
            }
        })?;
    }

    let column = match column {
        Some(c) => c,
        None => {
            let name = ident.to_string();
            let name = name.strip_prefix("r#").unwrap_or(&name).to_string();
            parse_sql_ident_with_span(&name, ident.span(), "column name")?
        }
    };

    Ok(FieldInfo {
        span: field.span(),
        ty: field.ty.clone(),
        ident,
        column,
        is_id,
        is_status,
    })
}
