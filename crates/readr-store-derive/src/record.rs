//! Record derive macro implementation

mod attrs;

use attrs::{FieldInfo, get_field_info, get_table_name};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let table = get_table_name(&input)?;
    let infos = fields
        .iter()
        .map(get_field_info)
        .collect::<Result<Vec<_>>>()?;

    check_columns(name, &infos)?;
    let id = identity_field(name, &infos)?;
    let status = status_field(&infos)?;

    let id_ident = &id.ident;
    let id_ty = &id.ty;

    let column_defs = infos.iter().map(|f| {
        let column = &f.column;
        let is_id = f.is_id;
        let ty = &f.ty;
        quote! {
            ::readr_store::ColumnDef {
                name: #column,
                is_identity: #is_id,
                nullable: <#ty as ::readr_store::FieldKind>::NULLABLE,
            }
        }
    });

    let status_column = match status {
        Some(f) => {
            let column = &f.column;
            quote! { .with_status_column(#column) }
        }
        None => quote! {},
    };

    let descriptors = infos.iter().map(|f| {
        let ident = &f.ident;
        let column = &f.column;
        let is_id = f.is_id;
        quote! {
            ::readr_store::FieldDescriptor::of(#column, #is_id, &self.#ident)
        }
    });

    let extracts = infos.iter().map(|f| {
        let ident = &f.ident;
        let column = &f.column;
        quote! {
            #ident: row.try_get_column(#column)?
        }
    });

    Ok(quote! {
        impl ::readr_store::Record for #name {
            type Id = #id_ty;

            fn schema() -> &'static ::readr_store::TableSchema {
                static SCHEMA: ::readr_store::TableSchema = ::readr_store::TableSchema::new(
                    #table,
                    &[#(#column_defs),*],
                )
                #status_column;
                &SCHEMA
            }

            fn describe_fields(&self) -> ::std::vec::Vec<::readr_store::FieldDescriptor<'_>> {
                ::std::vec![#(#descriptors),*]
            }

            fn identity(&self) -> &Self::Id {
                &self.#id_ident
            }
        }

        impl ::readr_store::FromRow for #name {
            fn from_row(
                row: &::readr_store::tokio_postgres::Row,
            ) -> ::readr_store::StoreResult<Self> {
                use ::readr_store::RowExt;
                Ok(Self {
                    #(#extracts),*
                })
            }
        }
    })
}

fn check_columns(name: &syn::Ident, infos: &[FieldInfo]) -> Result<()> {
    if infos.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "Record requires at least one field",
        ));
    }
    let mut seen = HashSet::new();
    for f in infos {
        if !seen.insert(f.column.as_str()) {
            return Err(syn::Error::new(
                f.span,
                format!("duplicate column '{}'", f.column),
            ));
        }
    }
    Ok(())
}

fn identity_field<'a>(name: &syn::Ident, infos: &'a [FieldInfo]) -> Result<&'a FieldInfo> {
    let mut ids = infos.iter().filter(|f| f.is_id);
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(syn::Error::new_spanned(
            name,
            "Record requires exactly one #[orm(id)] field",
        )),
        (Some(_), Some(second)) => Err(syn::Error::new(
            second.span,
            "Record allows only one #[orm(id)] field",
        )),
    }
}

fn status_field(infos: &[FieldInfo]) -> Result<Option<&FieldInfo>> {
    let mut status = infos.iter().filter(|f| f.is_status);
    let first = status.next();
    if let Some(second) = status.next() {
        return Err(syn::Error::new(
            second.span,
            "Record allows only one #[orm(status)] field",
        ));
    }
    if let Some(f) = first {
        if f.is_id {
            return Err(syn::Error::new(
                f.span,
                "#[orm(status)] cannot be the #[orm(id)] field",
            ));
        }
    }
    Ok(first)
}
