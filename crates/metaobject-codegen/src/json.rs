// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Serde structs for JSON fields with an embedded schema.
//!
//! A field `settings` of `baz` whose schema is
//! `{"type":"object","properties":{"color":{"type":"string"}},"required":["color"]}`
//! becomes:
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! pub struct BazSettings {
//!     #[serde(rename = "color")]
//!     pub color: String,
//! }
//! ```
//!
//! Nested objects get their own struct named after the path, array items
//! are suffixed with `Item`.

use metaobject_core::shape::{FieldShape, Shape};
use proc_macro2::{Ident, TokenStream};
use quote::quote;

use crate::{
    Context,
    error::CodegenError,
    naming::{Names, field_ident, type_ident}
};

/// Whether `shape` needs a generated struct anywhere inside.
pub fn contains_object(shape: &Shape) -> bool {
    match shape {
        Shape::Object(_) => true,
        Shape::List(inner) => contains_object(inner),
        _ => false
    }
}

/// Rust type of a JSON value of `shape`, emitting structs into `ctx`.
///
/// `name` is the unconverted name of the struct generated for an object.
pub fn json_type(shape: &Shape, name: &str, ctx: &mut Context) -> Result<TokenStream, CodegenError> {
    let krate = &ctx.krate;
    Ok(match shape {
        Shape::Object(fields) => {
            let ident = type_ident(name);
            emit_struct(&ident, name, fields, ctx)?;
            quote!(self::#ident)
        }
        Shape::List(inner) => {
            let inner = json_type(inner, &format!("{name}_item"), ctx)?;
            quote!(::std::vec::Vec<#inner>)
        }
        Shape::String => quote!(::std::string::String),
        Shape::Integer => quote!(i64),
        Shape::Decimal => quote!(f64),
        Shape::Boolean => quote!(bool),
        _ => quote!(#krate::serde_json::Value)
    })
}

fn emit_struct(
    ident: &Ident,
    source: &str,
    fields: &[FieldShape],
    ctx: &mut Context
) -> Result<(), CodegenError> {
    ctx.names.claim(ident, source)?;

    let mut local = Names::default();
    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let member = field_ident(&field.key);
        local.claim(&member, &field.key)?;
        let ty = json_type(&field.shape, &format!("{ident}_{}", field.key), ctx)?;
        let key = &field.key;
        members.push(if field.required {
            quote! {
                #[serde(rename = #key)]
                pub #member: #ty
            }
        } else {
            quote! {
                #[serde(rename = #key, default, skip_serializing_if = "::std::option::Option::is_none")]
                pub #member: ::std::option::Option<#ty>
            }
        });
    }

    let krate = &ctx.krate;
    let serde_crate = format!("{}::serde", ctx.krate_path);
    let doc = format!(" JSON value of `{source}`.");
    ctx.items.push(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, #krate::serde::Serialize, #krate::serde::Deserialize)]
        #[serde(crate = #serde_crate)]
        pub struct #ident {
            #(#members,)*
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn object_schema_emits_nested_structs() {
        let shape = Shape::from_json_schema(&json!({
            "type": "object",
            "required": ["color"],
            "properties": {
                "color": { "type": "string" },
                "size": {
                    "type": "object",
                    "properties": { "width": { "type": "integer" } }
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }));
        let mut ctx = Context::for_tests();
        let ty = json_type(&shape, "baz_settings", &mut ctx).unwrap();
        assert_eq!(ty.to_string(), quote!(self::BazSettings).to_string());
        assert_eq!(ctx.items.len(), 2);

        let source = ctx.items.iter().map(ToString::to_string).collect::<String>();
        let file = syn::parse_file(&source).unwrap();
        let names: Vec<String> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Struct(s) => Some(s.ident.to_string()),
                _ => None
            })
            .collect();
        assert!(names.contains(&"BazSettings".to_string()));
        assert!(names.contains(&"BazSettingsSize".to_string()));
    }

    #[test]
    fn arrays_of_objects_get_item_structs() {
        let shape = Shape::from_json_schema(&json!({
            "type": "array",
            "items": { "type": "object", "properties": { "a": { "type": "boolean" } } }
        }));
        let mut ctx = Context::for_tests();
        let ty = json_type(&shape, "baz_rows", &mut ctx).unwrap();
        assert_eq!(
            ty.to_string(),
            quote!(::std::vec::Vec<self::BazRowsItem>).to_string()
        );
        assert!(contains_object(&shape));
        assert!(!contains_object(&Shape::List(Box::new(Shape::String))));
    }
}
