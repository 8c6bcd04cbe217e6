// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity struct generation.
//!
//! For `baz { name: single_line_text_field (required), genericObj:
//! metaobject_reference -> bar, tags: list.single_line_text_field }`:
//!
//! ```rust,ignore
//! pub struct Baz<GenericObj = MetaobjectId> {
//!     pub system: SystemFields,
//!     pub name: String,
//!     pub generic_obj: Option<GenericObj>,
//!     pub tags: Vec<String>,
//! }
//!
//! impl<GenericObj: FromFieldValue> FromRecord for Baz<GenericObj> { ... }
//! impl<GenericObj: FromFieldValue> FromFieldValue for Baz<GenericObj> { ... }
//! ```
//!
//! Every reference field owns a type parameter. Substituting the target
//! struct is the populate projection: `Baz<Bar>` after populating
//! `genericObj`, `Baz<Bar<Icon>>` after `genericObj.icon`.

use metaobject_core::{
    schema::EntityDefinition,
    shape::{FieldShape, Shape}
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::trace;

use crate::{
    Context,
    error::CodegenError,
    json::{contains_object, json_type},
    naming::{Names, field_ident, type_ident}
};

/// Name of the system metadata member.
const SYSTEM_MEMBER: &str = "system";

/// One generated struct member.
struct Member {
    ident: Ident,
    key:   String,
    ty:    TokenStream,
    json:  bool,
    doc:   Option<String>,
    param: Option<Ident>
}

/// Generate the struct of `definition` and its decoding impls.
///
/// `shape` is the unpopulated shape of the entity.
pub fn generate(
    definition: &EntityDefinition,
    shape: &Shape,
    ctx: &mut Context
) -> Result<TokenStream, CodegenError> {
    let ident = type_ident(&definition.entity_type);
    ctx.names.claim(&ident, &definition.entity_type)?;

    let mut local = Names::default();
    local.claim(&field_ident(SYSTEM_MEMBER), SYSTEM_MEMBER)?;
    let mut members = Vec::new();
    for field in shape.fields().unwrap_or_default() {
        let member = build_member(definition, field, ctx)?;
        if local.claim(&member.ident, &member.key).is_err() {
            if member.ident == SYSTEM_MEMBER {
                return Err(CodegenError::ReservedField {
                    entity: definition.entity_type.clone(),
                    field:  member.key
                });
            }
            return Err(CodegenError::NameCollision {
                name:        member.ident.to_string(),
                source_name: format!("{}.{}", definition.entity_type, member.key)
            });
        }
        members.push(member);
    }
    trace!(entity = %definition.entity_type, members = members.len(), "generated entity struct");

    let krate = &ctx.krate;
    let params: Vec<&Ident> = members.iter().filter_map(|m| m.param.as_ref()).collect();
    let (decl_generics, impl_generics, ty_generics) = if params.is_empty() {
        (TokenStream::new(), TokenStream::new(), TokenStream::new())
    } else {
        (
            quote!(<#(#params = #krate::decode::MetaobjectId),*>),
            quote!(<#(#params: #krate::decode::FromFieldValue),*>),
            quote!(<#(#params),*>)
        )
    };

    let fields = members.iter().map(|m| {
        let Member {
            ident,
            ty,
            doc,
            ..
        } = m;
        let doc = doc.as_ref().map(|d| quote!(#[doc = #d]));
        quote! {
            #doc
            pub #ident: #ty
        }
    });
    let decoders = members.iter().map(|m| {
        let Member {
            ident,
            key,
            ..
        } = m;
        if m.json {
            quote!(#ident: #krate::decode::decode_json_field(record, #key)?)
        } else {
            quote!(#ident: #krate::decode::decode_field(record, #key)?)
        }
    });

    let entity_type = &definition.entity_type;
    let doc = match &definition.description {
        Some(description) => format!(" {description}"),
        None => format!(" `{entity_type}` metaobject ({}).", definition.name)
    };

    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq)]
        pub struct #ident #decl_generics {
            /// System metadata.
            pub system: #krate::record::SystemFields,
            #(#fields,)*
        }

        impl #impl_generics #krate::decode::FromRecord for #ident #ty_generics {
            const TYPE: &'static str = #entity_type;

            fn from_record(
                record: &#krate::record::Record
            ) -> ::std::result::Result<Self, #krate::error::DecodeError> {
                ::std::result::Result::Ok(Self {
                    system: ::std::clone::Clone::clone(&record.system),
                    #(#decoders,)*
                })
            }
        }

        impl #impl_generics #krate::decode::FromFieldValue for #ident #ty_generics {
            fn from_field_value(
                field: &str,
                value: &#krate::value::FieldValue
            ) -> ::std::result::Result<Self, #krate::error::DecodeError> {
                #krate::decode::decode_record(field, value)
            }
        }
    })
}

fn build_member(
    definition: &EntityDefinition,
    field: &FieldShape,
    ctx: &mut Context
) -> Result<Member, CodegenError> {
    let declared = definition.field_by_camel_key(&field.key);
    let is_list = declared.is_some_and(|f| f.is_list());
    let element = match (&field.shape, is_list) {
        (Shape::List(inner), true) => inner.as_ref(),
        (shape, _) => shape
    };

    let mut param = None;
    let mut json = false;
    let element_ty = match element {
        Shape::Identifier => {
            let ident = type_ident(&field.key);
            let ty = quote!(#ident);
            param = Some(ident);
            ty
        }
        shape if contains_object(shape) => {
            json = true;
            json_type(shape, &format!("{}_{}", definition.entity_type, field.key), ctx)?
        }
        shape => scalar_type(shape, &ctx.krate)
    };

    let ty = if is_list {
        quote!(::std::vec::Vec<#element_ty>)
    } else if field.required {
        element_ty
    } else {
        quote!(::std::option::Option<#element_ty>)
    };

    Ok(Member {
        ident: field_ident(&field.key),
        key: field.key.clone(),
        ty,
        json,
        doc: declared.map(|f| match &f.description {
            Some(description) => format!(" {description}"),
            None => format!(" `{}` ({}).", f.key(), f.field_type)
        }),
        param
    })
}

fn scalar_type(shape: &Shape, krate: &syn::Path) -> TokenStream {
    match shape {
        Shape::Boolean => quote!(bool),
        Shape::String => quote!(::std::string::String),
        Shape::Integer => quote!(i64),
        Shape::Decimal => quote!(f64),
        Shape::Date => quote!(#krate::chrono::NaiveDate),
        Shape::DateTime => quote!(#krate::chrono::DateTime<#krate::chrono::FixedOffset>),
        Shape::Money => quote!(#krate::value::Money),
        Shape::Measurement => quote!(#krate::value::Measurement),
        Shape::Link => quote!(#krate::value::Link),
        Shape::Rating => quote!(#krate::value::Rating),
        _ => quote!(#krate::serde_json::Value)
    }
}
