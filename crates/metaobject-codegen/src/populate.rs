// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Populate path enums.
//!
//! The enum of an entity lists exactly the paths the runtime accepts up to
//! the configured depth, so a path that type-checks also validates.

use metaobject_core::{paths::valid_populate_paths, schema::Schema};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::{
    Context,
    error::CodegenError,
    naming::{Names, type_ident, variant_ident}
};

/// Generate `<Entity>PopulatePath` for `entity_type`.
pub fn generate(
    schema: &Schema,
    entity_type: &str,
    max_depth: usize,
    ctx: &mut Context
) -> Result<TokenStream, CodegenError> {
    let entity = type_ident(entity_type);
    let ident = format_ident!("{}PopulatePath", entity);
    ctx.names.claim(&ident, entity_type)?;

    let paths = valid_populate_paths(schema, entity_type, max_depth)?;
    let mut local = Names::default();
    let mut variants = Vec::with_capacity(paths.len());
    for path in &paths {
        let variant = variant_ident(path);
        local.claim(&variant, path)?;
        variants.push(variant);
    }
    let paths: Vec<&String> = paths.iter().collect();

    let doc = format!(" Populate paths of [`{entity}`].");
    let variant_docs = paths.iter().map(|p| format!(" `{p}`"));
    Ok(quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum #ident {
            #(
                #[doc = #variant_docs]
                #variants,
            )*
        }

        impl #ident {
            /// Every path, sorted.
            pub const ALL: &'static [Self] = &[#(Self::#variants),*];

            /// Wire form of the path.
            pub const fn as_str(&self) -> &'static str {
                match *self {
                    #(Self::#variants => #paths,)*
                }
            }
        }

        impl ::std::fmt::Display for #ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::From<#ident> for ::std::string::String {
            fn from(path: #ident) -> Self {
                ::std::string::String::from(path.as_str())
            }
        }
    })
}
