// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rust identifiers from schema names.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `$app:store_type` | [`type_ident`] | `AppStoreType` |
//! | `genericObj` | [`field_ident`] | `generic_obj` |
//! | `type` | [`field_ident`] | `r#type` |
//! | `storeType.another` | [`variant_ident`] | `StoreTypeAnother` |

use std::collections::BTreeSet;

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span};

use crate::error::CodegenError;

/// Keywords that cannot be raw identifiers.
const NON_RAW: [&str; 4] = ["self", "Self", "super", "crate"];

/// Replace everything that cannot appear in an identifier by `_`.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}

fn ident(name: &str) -> Ident {
    if name.is_empty() || name == "_" {
        return Ident::new("field", Span::call_site());
    }
    if NON_RAW.contains(&name) {
        return Ident::new(&format!("{name}_"), Span::call_site());
    }
    if syn::parse_str::<Ident>(name).is_ok() {
        Ident::new(name, Span::call_site())
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}

/// PascalCase name of a type.
pub fn type_name(name: &str) -> String {
    let pascal = sanitize(name).to_case(Case::Pascal);
    if pascal.is_empty() || pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{pascal}")
    } else {
        pascal
    }
}

/// PascalCase type identifier.
pub fn type_ident(name: &str) -> Ident {
    ident(&type_name(name))
}

/// snake_case field identifier, raw when it is a keyword.
pub fn field_ident(key: &str) -> Ident {
    ident(&sanitize(key).to_case(Case::Snake))
}

/// Enum variant of a populate path.
pub fn variant_ident(path: &str) -> Ident {
    type_ident(&path.replace('.', "_"))
}

/// Registry of generated names; rejects duplicates.
#[derive(Debug, Default)]
pub struct Names {
    taken: BTreeSet<String>
}

impl Names {
    /// Claim `name` for an item produced from `source`.
    pub fn claim(&mut self, name: &Ident, source: &str) -> Result<(), CodegenError> {
        if self.taken.insert(name.to_string()) {
            Ok(())
        } else {
            Err(CodegenError::NameCollision {
                name:        name.to_string(),
                source_name: source.to_string()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(type_ident("store_type").to_string(), "StoreType");
        assert_eq!(type_ident("$app:store").to_string(), "AppStore");
        assert!(type_ident("3d_model").to_string().starts_with('T'));
    }

    #[test]
    fn field_names() {
        assert_eq!(field_ident("genericObj").to_string(), "generic_obj");
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("self").to_string(), "self_");
        assert_eq!(field_ident("max-width").to_string(), "max_width");
    }

    #[test]
    fn variant_names() {
        assert_eq!(variant_ident("storeType.another").to_string(), "StoreTypeAnother");
        assert_eq!(variant_ident("icon").to_string(), "Icon");
    }

    #[test]
    fn names_reject_duplicates() {
        let mut names = Names::default();
        names.claim(&type_ident("bar"), "bar").unwrap();
        assert!(matches!(
            names.claim(&type_ident("Bar"), "Bar"),
            Err(CodegenError::NameCollision { .. })
        ));
    }
}
