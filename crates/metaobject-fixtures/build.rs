// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use std::{env, error::Error, fs, path::PathBuf};

use metaobject_codegen::{CodegenOptions, generate};
use metaobject_core::Schema;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=schema.toml");
    let schema = Schema::from_toml_str(&fs::read_to_string("schema.toml")?)?;
    let source = generate(&schema, &CodegenOptions::default())?;
    let out = PathBuf::from(env::var("OUT_DIR")?).join("metaobjects.rs");
    fs::write(out, source)?;
    Ok(())
}
