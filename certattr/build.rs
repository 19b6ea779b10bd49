// Licensed under the Apache-2.0 license

use std::env;
use std::path::PathBuf;

/// Enough for the largest attribute a single extension can carry
const MIN_ATTRIBUTE_FIELDS: usize = 8;

fn main() {
    let default_value: usize = 64;

    let max_fields = match env::var("ARBITRARY_MAX_ATTRIBUTE_FIELDS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
    {
        Some(value) if value >= MIN_ATTRIBUTE_FIELDS => value,
        Some(value) => {
            println!(
                "cargo:warning=ARBITRARY_MAX_ATTRIBUTE_FIELDS={value} is below {MIN_ATTRIBUTE_FIELDS}, using {default_value}"
            );
            default_value
        }
        None => default_value,
    };

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = PathBuf::from(out_dir).join("arbitrary_max_attribute_fields.rs");

    println!("cargo:rerun-if-env-changed=ARBITRARY_MAX_ATTRIBUTE_FIELDS");
    println!("cargo:rerun-if-changed=build.rs");

    let contents = format!(
        "/// Most fields one decoded attribute may produce\npub const MAX_ATTRIBUTE_FIELDS: usize = {max_fields};\n"
    );
    if std::fs::read_to_string(&dest_path).ok().as_deref() != Some(contents.as_str()) {
        std::fs::write(&dest_path, contents).unwrap();
    }
}
