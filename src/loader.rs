//! Loading translation documents.
//!
//! Nested JSON objects flatten to dotted keys, so `{"tab": {"home": "Home"}}`
//! yields `tab.home`. A literal `"tab.home"` key in the same document
//! collides with the nested one; the later value wins and the key is
//! reported as a duplicate.

use std::{collections::BTreeMap, io::Read, path::Path};

use serde_json::Value;

use crate::error::Error;

/// Flattened translations plus every key in the order it was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedTranslations {
    pub entries: BTreeMap<String, String>,
    pub keys_in_order: Vec<String>,
}

pub fn load_translations(json: &str) -> Result<LoadedTranslations, Error> {
    let value: Value = serde_json::from_str(json)?;
    from_value(value)
}

pub fn load_translations_from_reader<R: Read>(reader: R) -> Result<LoadedTranslations, Error> {
    let value: Value = serde_json::from_reader(reader)?;
    from_value(value)
}

pub fn load_translations_from_path<P: AsRef<Path>>(path: P) -> Result<LoadedTranslations, Error> {
    let file = std::fs::File::open(path)?;
    load_translations_from_reader(std::io::BufReader::new(file))
}

fn from_value(value: Value) -> Result<LoadedTranslations, Error> {
    let Value::Object(map) = value else {
        return Err(Error::invalid_configuration(
            "translation document must be a JSON object",
        ));
    };
    let mut loaded = LoadedTranslations::default();
    for (key, child) in map {
        flatten(&key, child, &mut loaded)?;
    }
    Ok(loaded)
}

fn flatten(prefix: &str, value: Value, loaded: &mut LoadedTranslations) -> Result<(), Error> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&format!("{}.{}", prefix, key), child, loaded)?;
            }
        }
        Value::String(text) => {
            loaded.keys_in_order.push(prefix.to_string());
            loaded.entries.insert(prefix.to_string(), text);
        }
        Value::Number(n) => {
            loaded.keys_in_order.push(prefix.to_string());
            loaded.entries.insert(prefix.to_string(), n.to_string());
        }
        other => {
            return Err(Error::invalid_configuration(format!(
                "unsupported value for `{}`: {}",
                prefix, other
            )));
        }
    }
    Ok(())
}
