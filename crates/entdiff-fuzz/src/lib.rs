//! Fuzzing harnesses for the entdiff change detector.
//!
//! Each public function accepts raw bytes so it can back a `cargo fuzz`
//! target as well as plain unit tests. Recoverable errors are swallowed;
//! only broken invariants panic.
//!
//! # Examples
//!
//! Run the canonicalization harness on a JSON snippet:
//!
//! ```
//! entdiff_fuzz::fuzz_canonicalization(b"{\"a\":1}");
//! ```
//!
//! Drive the change detector with graphs derived from deterministic input:
//!
//! ```
//! entdiff_fuzz::fuzz_diff(&[1, 2, 3, 4]);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use entdiff_core::{ChangeDetector, Node, RenderConfig, Schema, SchemaRegistry};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const TYPE_NAME: &str = "Node";
const FIELDS: [&str; 4] = ["label", "score", "child", "items"];
const MAX_DEPTH: usize = 3;
const MAX_ITEMS: u8 = 6;
const MAX_STRING_LEN: u8 = 8;
// A small pool makes shared identities, moves and re-adds likely.
const MAX_ID: u8 = 5;

/// Feeds arbitrary bytes through the JSON and YAML canonicalization routines
/// and the schema document parsers.
///
/// ```
/// entdiff_fuzz::fuzz_canonicalization(b"{\"key\":\"value\"}");
/// ```
pub fn fuzz_canonicalization(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Node::from_json_str(text);
        let _ = Node::from_yaml_str(text);
        let _ = SchemaRegistry::from_json_str(text);
        let _ = SchemaRegistry::from_yaml_str(text);
    }
}

/// Compares two randomly generated entity graphs.
///
/// Identities are drawn from a small pool and are sometimes missing, so the
/// error paths are hit as often as the matching paths. A successful
/// comparison must produce a non-empty change set that renders, and any graph
/// that can be compared against itself yields no changes.
///
/// ```
/// entdiff_fuzz::fuzz_diff(b"seed");
/// ```
pub fn fuzz_diff(data: &[u8]) {
    let Ok(registry) = SchemaRegistry::new().with_schema(Schema::new(TYPE_NAME, FIELDS)) else {
        return;
    };
    let detector = ChangeDetector::new(&registry, &registry);

    let mut unstructured = Unstructured::new(data);
    let Some(initial) = random_graph(&mut unstructured) else {
        return;
    };
    let Some(current) = random_graph(&mut unstructured) else {
        return;
    };

    if let Ok(Some(changes)) = detector.get_changes(&initial, &current) {
        assert!(changes.summary().total() > 0, "change set without records");
        let _ = changes.render(&RenderConfig::default());
    }
    if let Ok(changes) = detector.get_changes(&initial, &initial.clone()) {
        assert!(changes.is_none(), "graph differs from its own copy: {changes:?}");
    }
}

fn random_graph(unstructured: &mut Unstructured<'_>) -> Option<Node> {
    let value = if unstructured.arbitrary().ok()? {
        random_items(unstructured, 0).ok()?
    } else {
        random_entity(unstructured, 0).ok()?
    };
    Node::from_json_value(value).ok()
}

fn random_entity(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    let mut map = JsonMap::new();
    map.insert("__type".to_string(), JsonValue::String(TYPE_NAME.to_string()));
    match unstructured.int_in_range::<u8>(0..=9)? {
        0 => {}
        1 => {
            map.insert("__id".to_string(), JsonValue::Null);
        }
        _ => {
            let id = unstructured.int_in_range::<u8>(0..=MAX_ID)?;
            map.insert("__id".to_string(), JsonValue::from(id));
        }
    }

    for field in FIELDS {
        let nested = depth < MAX_DEPTH && unstructured.arbitrary::<bool>()?;
        let value = match field {
            "child" if nested => Some(random_entity(unstructured, depth + 1)?),
            "items" if nested => Some(random_items(unstructured, depth + 1)?),
            _ => random_leaf(unstructured)?,
        };
        if let Some(value) = value {
            map.insert(field.to_string(), value);
        }
    }
    Ok(JsonValue::Object(map))
}

fn random_items(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ITEMS)?);
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(random_entity(unstructured, depth)?);
    }
    Ok(JsonValue::Array(items))
}

/// Returns `None` for an absent field.
fn random_leaf(
    unstructured: &mut Unstructured<'_>,
) -> Result<Option<JsonValue>, arbitrary::Error> {
    let leaf = match unstructured.int_in_range::<u8>(0..=4)? {
        0 => None,
        1 => Some(JsonValue::Null),
        2 => Some(JsonValue::Bool(unstructured.arbitrary()?)),
        3 => {
            let number = unstructured.int_in_range::<i8>(-4..=4)?;
            Some(JsonValue::Number(JsonNumber::from(number)))
        }
        _ => Some(JsonValue::String(random_string(unstructured)?)),
    };
    Ok(leaf)
}

fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(b'a'..=b'e')?;
        string.push(char::from(byte));
    }
    Ok(string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalization_handles_utf8() {
        fuzz_canonicalization(br"{}");
        fuzz_canonicalization(b"schemas: [{type: T, fields: [a]}]");
    }

    #[test]
    fn diff_harness_runs() {
        fuzz_diff(b"diff");
        fuzz_diff(&[0xff; 64]);
    }

    #[test]
    fn generated_entities_carry_the_discriminator() {
        let data = [7u8; 128];
        let mut unstructured = Unstructured::new(&data);
        let entity = random_entity(&mut unstructured, 0).expect("enough entropy");
        assert_eq!(entity["__type"], JsonValue::from(TYPE_NAME));
    }

    #[test]
    fn many_seeds_keep_invariants() {
        for seed in 0..=u8::MAX {
            let data: Vec<u8> =
                (0..256u16).map(|i| (i as u8).wrapping_mul(seed).wrapping_add(seed)).collect();
            fuzz_diff(&data);
        }
    }
}
