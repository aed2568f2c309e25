use std::fs;
use std::path::Path;

use entdiff_core::{ChangeDetector, Node, RenderConfig, SchemaRegistry};
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Deserialize)]
struct Fixture {
    schema: JsonValue,
    initial: JsonValue,
    current: JsonValue,
    rendered: String,
}

fn load_fixture(path: &Path) -> Fixture {
    let data = fs::read_to_string(path).expect("fixture should be readable");
    serde_json::from_str(&data).expect("fixture should deserialize")
}

#[test]
fn rendered_changes_match_fixtures() {
    let fixtures_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/render");
    let mut entries: Vec<_> = fs::read_dir(&fixtures_root)
        .expect("fixtures directory must exist")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    assert!(
        !entries.is_empty(),
        "expected at least one render fixture under tests/fixtures/render",
    );

    for path in entries {
        let fixture = load_fixture(&path);
        let registry =
            SchemaRegistry::from_json_str(&fixture.schema.to_string()).expect("schema loads");
        let initial = Node::from_json_value(fixture.initial).expect("initial parses");
        let current = Node::from_json_value(fixture.current).expect("current parses");

        let detector = ChangeDetector::new(&registry, &registry);
        let rendered = detector
            .get_changes(&initial, &current)
            .unwrap_or_else(|err| panic!("fixture {path:?} failed: {err}"))
            .map(|changes| changes.render(&RenderConfig::default()))
            .unwrap_or_default();
        assert_eq!(rendered, fixture.rendered, "fixture {path:?}");
    }
}

#[test]
fn colored_rendering_only_wraps_marked_lines() {
    let registry = SchemaRegistry::from_json_str(
        r#"{"schemas": [{"type": "Slot", "fields": ["held"]}, {"type": "Item", "fields": []}]}"#,
    )
    .expect("schema loads");
    let initial = Node::from_json_str(r#"{"__type": "Slot", "held": {"__type": "Item", "__id": 1}}"#)
        .expect("initial parses");
    let current = Node::from_json_str(r#"{"__type": "Slot", "held": {"__type": "Item", "__id": 2}}"#)
        .expect("current parses");

    let changes = ChangeDetector::new(&registry, &registry)
        .get_changes(&initial, &current)
        .expect("diff succeeds")
        .expect("slot changed");
    let rendered = changes.render(&RenderConfig::new().with_color(true));
    let plain = changes.render(&RenderConfig::new());

    assert_eq!(
        plain,
        "@ [\"held\"]\n- {\"__id\":1,\"__type\":\"Item\"}\n+ {\"__id\":2,\"__type\":\"Item\"}\n"
    );
    assert!(rendered.starts_with("@ [\"held\"]\n\u{1b}[31m- "));
    assert!(rendered.ends_with("\u{1b}[0m"));
    assert!(rendered.contains("\u{1b}[32m+ {\"__id\":2,\"__type\":\"Item\"}\n\u{1b}[0m"));
}
