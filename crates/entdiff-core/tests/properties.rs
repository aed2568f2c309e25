use entdiff_core::{
    fields_fn, identity_fn, ChangeDetector, Changes, CollectionChange, DiffError, EntityChange,
    FieldChange, FieldChanges, FieldEnumerator, Identity, IdentityProvider, Node,
};
use proptest::prelude::*;

fn detector() -> ChangeDetector<impl IdentityProvider, impl FieldEnumerator> {
    ChangeDetector::new(
        identity_fn(|node: &Node| match node.field("id") {
            Node::Number(n) => n.as_i64().map(Identity::from),
            Node::String(id) => Some(Identity::from(id.as_str())),
            _ => None,
        }),
        fields_fn(|node: &Node| match node {
            Node::Entity(_) => ["a", "b", "k", "k2", "n", "items"].map(String::from).to_vec(),
            _ => Vec::new(),
        }),
    )
}

fn entity(id: i32) -> Node {
    Node::entity([("id", Node::from(id))])
}

fn entity_with(id: i32, n: i32) -> Node {
    Node::entity([("id", Node::from(id)), ("n", Node::from(n))])
}

fn holder<const N: usize>(fields: [(&str, Node); N]) -> Node {
    Node::entity(fields)
}

fn entity_changes(changes: &Changes, key: &str) -> Vec<EntityChange<String>> {
    match changes.as_entity().and_then(|fields| fields.get(key)) {
        Some(FieldChange::Entity(list)) => list.clone(),
        other => panic!("expected entity changes at {key}, got {other:?}"),
    }
}

#[test]
fn swapped_entities_move_to_each_other() {
    let initial = holder([("a", entity(1)), ("b", entity(2))]);
    let current = holder([("a", entity(2)), ("b", entity(1))]);
    let changes = detector().get_changes(&initial, &current).unwrap().unwrap();
    assert_eq!(entity_changes(&changes, "a"), [EntityChange::Move("b".to_string())]);
    assert_eq!(entity_changes(&changes, "b"), [EntityChange::Move("a".to_string())]);
}

#[test]
fn entity_kept_at_its_key_is_only_edited() {
    let initial = holder([("k", entity_with(7, 0))]);
    let current = holder([("k2", entity(8)), ("k", entity_with(7, 1))]);
    let changes = detector().get_changes(&initial, &current).unwrap().unwrap();

    let mut edited = FieldChanges::new();
    edited.set("n", FieldChange::Assign(Node::from(1)));
    assert_eq!(entity_changes(&changes, "k"), [EntityChange::Edit(Changes::Entity(edited))]);
    assert_eq!(entity_changes(&changes, "k2"), [EntityChange::Add(entity(8))]);
}

#[test]
fn edit_and_move_precede_an_arrival_at_the_origin_key() {
    // `7` moves from k to k2 while `8` arrives at k.
    let initial = holder([("k", entity_with(7, 0))]);
    let current = holder([("k", entity(8)), ("k2", entity_with(7, 1))]);
    let changes = detector().get_changes(&initial, &current).unwrap().unwrap();

    let mut edited = FieldChanges::new();
    edited.set("n", FieldChange::Assign(Node::from(1)));
    assert_eq!(
        entity_changes(&changes, "k"),
        [
            EntityChange::Edit(Changes::Entity(edited)),
            EntityChange::Move("k2".to_string()),
            EntityChange::Add(entity(8)),
        ]
    );
    assert!(changes.as_entity().unwrap().get("k2").is_none());
}

#[test]
fn vanished_entity_is_removed_at_its_key() {
    let initial = holder([("k", entity(3))]);
    let current = holder([("a", entity(4))]);
    let changes = detector().get_changes(&initial, &current).unwrap().unwrap();
    assert_eq!(entity_changes(&changes, "k"), [EntityChange::Remove(entity(3))]);
    assert_eq!(entity_changes(&changes, "a"), [EntityChange::Add(entity(4))]);
}

#[test]
fn sibling_fields_sharing_an_identity_fail() {
    let initial = holder([("a", entity(1)), ("b", entity(1))]);
    let current = holder([("a", entity(1))]);
    let err = detector().get_changes(&initial, &current).unwrap_err();
    assert_eq!(
        err,
        DiffError::DuplicateIdentity { identity: Identity::from(1), entity: entity(1).describe() }
    );
}

#[test]
fn entity_without_identity_fails() {
    let anonymous = Node::entity([("n", Node::from(1))]);
    let initial = holder([("a", entity(1))]);
    let current = holder([("a", anonymous)]);
    let err = detector().get_changes(&initial, &current).unwrap_err();
    assert!(matches!(err, DiffError::MissingIdentity { .. }));
}

#[test]
fn collection_fields_appear_and_disappear_whole() {
    let items = Node::collection([entity(1), entity(2)]);
    for absent in [Node::collection(Vec::new()), Node::Undefined, Node::Null] {
        let empty = holder([("items", absent.clone())]);
        let full = holder([("items", items.clone())]);

        let added = detector().get_changes(&empty, &full).unwrap().unwrap();
        let removed = detector().get_changes(&full, &empty).unwrap().unwrap();
        let field = |changes: &Changes| changes.as_entity().unwrap().get("items").cloned();

        if absent.is_nullish() {
            assert_eq!(
                field(&added),
                Some(FieldChange::Collection(CollectionChange::AddAll(items.clone())))
            );
            assert_eq!(
                field(&removed),
                Some(FieldChange::Collection(CollectionChange::RemoveAll(items.clone())))
            );
        } else {
            // An empty collection diffs item by item.
            let Some(FieldChange::Collection(CollectionChange::Edit(arrived))) = field(&added)
            else {
                panic!("expected item changes");
            };
            assert_eq!(arrived.len(), 2);
        }
    }
}

fn ids() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::btree_set(0..1_000i32, 0..12).prop_map(|set| set.into_iter().collect())
}

fn items(ids: &[i32], labels: &[u8]) -> Node {
    Node::collection(ids.iter().zip(labels.iter().cycle()).map(|(&id, &label)| {
        Node::entity([("id", Node::from(id)), ("n", Node::from(i32::from(label)))])
    }))
}

fn nullish() -> impl Strategy<Value = Node> {
    prop_oneof![Just(Node::Null), Just(Node::Undefined)]
}

proptest! {
    #[test]
    fn self_diff_is_empty(ids in ids(), labels in prop::collection::vec(any::<u8>(), 1..4)) {
        let collection = items(&ids, &labels);
        let wrapped = holder([("items", collection.clone()), ("n", Node::from(1))]);
        let detector = detector();
        prop_assert_eq!(detector.get_changes(&collection, &collection), Ok(None));
        prop_assert_eq!(detector.get_changes(&collection, &collection.clone()), Ok(None));
        prop_assert_eq!(detector.get_changes(&wrapped, &wrapped.clone()), Ok(None));
    }

    #[test]
    fn permutations_yield_moves_rebuilding_the_order(
        (ids, shuffled) in ids().prop_flat_map(|ids| (Just(ids.clone()), Just(ids).prop_shuffle())),
    ) {
        let labels = [0u8];
        let initial = items(&ids, &labels);
        let current = items(&shuffled, &labels);
        let changes = detector().get_changes(&initial, &current).unwrap();

        let mut rebuilt = ids.clone();
        if let Some(changes) = changes {
            let moves = changes.as_collection().expect("collection change set");
            for (from, list) in moves.iter() {
                prop_assert_eq!(list.len(), 1);
                let EntityChange::Move(to) = list[0] else {
                    return Err(TestCaseError::fail(format!("unexpected change {:?}", list[0])));
                };
                prop_assert_ne!(from, to);
                rebuilt[to] = ids[from];
            }
        } else {
            prop_assert_eq!(&ids, &shuffled);
        }
        prop_assert_eq!(rebuilt, shuffled);
    }

    #[test]
    fn nullish_value_fields_never_change(before in nullish(), after in nullish()) {
        let initial = holder([("n", before), ("a", entity(1))]);
        let current = holder([("n", after), ("a", entity(1))]);
        prop_assert_eq!(detector().get_changes(&initial, &current), Ok(None));
    }
}
