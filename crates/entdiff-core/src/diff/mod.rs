//! The recursive diff engine.
//!
//! [`ChangeDetector::get_changes`] dispatches on the shape of its inputs:
//! two collections go to the collection differ, anything else to the entity
//! differ. Both differs share the identity-matched pass in `matching` and
//! call back into the dispatcher for matched composites, so recursion
//! bottoms out at Values, which are compared by equality.

mod collection;
mod entity;
mod matching;
mod path;
mod render;
mod values;

pub use path::{Path, PathSegment};
pub use render::RenderConfig;

use tracing::debug;

use crate::{Changes, DiffError, FieldEnumerator, IdentityProvider, Node};

/// Computes change sets between two versions of an entity graph.
///
/// The detector holds only its two collaborators; every comparison builds
/// fresh identity indices, so a detector can be shared across threads when
/// the collaborators can.
///
/// ```
/// use entdiff_core::{ChangeDetector, EntityChange, FieldChange, Node, Schema, SchemaRegistry};
///
/// let registry = SchemaRegistry::new()
///     .with_schema(Schema::new("Team", ["lead", "deputy"]))?
///     .with_schema(Schema::new("Person", ["name"]))?;
/// let detector = ChangeDetector::new(&registry, &registry);
///
/// let person = |id: &str| {
///     Node::entity([("__type", Node::from("Person")), ("__id", Node::from(id))])
/// };
/// let team = |lead: Node, deputy: Node| {
///     Node::entity([("__type", Node::from("Team")), ("lead", lead), ("deputy", deputy)])
/// };
///
/// let before = team(person("ada"), person("bob"));
/// let after = team(person("bob"), person("ada"));
/// let changes = detector.get_changes(&before, &after)?.expect("lead and deputy swapped");
/// let fields = changes.as_entity().unwrap();
/// assert_eq!(
///     fields.get("lead"),
///     Some(&FieldChange::Entity(vec![EntityChange::Move("deputy".to_string())]))
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ChangeDetector<I, F> {
    identities: I,
    fields: F,
}

impl<I, F> ChangeDetector<I, F>
where
    I: IdentityProvider,
    F: FieldEnumerator,
{
    /// Creates a detector from its identity provider and field enumerator.
    pub fn new(identities: I, fields: F) -> Self {
        Self { identities, fields }
    }

    /// Computes the changes turning `initial` into `current`.
    ///
    /// Returns `Ok(None)` when nothing changed. Both arguments must be
    /// composites; passing a Value fails with [`DiffError::InvalidArgument`].
    /// Any failure aborts the whole comparison.
    pub fn get_changes(
        &self,
        initial: &Node,
        current: &Node,
    ) -> Result<Option<Changes>, DiffError> {
        for node in [initial, current] {
            if node.is_value() {
                debug!(found = %node.describe(), "refusing to diff a value");
                return Err(DiffError::InvalidArgument { found: node.describe() });
            }
        }
        if std::ptr::eq(initial, current) {
            return Ok(None);
        }

        match (initial, current) {
            (Node::Collection(initial), Node::Collection(current)) => {
                Ok(collection::diff_collections(self, initial, current)?.map(Changes::Collection))
            }
            _ => Ok(entity::diff_entities(self, initial, current)?.map(Changes::Entity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields_fn, identity_fn, FieldChange, Identity};

    fn detector() -> ChangeDetector<impl IdentityProvider, impl FieldEnumerator> {
        ChangeDetector::new(
            identity_fn(|node: &Node| match node.field("id") {
                Node::Number(n) => n.as_i64().map(Identity::from),
                _ => None,
            }),
            fields_fn(|node: &Node| match node {
                Node::Entity(_) => vec!["id".to_string(), "n".to_string()],
                _ => Vec::new(),
            }),
        )
    }

    #[test]
    fn values_are_rejected_on_either_side() {
        let entity = Node::entity([("id", Node::from(1))]);
        for (initial, current) in [(&Node::from(""), &entity), (&entity, &Node::from(""))] {
            let err = detector().get_changes(initial, current).unwrap_err();
            assert!(matches!(err, DiffError::InvalidArgument { .. }));
        }
        let err = detector().get_changes(&Node::Null, &Node::Null).unwrap_err();
        assert!(matches!(err, DiffError::InvalidArgument { .. }));
    }

    #[test]
    fn same_reference_short_circuits() {
        // Both collaborators refuse everything, so any traversal would fail.
        let unrecognised = ChangeDetector::new(
            identity_fn(|_: &Node| None),
            fields_fn(|_: &Node| Vec::new()),
        );
        let entity = Node::entity([("id", Node::from(1))]);
        assert_eq!(unrecognised.get_changes(&entity, &entity), Ok(None));
        let items = Node::collection([Node::from(1)]);
        assert_eq!(unrecognised.get_changes(&items, &items), Ok(None));
    }

    #[test]
    fn entity_dispatch_keys_changes_by_field() {
        let initial = Node::entity([("id", Node::from(1)), ("n", Node::from(1))]);
        let current = Node::entity([("id", Node::from(1)), ("n", Node::from(2))]);
        let changes = detector().get_changes(&initial, &current).unwrap().unwrap();
        let fields = changes.as_entity().expect("entity changes");
        assert_eq!(fields.get("n"), Some(&FieldChange::Assign(Node::from(2))));
    }

    #[test]
    fn collection_against_entity_uses_entity_differ() {
        let items = Node::collection(Vec::new());
        let entity = Node::entity([("id", Node::from(1))]);
        let err = detector().get_changes(&items, &entity).unwrap_err();
        assert!(matches!(err, DiffError::NoKeys { .. }));
    }
}
