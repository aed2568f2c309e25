use tracing::{debug, trace};

use super::{matching, values, ChangeDetector};
use crate::{DiffError, FieldChanges, FieldEnumerator, IdentityProvider, Node, Shape};

/// Diffs two entities field by field.
///
/// Keys come from the field enumerator applied to `initial`. Fields holding
/// an entity on either side go through identity matching first. The
/// Value/collection pass then runs over every key and may replace what
/// matching recorded for a field that was a Value or a collection.
pub(super) fn diff_entities<I, F>(
    detector: &ChangeDetector<I, F>,
    initial: &Node,
    current: &Node,
) -> Result<Option<FieldChanges>, DiffError>
where
    I: IdentityProvider,
    F: FieldEnumerator,
{
    let keys = detector.fields.fields(initial);
    if keys.is_empty() {
        debug!(entity = %initial.describe(), "field enumerator returned no keys");
        return Err(DiffError::NoKeys { entity: initial.describe() });
    }
    trace!(keys = keys.len(), "diffing entity");

    let mut changes = FieldChanges::new();
    matching::match_identities(
        detector,
        &entity_fields(&keys, initial),
        &entity_fields(&keys, current),
        &mut changes,
    )?;
    values::diff_value_fields(detector, &keys, initial, current, &mut changes)?;

    Ok((!changes.is_empty()).then_some(changes))
}

/// Collects the `(key, value)` pairs of `node` whose value is an entity, in
/// key order.
fn entity_fields<'a>(keys: &[String], node: &'a Node) -> Vec<(String, &'a Node)> {
    keys.iter()
        .map(|key| (key, node.field(key)))
        .filter(|(_, value)| value.shape() == Shape::Entity)
        .map(|(key, value)| (key.clone(), value))
        .collect()
}
