use tracing::trace;

use super::{matching, ChangeDetector};
use crate::{DiffError, FieldEnumerator, IdentityProvider, ItemChanges, Node};

/// Diffs two collections by item identity.
///
/// Position changes surface as moves keyed by the item's initial index;
/// every item on both sides must be an identity-bearing entity.
pub(super) fn diff_collections<I, F>(
    detector: &ChangeDetector<I, F>,
    initial: &[Node],
    current: &[Node],
) -> Result<Option<ItemChanges>, DiffError>
where
    I: IdentityProvider,
    F: FieldEnumerator,
{
    if std::ptr::eq(initial, current) {
        return Ok(None);
    }
    trace!(initial = initial.len(), current = current.len(), "diffing collection");

    let initial: Vec<(usize, &Node)> = initial.iter().enumerate().collect();
    let current: Vec<(usize, &Node)> = current.iter().enumerate().collect();
    let mut changes = ItemChanges::new();
    matching::match_identities(detector, &initial, &current, &mut changes)?;

    Ok((!changes.is_empty()).then_some(changes))
}
