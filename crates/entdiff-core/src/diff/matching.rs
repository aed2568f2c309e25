use super::ChangeDetector;
use crate::changes::EntityChangeSink;
use crate::{DiffError, EntityChange, FieldEnumerator, IdentityIndex, IdentityProvider, Node};

/// Runs the identity-matched pass over `(key, entity)` pairs of both sides.
///
/// Removes, edits and moves are recorded under the initial key first, in the
/// order the initial pairs were given; adds follow under the current key.
/// The two groups may land on the same key.
pub(super) fn match_identities<K, S, I, F>(
    detector: &ChangeDetector<I, F>,
    initial: &[(K, &Node)],
    current: &[(K, &Node)],
    sink: &mut S,
) -> Result<(), DiffError>
where
    K: Clone + PartialEq,
    S: EntityChangeSink<K>,
    I: IdentityProvider,
    F: FieldEnumerator,
{
    let initial_index = index_positions(initial, &detector.identities)?;
    let current_index = index_positions(current, &detector.identities)?;

    for (identity, &at) in initial_index.iter() {
        let (initial_key, initial_node) = &initial[at];
        let Some(&matched) = current_index.get(identity) else {
            sink.push(initial_key.clone(), EntityChange::Remove((*initial_node).clone()));
            continue;
        };
        let (current_key, current_node) = &current[matched];
        if let Some(nested) = detector.get_changes(initial_node, current_node)? {
            sink.push(initial_key.clone(), EntityChange::Edit(nested));
        }
        if initial_key != current_key {
            sink.push(initial_key.clone(), EntityChange::Move(current_key.clone()));
        }
    }

    for (identity, &at) in current_index.iter() {
        if !initial_index.contains(identity) {
            let (current_key, current_node) = &current[at];
            sink.push(current_key.clone(), EntityChange::Add((*current_node).clone()));
        }
    }

    Ok(())
}

/// Indexes identities by position in `pairs` so keys need not be hashable.
fn index_positions<K, I>(
    pairs: &[(K, &Node)],
    identities: &I,
) -> Result<IdentityIndex<usize>, DiffError>
where
    I: IdentityProvider,
{
    IdentityIndex::build(pairs.iter().enumerate().map(|(at, (_, node))| (at, *node)), identities)
}
