use super::ChangeDetector;
use crate::{
    Changes, CollectionChange, DiffError, EntityChange, FieldChange, FieldChanges,
    FieldEnumerator, IdentityProvider, Node,
};

/// Compares the fields of `keys` that hold Values or collections.
///
/// Fields starting out as an entity, or appearing as an entity where nothing
/// was before, belong to the identity-matched pass and are skipped here. A
/// Value turning into an entity is assigned, replacing the identity pass's
/// `Add`. A collection turning into anything but a collection or nothing is
/// handed back to the dispatcher, whose errors abort the comparison.
pub(super) fn diff_value_fields<I, F>(
    detector: &ChangeDetector<I, F>,
    keys: &[String],
    initial: &Node,
    current: &Node,
    changes: &mut FieldChanges,
) -> Result<(), DiffError>
where
    I: IdentityProvider,
    F: FieldEnumerator,
{
    for key in keys {
        let (before, after) = (initial.field(key), current.field(key));
        let change = match (before, after) {
            (Node::Entity(_), _) => continue,
            (_, Node::Entity(_)) if before.is_nullish() => continue,
            (Node::Collection(_), _) if after.is_nullish() => {
                FieldChange::Collection(CollectionChange::RemoveAll(before.clone()))
            }
            (_, Node::Collection(_)) if before.is_nullish() => {
                FieldChange::Collection(CollectionChange::AddAll(after.clone()))
            }
            (Node::Collection(_), _) => match detector.get_changes(before, after)? {
                Some(Changes::Collection(items)) => {
                    FieldChange::Collection(CollectionChange::Edit(items))
                }
                Some(nested) => FieldChange::Entity(vec![EntityChange::Edit(nested)]),
                None => continue,
            },
            _ if before.loose_eq(after) => continue,
            _ => FieldChange::Assign(after.clone()),
        };
        changes.set(key.as_str(), change);
    }
    Ok(())
}
