//! Change records produced by the engine and the policy for accumulating
//! them per key.

use std::collections::BTreeMap;
use std::fmt;

use crate::Node;

/// A change to an entity held in a field or a collection slot.
///
/// `K` is the key type of the container: field names for entities, indices
/// for collections. Changes are recorded under the key of the *initial*
/// side except [`EntityChange::Add`], which is recorded under the key the
/// new entity occupies on the current side.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityChange<K> {
    /// An entity with no match on the initial side appeared.
    Add(Node),
    /// The matched entity's contents changed.
    Edit(Changes),
    /// The matched entity now lives under another key.
    Move(K),
    /// The entity has no match on the current side.
    Remove(Node),
}

/// A change to a collection-typed field.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionChange {
    /// The collection appeared where there was none.
    AddAll(Node),
    /// The collection disappeared.
    RemoveAll(Node),
    /// Items of the collection changed.
    Edit(ItemChanges),
}

/// The payload recorded for one entity field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldChange {
    /// A Value field was overwritten.
    Assign(Node),
    /// Changes to entities entering or leaving the field, in append order.
    Entity(Vec<EntityChange<String>>),
    /// A collection-typed field changed.
    Collection(CollectionChange),
}

/// Per-field changes of an entity. Unchanged fields are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldChanges {
    fields: BTreeMap<String, FieldChange>,
}

/// Per-index changes of a collection. Unchanged indices are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemChanges {
    items: BTreeMap<usize, Vec<EntityChange<usize>>>,
}

/// The change set of a composite, shaped after the composite itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Changes {
    /// Changes of an entity, keyed by field.
    Entity(FieldChanges),
    /// Changes of a collection, keyed by index.
    Collection(ItemChanges),
}

/// Accumulates entity changes under a key, appending to whatever the key
/// already holds.
pub(crate) trait EntityChangeSink<K> {
    fn push(&mut self, key: K, change: EntityChange<K>);
}

impl FieldChanges {
    /// Creates an empty change map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity change at `key`.
    ///
    /// ```
    /// # use entdiff_core::{EntityChange, FieldChange, FieldChanges, Node};
    /// let mut changes = FieldChanges::new();
    /// changes.push_entity_change("owner", EntityChange::Move("manager".to_string()));
    /// changes.push_entity_change("owner", EntityChange::Add(Node::Null));
    /// let Some(FieldChange::Entity(list)) = changes.get("owner") else { unreachable!() };
    /// assert_eq!(list.len(), 2);
    /// ```
    pub fn push_entity_change(&mut self, key: impl Into<String>, change: EntityChange<String>) {
        let key = key.into();
        match self.fields.get_mut(&key) {
            Some(FieldChange::Entity(list)) => list.push(change),
            _ => {
                self.fields.insert(key, FieldChange::Entity(vec![change]));
            }
        }
    }

    /// Records a single-payload change at `key`, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, change: FieldChange) {
        self.fields.insert(key.into(), change);
    }

    /// Returns the change recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldChange> {
        self.fields.get(key)
    }

    /// Iterates over changed fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.fields.iter().map(|(key, change)| (key.as_str(), change))
    }

    /// Returns the number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Indicates whether no field changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl EntityChangeSink<String> for FieldChanges {
    fn push(&mut self, key: String, change: EntityChange<String>) {
        self.push_entity_change(key, change);
    }
}

impl ItemChanges {
    /// Creates an empty change map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change at `index`.
    pub fn push(&mut self, index: usize, change: EntityChange<usize>) {
        self.items.entry(index).or_default().push(change);
    }

    /// Returns the changes recorded at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[EntityChange<usize>]> {
        self.items.get(&index).map(Vec::as_slice)
    }

    /// Iterates over changed indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[EntityChange<usize>])> {
        self.items.iter().map(|(index, changes)| (*index, changes.as_slice()))
    }

    /// Returns the number of changed indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Indicates whether no index changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EntityChangeSink<usize> for ItemChanges {
    fn push(&mut self, key: usize, change: EntityChange<usize>) {
        ItemChanges::push(self, key, change);
    }
}

impl Changes {
    /// Returns the field changes when this is an entity change set.
    #[must_use]
    pub fn as_entity(&self) -> Option<&FieldChanges> {
        match self {
            Self::Entity(fields) => Some(fields),
            Self::Collection(_) => None,
        }
    }

    /// Returns the item changes when this is a collection change set.
    #[must_use]
    pub fn as_collection(&self) -> Option<&ItemChanges> {
        match self {
            Self::Collection(items) => Some(items),
            Self::Entity(_) => None,
        }
    }

    /// Counts every change record, including those nested in edits.
    ///
    /// ```
    /// # use entdiff_core::{Changes, EntityChange, ItemChanges, Node};
    /// let mut items = ItemChanges::new();
    /// items.push(0, EntityChange::Move(1));
    /// items.push(1, EntityChange::Move(0));
    /// items.push(2, EntityChange::Remove(Node::Null));
    /// let summary = Changes::Collection(items).summary();
    /// assert_eq!(summary.moves, 2);
    /// assert_eq!(summary.total(), 3);
    /// ```
    #[must_use]
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        summary.absorb(self);
        summary
    }
}

/// Number of change records of each kind in a change set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Value fields overwritten.
    pub assigns: usize,
    /// Entities added.
    pub adds: usize,
    /// Entities removed.
    pub removes: usize,
    /// Entities edited.
    pub edits: usize,
    /// Entities moved.
    pub moves: usize,
    /// Collections that appeared.
    pub add_alls: usize,
    /// Collections that disappeared.
    pub remove_alls: usize,
}

impl ChangeSummary {
    /// Total number of change records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.assigns
            + self.adds
            + self.removes
            + self.edits
            + self.moves
            + self.add_alls
            + self.remove_alls
    }

    fn absorb(&mut self, changes: &Changes) {
        match changes {
            Changes::Entity(fields) => self.absorb_fields(fields),
            Changes::Collection(items) => self.absorb_items(items),
        }
    }

    fn absorb_fields(&mut self, fields: &FieldChanges) {
        for (_, change) in fields.iter() {
            match change {
                FieldChange::Assign(_) => self.assigns += 1,
                FieldChange::Entity(list) => list.iter().for_each(|c| self.absorb_entity(c)),
                FieldChange::Collection(CollectionChange::AddAll(_)) => self.add_alls += 1,
                FieldChange::Collection(CollectionChange::RemoveAll(_)) => self.remove_alls += 1,
                FieldChange::Collection(CollectionChange::Edit(items)) => {
                    self.edits += 1;
                    self.absorb_items(items);
                }
            }
        }
    }

    fn absorb_items(&mut self, items: &ItemChanges) {
        for (_, list) in items.iter() {
            list.iter().for_each(|c| self.absorb_entity(c));
        }
    }

    fn absorb_entity<K>(&mut self, change: &EntityChange<K>) {
        match change {
            EntityChange::Add(_) => self.adds += 1,
            EntityChange::Remove(_) => self.removes += 1,
            EntityChange::Move(_) => self.moves += 1,
            EntityChange::Edit(nested) => {
                self.edits += 1;
                self.absorb(nested);
            }
        }
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assigned, {} added, {} removed, {} edited, {} moved, {} collections added, \
             {} collections removed",
            self.assigns,
            self.adds,
            self.removes,
            self.edits,
            self.moves,
            self.add_alls,
            self.remove_alls
        )
    }
}
