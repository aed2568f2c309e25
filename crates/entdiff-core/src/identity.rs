//! Entity identities and the per-side identity index.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DiffError, Node};

/// Opaque token correlating an entity across the initial and current sides
/// of a comparison.
///
/// ```
/// # use entdiff_core::Identity;
/// assert_eq!(Identity::from("order-7").to_string(), "order-7");
/// assert_eq!(Identity::from(7).to_string(), "7");
/// assert_ne!(Identity::from("7"), Identity::from(7));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    /// Integral identity.
    Int(i64),
    /// Textual identity.
    Text(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Identity {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Supplies the identity of an entity.
///
/// Implementations must return a unique identity for every entity they are
/// asked about. Returning `None` for an entity aborts the comparison with
/// [`DiffError::MissingIdentity`].
pub trait IdentityProvider {
    /// Returns the identity of `node`, if it has one.
    fn identity(&self, node: &Node) -> Option<Identity>;
}

impl<T> IdentityProvider for &T
where
    T: IdentityProvider + ?Sized,
{
    fn identity(&self, node: &Node) -> Option<Identity> {
        (**self).identity(node)
    }
}

/// Adapts a closure into an [`IdentityProvider`].
///
/// ```
/// # use entdiff_core::{identity_fn, Identity, IdentityProvider, Node};
/// let provider = identity_fn(|node: &Node| match node.field("id") {
///     Node::String(id) => Some(Identity::from(id.as_str())),
///     _ => None,
/// });
/// let user = Node::entity([("id", Node::from("u-1"))]);
/// assert_eq!(provider.identity(&user), Some(Identity::from("u-1")));
/// ```
pub fn identity_fn<F>(f: F) -> FnIdentityProvider<F>
where
    F: Fn(&Node) -> Option<Identity>,
{
    FnIdentityProvider(f)
}

/// An [`IdentityProvider`] backed by a closure. See [`identity_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FnIdentityProvider<F>(F);

impl<F> IdentityProvider for FnIdentityProvider<F>
where
    F: Fn(&Node) -> Option<Identity>,
{
    fn identity(&self, node: &Node) -> Option<Identity> {
        (self.0)(node)
    }
}

/// Maps identities to the key (field name or item index) holding them on one
/// side of a comparison.
///
/// Iteration follows insertion order, which is the order of the keys the
/// index was built from.
#[derive(Clone, Debug)]
pub struct IdentityIndex<K> {
    entries: Vec<(Identity, K)>,
    positions: BTreeMap<Identity, usize>,
}

impl<K> IdentityIndex<K> {
    /// Builds the index for one side of a comparison.
    ///
    /// Every value passed in must be identity-bearing: Values never are and
    /// fail with [`DiffError::MissingIdentity`], as does an entity the provider
    /// returns no identity for. A second value with an identity already seen
    /// fails with [`DiffError::DuplicateIdentity`].
    ///
    /// ```
    /// # use entdiff_core::{identity_fn, DiffError, Identity, IdentityIndex, Node};
    /// let by_id = identity_fn(|node: &Node| match node.field("id") {
    ///     Node::Number(n) => n.as_i64().map(Identity::from),
    ///     _ => None,
    /// });
    /// let a = Node::entity([("id", Node::from(1))]);
    /// let b = Node::entity([("id", Node::from(2))]);
    /// let index = IdentityIndex::build([(0usize, &a), (1, &b)], &by_id)?;
    /// assert_eq!(index.get(&Identity::from(2)), Some(&1));
    ///
    /// let err = IdentityIndex::build([(0usize, &a), (1, &a)], &by_id).unwrap_err();
    /// assert!(matches!(err, DiffError::DuplicateIdentity { .. }));
    /// # Ok::<(), DiffError>(())
    /// ```
    pub fn build<'a, I, P>(pairs: I, provider: &P) -> Result<Self, DiffError>
    where
        I: IntoIterator<Item = (K, &'a Node)>,
        P: IdentityProvider + ?Sized,
    {
        let mut index = Self { entries: Vec::new(), positions: BTreeMap::new() };
        for (key, value) in pairs {
            let identity = if value.is_value() { None } else { provider.identity(value) };
            let Some(identity) = identity else {
                debug!(entity = %value.describe(), "identity provider returned nothing");
                return Err(DiffError::MissingIdentity { entity: value.describe() });
            };
            if index.positions.contains_key(&identity) {
                debug!(%identity, "identity shared by two values on one side");
                return Err(DiffError::DuplicateIdentity { identity, entity: value.describe() });
            }
            index.positions.insert(identity.clone(), index.entries.len());
            index.entries.push((identity, key));
        }
        Ok(index)
    }

    /// Returns the key holding `identity`.
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<&K> {
        self.positions.get(identity).map(|&position| &self.entries[position].1)
    }

    /// Indicates whether `identity` was indexed.
    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.positions.contains_key(identity)
    }

    /// Iterates over `(identity, key)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &K)> {
        self.entries.iter().map(|(identity, key)| (identity, key))
    }

    /// Returns the number of indexed identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_id() -> impl IdentityProvider {
        identity_fn(|node: &Node| match node.field("id") {
            Node::String(id) => Some(Identity::from(id.as_str())),
            _ => None,
        })
    }

    fn item(id: &str) -> Node {
        Node::entity([("id", Node::from(id))])
    }

    #[test]
    fn iteration_follows_key_order() {
        let (b, a, c) = (item("b"), item("a"), item("c"));
        let pairs = vec![("x".to_string(), &b), ("y".to_string(), &a), ("z".to_string(), &c)];
        let index = IdentityIndex::build(pairs, &by_id()).unwrap();
        let order: Vec<(String, String)> =
            index.iter().map(|(id, key)| (id.to_string(), key.clone())).collect();
        let expected: Vec<(String, String)> = vec![
            ("b".to_string(), "x".to_string()),
            ("a".to_string(), "y".to_string()),
            ("c".to_string(), "z".to_string()),
        ];
        assert_eq!(order, expected);
        assert_eq!(index.len(), 3);
        assert!(index.contains(&Identity::from("a")));
        assert!(!index.contains(&Identity::from("d")));
    }

    #[test]
    fn entity_without_identity_is_rejected() {
        let anonymous = Node::entity([("name", Node::from("nobody"))]);
        let err = IdentityIndex::build([(0usize, &anonymous)], &by_id()).unwrap_err();
        assert!(matches!(err, DiffError::MissingIdentity { .. }));
    }

    #[test]
    fn values_never_carry_an_identity() {
        let always = identity_fn(|_: &Node| Some(Identity::from(1)));
        let value = Node::from("id");
        let err = IdentityIndex::build([(0usize, &value)], &always).unwrap_err();
        assert!(matches!(err, DiffError::MissingIdentity { .. }));
    }

    #[test]
    fn duplicate_reports_the_shared_identity() {
        let first = item("dup");
        let second = item("dup");
        let err = IdentityIndex::build([(0usize, &first), (1, &second)], &by_id()).unwrap_err();
        assert_eq!(
            err,
            DiffError::DuplicateIdentity {
                identity: Identity::from("dup"),
                entity: second.describe(),
            }
        );
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let index = IdentityIndex::<usize>::build(Vec::new(), &by_id()).unwrap();
        assert!(index.is_empty());
    }
}
