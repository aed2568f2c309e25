use crate::Node;

/// Lists the fields of an entity that take part in a comparison.
///
/// Implementations typically read a type discriminator carried by the
/// entity. An empty list marks an entity the enumerator does not recognise
/// and aborts the comparison with [`DiffError::NoKeys`](crate::DiffError::NoKeys).
pub trait FieldEnumerator {
    /// Returns the ordered field keys to compare for `entity`.
    fn fields(&self, entity: &Node) -> Vec<String>;
}

impl<T> FieldEnumerator for &T
where
    T: FieldEnumerator + ?Sized,
{
    fn fields(&self, entity: &Node) -> Vec<String> {
        (**self).fields(entity)
    }
}

/// Adapts a closure into a [`FieldEnumerator`].
///
/// ```
/// # use entdiff_core::{fields_fn, FieldEnumerator, Node};
/// let enumerator = fields_fn(|_: &Node| vec!["name".to_string()]);
/// assert_eq!(enumerator.fields(&Node::Null), ["name"]);
/// ```
pub fn fields_fn<F>(f: F) -> FnFieldEnumerator<F>
where
    F: Fn(&Node) -> Vec<String>,
{
    FnFieldEnumerator(f)
}

/// A [`FieldEnumerator`] backed by a closure. See [`fields_fn`].
#[derive(Clone, Copy, Debug)]
pub struct FnFieldEnumerator<F>(F);

impl<F> FieldEnumerator for FnFieldEnumerator<F>
where
    F: Fn(&Node) -> Vec<String>,
{
    fn fields(&self, entity: &Node) -> Vec<String> {
        (self.0)(entity)
    }
}
