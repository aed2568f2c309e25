//! Identity-aware structural diffs of entity graphs.
//!
//! `entdiff-core` compares two snapshots of a graph made of typed,
//! identity-bearing entities and ordered collections of them. Entities are
//! correlated by identity rather than position, so a sub-entity that moved
//! to another field or index is reported as a move instead of a removal
//! followed by an addition.
//!
//! ```
//! use entdiff_core::{ChangeDetector, Node, RenderConfig, Schema, SchemaRegistry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = SchemaRegistry::new()
//!         .with_schema(Schema::new("Order", ["status", "lines"]))?
//!         .with_schema(Schema::new("Line", ["sku", "qty"]))?;
//!     let detector = ChangeDetector::new(&registry, &registry);
//!
//!     let before = Node::from_json_str(
//!         r#"{"__type": "Order", "status": "open", "lines": [
//!             {"__type": "Line", "__id": 1, "sku": "tea", "qty": 1},
//!             {"__type": "Line", "__id": 2, "sku": "jam", "qty": 1}
//!         ]}"#,
//!     )?;
//!     let after = Node::from_json_str(
//!         r#"{"__type": "Order", "status": "paid", "lines": [
//!             {"__type": "Line", "__id": 2, "sku": "jam", "qty": 3}
//!         ]}"#,
//!     )?;
//!
//!     let changes = detector.get_changes(&before, &after)?.expect("order changed");
//!     let rendered = changes.render(&RenderConfig::default());
//!     assert!(rendered.contains("@ [\"lines\",1,\"qty\"]\n= 3\n"));
//!     assert!(rendered.contains("@ [\"status\"]\n= \"paid\"\n"));
//!     assert_eq!(changes.summary().removes, 1);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod changes;
mod classify;
pub mod diff;
mod error;
mod fields;
mod identity;
mod node;
mod number;
pub mod schema;

pub use changes::{
    ChangeSummary, Changes, CollectionChange, EntityChange, FieldChange, FieldChanges,
    ItemChanges,
};
pub use classify::Shape;
pub use diff::{ChangeDetector, Path, PathSegment, RenderConfig};
pub use error::{CanonicalizeError, DiffError, SchemaError};
pub use fields::{fields_fn, FieldEnumerator, FnFieldEnumerator};
pub use identity::{identity_fn, FnIdentityProvider, Identity, IdentityIndex, IdentityProvider};
pub use node::Node;
pub use number::Number;
pub use schema::{Schema, SchemaRegistry};

/// Returns the semantic version of the `entdiff-core` crate.
///
/// ```
/// assert!(!entdiff_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
