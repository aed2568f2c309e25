//! Synthetic corpora for benchmarking the entdiff change detector.
//!
//! Every corpus builds an initial and a current catalog of identity-bearing
//! products in memory, so the benchmarks need no fixture files.
//!
//! # Examples
//!
//! ```
//! let corpus = entdiff_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "catalog-edits")
//!     .expect("registered corpus");
//! let dataset = corpus.load()?;
//! assert!(dataset.changes()?.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use entdiff_core::{
    CanonicalizeError, ChangeDetector, Changes, DiffError, Node, SchemaError, SchemaRegistry,
};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

const SCHEMA: &str = "\
schemas:
  - type: Catalog
    fields: [title, featured, products]
  - type: Product
    fields: [sku, price, category, variants]
  - type: Variant
    fields: [color, stock]
";

/// How the current catalog departs from the initial one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mutation {
    /// Every fifth product changes price.
    Edits,
    /// Products appear in reverse order.
    Reversal,
    /// Every third product is dropped and replaced by a new one, and every
    /// product's variants rotate by one.
    Churn,
}

/// A named, deterministic benchmark input.
#[derive(Debug)]
pub struct Corpus {
    name: &'static str,
    products: usize,
    mutation: Mutation,
}

static CORPORA: [Corpus; 4] = [
    Corpus { name: "catalog-edits", products: 200, mutation: Mutation::Edits },
    Corpus { name: "catalog-reversal", products: 200, mutation: Mutation::Reversal },
    Corpus { name: "catalog-churn", products: 200, mutation: Mutation::Churn },
    Corpus { name: "catalog-large-edits", products: 2_000, mutation: Mutation::Edits },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

/// Errors raised while building a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The embedded schema document was rejected.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A generated document could not be canonicalized.
    #[error(transparent)]
    Document(#[from] CanonicalizeError),
}

impl Corpus {
    /// Returns the corpus name used as the benchmark id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of products in the initial catalog.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.products
    }

    /// Builds the initial and current catalogs.
    pub fn load(&self) -> Result<Dataset, LoadError> {
        let registry = SchemaRegistry::from_yaml_str(SCHEMA)?;
        let initial: Vec<JsonValue> = (0..self.products).map(|id| product(id, 0)).collect();
        let current: Vec<JsonValue> = match self.mutation {
            Mutation::Edits => (0..self.products)
                .map(|id| if id % 5 == 0 { product(id, 1) } else { product(id, 0) })
                .collect(),
            Mutation::Reversal => (0..self.products).rev().map(|id| product(id, 0)).collect(),
            Mutation::Churn => (0..self.products)
                .map(|id| {
                    if id % 3 == 0 {
                        product(id + self.products, 0)
                    } else {
                        product(id, 1)
                    }
                })
                .collect(),
        };
        Ok(Dataset {
            registry,
            initial: Node::from_json_value(catalog(initial))?,
            current: Node::from_json_value(catalog(current))?,
        })
    }
}

/// An initial and a current catalog plus the registry describing them.
#[derive(Clone, Debug)]
pub struct Dataset {
    registry: SchemaRegistry,
    initial: Node,
    current: Node,
}

impl Dataset {
    /// Returns the initial catalog.
    #[must_use]
    pub fn initial(&self) -> &Node {
        &self.initial
    }

    /// Returns the current catalog.
    #[must_use]
    pub fn current(&self) -> &Node {
        &self.current
    }

    /// Compares the two catalogs.
    pub fn changes(&self) -> Result<Option<Changes>, DiffError> {
        self.compare(&self.initial, &self.current)
    }

    /// Compares two arbitrary graphs under this dataset's registry.
    pub fn compare(&self, initial: &Node, current: &Node) -> Result<Option<Changes>, DiffError> {
        ChangeDetector::new(&self.registry, &self.registry).get_changes(initial, current)
    }
}

fn catalog(products: Vec<JsonValue>) -> JsonValue {
    json!({
        "__type": "Catalog",
        "__id": "catalog",
        "title": "Spring",
        "featured": products.first().cloned(),
        "products": products,
    })
}

/// `revision` shifts the price and rotates the variants.
fn product(id: usize, revision: usize) -> JsonValue {
    let colors = ["red", "green", "blue"];
    let variants: Vec<JsonValue> = (0..colors.len())
        .map(|at| {
            let slot = (at + revision) % colors.len();
            json!({
                "__type": "Variant",
                "__id": format!("{id}-{}", colors[slot]),
                "color": colors[slot],
                "stock": slot * 10,
            })
        })
        .collect();
    json!({
        "__type": "Product",
        "__id": id,
        "sku": format!("SKU-{id:05}"),
        "price": 100 + id + revision,
        "category": "spring",
        "variants": variants,
    })
}
