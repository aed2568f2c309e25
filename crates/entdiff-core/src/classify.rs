use std::fmt;

use crate::Node;

/// The three kinds of node the engine distinguishes.
///
/// Values are compared by equality and never recursed into. Entities and
/// collections are composites: they are diffed structurally and their
/// members take part in identity matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// An atomic leaf.
    Value,
    /// A record of named fields.
    Entity,
    /// An ordered sequence of entities.
    Collection,
}

impl Node {
    /// Classifies the node.
    ///
    /// ```
    /// # use entdiff_core::{Node, Shape};
    /// assert_eq!(Node::Null.shape(), Shape::Value);
    /// assert_eq!(Node::entity([("a", Node::from(1))]).shape(), Shape::Entity);
    /// assert_eq!(Node::collection(Vec::new()).shape(), Shape::Collection);
    /// ```
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Undefined
            | Self::Null
            | Self::Bool(_)
            | Self::Number(_)
            | Self::BigInt(_)
            | Self::String(_)
            | Self::Symbol(_)
            | Self::Function(_)
            | Self::Timestamp(_) => Shape::Value,
            Self::Collection(_) => Shape::Collection,
            Self::Entity(_) => Shape::Entity,
        }
    }

    /// Indicates whether the node is a Value.
    #[must_use]
    pub fn is_value(&self) -> bool {
        self.shape() == Shape::Value
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Value => f.write_str("value"),
            Shape::Entity => f.write_str("entity"),
            Shape::Collection => f.write_str("collection"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn every_leaf_is_a_value() {
        let leaves = [
            Node::from(""),
            Node::from(1),
            Node::BigInt(1),
            Node::Symbol(String::new()),
            Node::Null,
            Node::Undefined,
            Node::Function("noop".into()),
            Node::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Node::from(false),
        ];
        for leaf in leaves {
            assert!(leaf.is_value(), "{leaf:?} should be a value");
        }
    }

    #[test]
    fn composites_are_not_values() {
        assert!(!Node::entity(Vec::<(String, Node)>::new()).is_value());
        assert!(!Node::collection([Node::from(1)]).is_value());
        assert_eq!(Node::collection(Vec::new()).shape(), Shape::Collection);
    }
}
