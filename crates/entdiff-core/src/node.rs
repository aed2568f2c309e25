use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{
    CanonicalizeError, ChangeDetector, Changes, DiffError, FieldEnumerator, IdentityProvider,
    Number,
};

const DATE_TAG: &str = "$date";
const BIGINT_TAG: &str = "$bigint";
const SYMBOL_TAG: &str = "$symbol";
const FUNCTION_TAG: &str = "$function";
const DESCRIBE_LIMIT: usize = 96;

static UNDEFINED: Node = Node::Undefined;

/// A node of the entity graph compared by the engine.
///
/// Leaves are Values, [`Node::Entity`] is a record of named fields and
/// [`Node::Collection`] is an ordered sequence of entities. See
/// [`Shape`](crate::Shape) for the classification rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Node {
    /// An absent value. Missing entity fields read as `Undefined`.
    Undefined,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A finite double.
    Number(Number),
    /// An arbitrary-size integer.
    BigInt(i128),
    /// A string.
    String(String),
    /// A symbol, identified by its description.
    Symbol(String),
    /// A function reference, identified by its name.
    Function(String),
    /// A point in time.
    Timestamp(DateTime<Utc>),
    /// An ordered sequence of identity-bearing entities.
    Collection(Vec<Node>),
    /// A record of named fields.
    Entity(BTreeMap<String, Node>),
}

impl Node {
    /// Builds an entity from `(field, value)` pairs.
    ///
    /// ```
    /// # use entdiff_core::Node;
    /// let order = Node::entity([("__id", Node::from("o-1")), ("total", Node::from(3))]);
    /// assert_eq!(order.field("total"), &Node::from(3));
    /// ```
    #[must_use]
    pub fn entity<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Node)>,
        K: Into<String>,
    {
        Self::Entity(fields.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }

    /// Builds a collection from its items.
    #[must_use]
    pub fn collection<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        Self::Collection(items.into_iter().collect())
    }

    /// Parses a JSON string into the canonical node representation.
    ///
    /// Objects holding a single `$date`, `$bigint`, `$symbol` or `$function`
    /// key decode to the matching leaf.
    ///
    /// ```
    /// # use entdiff_core::Node;
    /// let node = Node::from_json_str("{\"created\":{\"$date\":\"2024-05-01T10:00:00Z\"}}")?;
    /// assert!(matches!(node.field("created"), Node::Timestamp(_)));
    /// # Ok::<(), entdiff_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        if input.trim().is_empty() {
            return Ok(Self::Undefined);
        }
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Parses a YAML string into the canonical node representation.
    ///
    /// ```
    /// # use entdiff_core::Node;
    /// let node = Node::from_yaml_str("---\n__id: 42\n")?;
    /// assert!(matches!(node, Node::Entity(_)));
    /// # Ok::<(), entdiff_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        if input.trim().is_empty() {
            return Ok(Self::Undefined);
        }
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value into a [`Node`].
    pub fn from_json_value(value: JsonValue) -> Result<Self, CanonicalizeError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => {
                let Some(as_f64) = num.as_f64() else {
                    return Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() });
                };
                Ok(Self::Number(Number::new(as_f64)?))
            }
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Collection(items))
            }
            JsonValue::Object(map) => {
                let mut fields = BTreeMap::new();
                for (key, value) in map {
                    fields.insert(key, Self::from_json_value(value)?);
                }
                decode_fields(fields)
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, CanonicalizeError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => {
                if let Some(f) = num.as_f64() {
                    return Ok(Self::Number(Number::new(f)?));
                }
                if let Some(i) = num.as_i64() {
                    return Ok(Self::Number(Number::new(i as f64)?));
                }
                if let Some(u) = num.as_u64() {
                    return Ok(Self::Number(Number::new(u as f64)?));
                }
                Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() })
            }
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Collection(items))
            }
            YamlValue::Mapping(map) => {
                let mut fields = BTreeMap::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(CanonicalizeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    fields.insert(key, Self::from_yaml_value(value)?);
                }
                decode_fields(fields)
            }
            YamlValue::Tagged(tagged) => {
                Err(CanonicalizeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Converts the node into a serde JSON value.
    ///
    /// Returns `None` for a root [`Node::Undefined`]. Undefined entity fields
    /// are dropped and undefined collection items become `null`.
    #[must_use]
    pub fn to_json_value(&self) -> Option<JsonValue> {
        match self {
            Self::Undefined => None,
            Self::Null => Some(JsonValue::Null),
            Self::Bool(v) => Some(JsonValue::Bool(*v)),
            Self::Number(n) => Some(JsonValue::Number(n.to_json_number())),
            Self::BigInt(n) => Some(tagged(BIGINT_TAG, n.to_string())),
            Self::String(s) => Some(JsonValue::String(s.clone())),
            Self::Symbol(s) => Some(tagged(SYMBOL_TAG, s.clone())),
            Self::Function(s) => Some(tagged(FUNCTION_TAG, s.clone())),
            Self::Timestamp(at) => {
                Some(tagged(DATE_TAG, at.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            }
            Self::Collection(items) => Some(JsonValue::Array(
                items.iter().map(|item| item.to_json_value().unwrap_or(JsonValue::Null)).collect(),
            )),
            Self::Entity(fields) => {
                let mut object = serde_json::Map::new();
                for (key, value) in fields {
                    if let Some(value) = value.to_json_value() {
                        object.insert(key.clone(), value);
                    }
                }
                Some(JsonValue::Object(object))
            }
        }
    }

    /// Reads an entity field. Missing fields, and fields of non-entities,
    /// read as [`Node::Undefined`].
    #[must_use]
    pub fn field(&self, key: &str) -> &Node {
        match self {
            Self::Entity(fields) => fields.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Indicates whether the node is `Null` or `Undefined`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Equality that treats `Null` and `Undefined` as the same absent value.
    ///
    /// ```
    /// # use entdiff_core::Node;
    /// assert!(Node::Null.loose_eq(&Node::Undefined));
    /// assert!(!Node::Null.loose_eq(&Node::from(0)));
    /// ```
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        (self.is_nullish() && other.is_nullish()) || self == other
    }

    /// Short single-line rendering used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        if text.len() > DESCRIBE_LIMIT {
            let mut cut = DESCRIBE_LIMIT;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            text.push_str("...");
        }
        text
    }

    /// Computes the change set between this node and `other`.
    ///
    /// ```
    /// # use entdiff_core::{ChangeDetector, Node, SchemaRegistry, Schema};
    /// let registry = SchemaRegistry::new().with_schema(Schema::new("Tag", ["label"]))?;
    /// let detector = ChangeDetector::new(&registry, &registry);
    /// let before = Node::entity([("__type", Node::from("Tag")), ("label", Node::from("a"))]);
    /// let after = Node::entity([("__type", Node::from("Tag")), ("label", Node::from("b"))]);
    /// assert!(before.changes(&after, &detector)?.is_some());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn changes<I, F>(
        &self,
        other: &Self,
        detector: &ChangeDetector<I, F>,
    ) -> Result<Option<Changes>, DiffError>
    where
        I: IdentityProvider,
        F: FieldEnumerator,
    {
        detector.get_changes(self, other)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_value() {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("undefined"),
        }
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<Number> for Node {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for Node {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl TryFrom<JsonValue> for Node {
    type Error = CanonicalizeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

fn tagged(tag: &str, payload: String) -> JsonValue {
    let mut object = serde_json::Map::new();
    object.insert(tag.to_owned(), JsonValue::String(payload));
    JsonValue::Object(object)
}

fn decode_fields(mut fields: BTreeMap<String, Node>) -> Result<Node, CanonicalizeError> {
    if fields.len() != 1 {
        return Ok(Node::Entity(fields));
    }
    let tag = match fields.keys().next().map(String::as_str) {
        Some(DATE_TAG) => DATE_TAG,
        Some(BIGINT_TAG) => BIGINT_TAG,
        Some(SYMBOL_TAG) => SYMBOL_TAG,
        Some(FUNCTION_TAG) => FUNCTION_TAG,
        _ => return Ok(Node::Entity(fields)),
    };
    let payload = fields.remove(tag).unwrap_or(Node::Undefined);
    let invalid = |reason: String| CanonicalizeError::InvalidExtension { tag, reason };
    match (tag, payload) {
        (DATE_TAG, Node::String(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|at| Node::Timestamp(at.with_timezone(&Utc)))
            .map_err(|err| invalid(err.to_string())),
        (BIGINT_TAG, Node::String(text)) => {
            text.trim().parse::<i128>().map(Node::BigInt).map_err(|err| invalid(err.to_string()))
        }
        (BIGINT_TAG, Node::Number(number)) => number
            .as_i64()
            .map(|int| Node::BigInt(i128::from(int)))
            .ok_or_else(|| invalid(format!("{number} is not an integer"))),
        (SYMBOL_TAG, Node::String(text)) => Ok(Node::Symbol(text)),
        (FUNCTION_TAG, Node::String(text)) => Ok(Node::Function(text)),
        (_, other) => Err(invalid(format!("unexpected payload {other}"))),
    }
}
