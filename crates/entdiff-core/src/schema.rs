//! Type-discriminated schemas supplying both engine collaborators.
//!
//! A [`SchemaRegistry`] maps the value of a discriminator field (default
//! `__type`) to the ordered fields compared for entities of that type, and
//! reads identities from an identity field (default `__id`). It implements
//! [`FieldEnumerator`] and [`IdentityProvider`], so one registry can back a
//! [`ChangeDetector`](crate::ChangeDetector) on its own.
//!
//! Registries are built in code or loaded from JSON or YAML documents:
//!
//! ```yaml
//! type_field: kind      # optional, defaults to __type
//! id_field: uid         # optional, defaults to __id
//! schemas:
//!   - type: Order
//!     fields: [customer, lines, total]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FieldEnumerator, Identity, IdentityProvider, Node, SchemaError};

/// Default discriminator field.
pub const DEFAULT_TYPE_FIELD: &str = "__type";
/// Default identity field.
pub const DEFAULT_ID_FIELD: &str = "__id";

/// The ordered fields compared for one entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(rename = "type")]
    type_name: String,
    fields: Vec<String>,
}

impl Schema {
    /// Creates a schema for `type_name` comparing `fields` in order.
    ///
    /// ```
    /// # use entdiff_core::Schema;
    /// let schema = Schema::new("Order", ["customer", "total"]);
    /// assert_eq!(schema.type_name(), "Order");
    /// assert_eq!(schema.fields(), ["customer", "total"]);
    /// ```
    #[must_use]
    pub fn new<T, I>(type_name: T, fields: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self { type_name: type_name.into(), fields: fields.into_iter().map(Into::into).collect() }
    }

    /// Returns the discriminator value this schema applies to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the compared fields in order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.type_name.is_empty() {
            return Err(SchemaError::EmptyTypeName);
        }
        for (at, field) in self.fields.iter().enumerate() {
            if field.is_empty() {
                return Err(SchemaError::EmptyFieldName { type_name: self.type_name.clone() });
            }
            if self.fields[..at].contains(field) {
                return Err(SchemaError::DuplicateField {
                    type_name: self.type_name.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Schemas keyed by discriminator value, plus the field conventions used to
/// read discriminators and identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaRegistry {
    type_field: String,
    id_field: String,
    schemas: BTreeMap<String, Schema>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(default = "default_type_field")]
    type_field: String,
    #[serde(default = "default_id_field")]
    id_field: String,
    #[serde(default)]
    schemas: Vec<Schema>,
}

fn default_type_field() -> String {
    DEFAULT_TYPE_FIELD.to_string()
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self {
            type_field: default_type_field(),
            id_field: default_id_field(),
            schemas: BTreeMap::new(),
        }
    }
}

impl SchemaRegistry {
    /// Creates an empty registry with the default field conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, returning the extended registry.
    ///
    /// ```
    /// # use entdiff_core::{Schema, SchemaError, SchemaRegistry};
    /// let registry = SchemaRegistry::new().with_schema(Schema::new("Tag", ["label"]))?;
    /// let err = registry.with_schema(Schema::new("Tag", ["colour"])).unwrap_err();
    /// assert!(matches!(err, SchemaError::DuplicateType { .. }));
    /// # Ok::<(), SchemaError>(())
    /// ```
    pub fn with_schema(mut self, schema: Schema) -> Result<Self, SchemaError> {
        self.register(schema)?;
        Ok(self)
    }

    /// Registers a schema in place.
    pub fn register(&mut self, schema: Schema) -> Result<(), SchemaError> {
        schema.validate()?;
        if self.schemas.contains_key(&schema.type_name) {
            return Err(SchemaError::DuplicateType { type_name: schema.type_name });
        }
        self.schemas.insert(schema.type_name.clone(), schema);
        Ok(())
    }

    /// Replaces the discriminator field.
    pub fn with_type_field(mut self, field: impl Into<String>) -> Result<Self, SchemaError> {
        self.type_field = field.into();
        self.check_convention()?;
        Ok(self)
    }

    /// Replaces the identity field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Result<Self, SchemaError> {
        self.id_field = field.into();
        self.check_convention()?;
        Ok(self)
    }

    /// Returns the discriminator field.
    #[must_use]
    pub fn type_field(&self) -> &str {
        &self.type_field
    }

    /// Returns the identity field.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the schema registered for `type_name`.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Schema> {
        self.schemas.get(type_name)
    }

    /// Iterates over registered schemas ordered by type name.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Indicates whether no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Parses a registry from a JSON document.
    ///
    /// ```
    /// # use entdiff_core::SchemaRegistry;
    /// let registry = SchemaRegistry::from_json_str(
    ///     r#"{"id_field": "uid", "schemas": [{"type": "Tag", "fields": ["label"]}]}"#,
    /// )?;
    /// assert_eq!(registry.id_field(), "uid");
    /// assert_eq!(registry.type_field(), "__type");
    /// # Ok::<(), entdiff_core::SchemaError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        Self::from_document(serde_json::from_str(input)?)
    }

    /// Parses a registry from a YAML document.
    pub fn from_yaml_str(input: &str) -> Result<Self, SchemaError> {
        Self::from_document(serde_yaml::from_str(input)?)
    }

    /// Loads a registry from a file, parsed as YAML for `.yaml`/`.yml`
    /// extensions and as JSON otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path)
            .map_err(|source| SchemaError::Io { path: path.display().to_string(), source })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let registry =
            if is_yaml { Self::from_yaml_str(&input)? } else { Self::from_json_str(&input)? };
        debug!(path = %path.display(), schemas = registry.len(), "loaded schema registry");
        Ok(registry)
    }

    fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        let mut registry = Self::new()
            .with_type_field(document.type_field)?
            .with_id_field(document.id_field)?;
        for schema in document.schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    fn check_convention(&self) -> Result<(), SchemaError> {
        if self.type_field.is_empty() || self.id_field.is_empty() || self.type_field == self.id_field
        {
            return Err(SchemaError::InvalidConvention {
                type_field: self.type_field.clone(),
                id_field: self.id_field.clone(),
            });
        }
        Ok(())
    }
}

impl FieldEnumerator for SchemaRegistry {
    fn fields(&self, entity: &Node) -> Vec<String> {
        match entity.field(&self.type_field) {
            Node::String(type_name) => {
                self.schemas.get(type_name).map(|schema| schema.fields.clone()).unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }
}

impl IdentityProvider for SchemaRegistry {
    fn identity(&self, node: &Node) -> Option<Identity> {
        match node.field(&self.id_field) {
            Node::String(id) => Some(Identity::Text(id.clone())),
            Node::Number(n) => n.as_i64().map(Identity::Int),
            Node::BigInt(n) => i64::try_from(*n).ok().map(Identity::Int),
            _ => None,
        }
    }
}
