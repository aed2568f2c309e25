use thiserror::Error;

use crate::Identity;

/// Errors that can occur while canonicalizing external data into [`Node`](crate::Node).
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags carry no meaning in the entity model and are rejected.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
    /// A `$date`, `$bigint`, `$symbol` or `$function` wrapper held an
    /// unusable payload.
    #[error("invalid {tag} value: {reason}")]
    InvalidExtension {
        /// The extension key, including the leading `$`.
        tag: &'static str,
        /// Why the payload was rejected.
        reason: String,
    },
}

/// Errors that abort a comparison. No partial change set is ever returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A Value was passed where an entity or collection was required.
    #[error("value types cannot be diffed: {found}")]
    InvalidArgument {
        /// Short description of the offending value.
        found: String,
    },
    /// The field enumerator returned no keys for an entity.
    #[error("no keys returned for: {entity}")]
    NoKeys {
        /// Short description of the entity.
        entity: String,
    },
    /// The identity provider returned nothing for an entity.
    #[error("no identity returned for: {entity}")]
    MissingIdentity {
        /// Short description of the entity.
        entity: String,
    },
    /// Two entities on the same side of a comparison share an identity.
    #[error("identity {identity} duplicated by: {entity}")]
    DuplicateIdentity {
        /// The shared identity.
        identity: Identity,
        /// Short description of the second entity carrying it.
        entity: String,
    },
}

/// Errors emitted when building or loading a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Type names must be non-empty strings.
    #[error("schema type names must be non-empty")]
    EmptyTypeName,
    /// Field names must be non-empty strings.
    #[error("schema {type_name} declares an empty field name")]
    EmptyFieldName {
        /// The schema declaring the field.
        type_name: String,
    },
    /// Each type may be registered only once.
    #[error("schema {type_name} is registered more than once")]
    DuplicateType {
        /// The repeated type name.
        type_name: String,
    },
    /// Each field may appear only once per schema.
    #[error("schema {type_name} declares field {field} more than once")]
    DuplicateField {
        /// The schema declaring the field.
        type_name: String,
        /// The repeated field.
        field: String,
    },
    /// The discriminator and identity fields must be distinct, non-empty names.
    #[error("invalid convention fields: type field {type_field:?}, id field {id_field:?}")]
    InvalidConvention {
        /// The configured discriminator field.
        type_field: String,
        /// The configured identity field.
        id_field: String,
    },
    /// The schema document was not valid JSON.
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema document was not valid YAML.
    #[error("invalid schema YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The schema file could not be read.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
