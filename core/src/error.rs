use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Two links (or a link and a field) of one entity share a name
    #[error("Duplicate name \"{name}\" on entity \"{entity}\"")]
    DuplicateName { entity: String, name: String },

    /// Local and foreign key columns differ in length, or are empty
    #[error("Key arity error on \"{table}\": {message}")]
    KeyArity { table: String, message: String },

    /// A foreign key points at a table missing from the schema
    #[error("Table \"{0}\" not found")]
    UnknownTable(String),

    /// A store column type with no scalar mapping
    #[error("Unsupported column type \"{column_type}\" on \"{table}\".\"{column}\"")]
    UnsupportedColumnType {
        table: String,
        column: String,
        column_type: String,
    },

    /// The requested entity is not part of the model
    #[error("Unknown entity \"{0}\" requested")]
    UnknownEntity(String),

    /// A selection, filter or order references a field the entity lacks
    #[error("Unknown field \"{field}\" requested on \"{entity}\"")]
    UnknownField { entity: String, field: String },

    /// A path ends on, or a selection leaf is, a relationship field
    #[error("Expected a scalar field for \"{0}\"")]
    NotScalar(String),

    /// A sub-selection or path segment is placed on a scalar field
    #[error("Expected a linked field for \"{0}\"")]
    NotLinked(String),

    /// Filter operator outside LT, LTE, EQ, GTE, GT, NE, IN
    #[error("Unknown operator \"{0}\" received")]
    UnknownOperator(String),

    /// An `after`/`before` value that does not decode to the cursor arity
    #[error("Invalid \"{side}\" cursor value received: {reason}")]
    MalformedCursor { side: &'static str, reason: String },

    /// A client value the field codec cannot encode
    #[error("Invalid value for \"{field}\": {reason}")]
    InvalidValue { field: String, reason: String },

    /// A singular lookup without every primary-key member
    #[error("Missing key field \"{field}\" for \"{entity}\"")]
    MissingKey { entity: String, field: String },

    /// More than one row where at most one is allowed
    #[error("Cardinality violation: {0}")]
    Cardinality(String),

    /// A stored value the field codec cannot decode
    #[error("Codec error: {0}")]
    Codec(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the store collaborator
    #[error("Store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl GraphError {
    /// Whether this is a per-request validation failure raised before any
    /// query reaches the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GraphError::UnknownEntity(_)
                | GraphError::UnknownField { .. }
                | GraphError::NotScalar(_)
                | GraphError::NotLinked(_)
                | GraphError::UnknownOperator(_)
                | GraphError::MalformedCursor { .. }
                | GraphError::InvalidValue { .. }
                | GraphError::MissingKey { .. }
        )
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(err: toml::de::Error) -> Self {
        GraphError::Config(err.to_string())
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
