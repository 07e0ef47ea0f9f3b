//! The relationship model: entities, scalar fields and links between them.
//!
//! Built once by [`Model::build`] and read-only afterwards. Links refer to
//! other entities by [`EntityId`] so that mutually referencing entities need
//! no shared ownership.

mod build;

pub use build::ModelOptions;

use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as Json;
use smallvec::SmallVec;

use crate::codec::{ScalarCodec, ScalarType};
use crate::error::{GraphError, Result};
use crate::value::Value;

pub use crate::schema::Cardinality;

/// Column list of a link key. Keys are rarely wider than two columns.
pub type KeyColumns = SmallVec<[String; 2]>;

/// Position of an entity in its [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Model {
    entities: IndexMap<String, Entity>,
}

impl Model {
    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Result<&Entity> {
        self.entities
            .get(name)
            .ok_or_else(|| GraphError::UnknownEntity(name.to_string()))
    }

    /// Looks up the entity backed by `table`.
    pub fn entity_for_table(&self, table: &str) -> Option<&Entity> {
        self.entities.values().find(|entity| entity.table == table)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Index<EntityId> for Model {
    type Output = Entity;

    fn index(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }
}

#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub table: String,
    pub pivot: bool,
    pub fields: IndexMap<String, Field>,
}

impl Entity {
    pub fn field(&self, name: &str) -> Result<&Field> {
        self.fields.get(name).ok_or_else(|| GraphError::UnknownField {
            entity: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Primary-key fields in declaration order.
    pub fn primary_key(&self) -> impl Iterator<Item = (&Field, &ScalarDescriptor)> {
        self.scalars().filter(|(field, _)| field.primary_key)
    }

    pub fn scalars(&self) -> impl Iterator<Item = (&Field, &ScalarDescriptor)> {
        self.fields.values().filter_map(|field| match &field.store {
            FieldStore::Scalar(scalar) => Some((field, scalar)),
            FieldStore::Linked(_) => None,
        })
    }

    /// Scalar field backed by `column`.
    pub fn field_for_column(&self, column: &str) -> Option<(&Field, &ScalarDescriptor)> {
        self.scalars().find(|(_, scalar)| scalar.column == column)
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub store: FieldStore,
}

impl Field {
    pub fn scalar(&self) -> Result<&ScalarDescriptor> {
        match &self.store {
            FieldStore::Scalar(scalar) => Ok(scalar),
            FieldStore::Linked(_) => Err(GraphError::NotScalar(self.name.clone())),
        }
    }

    pub fn link(&self) -> Result<&LinkDescriptor> {
        match &self.store {
            FieldStore::Linked(link) => Ok(link),
            FieldStore::Scalar(_) => Err(GraphError::NotLinked(self.name.clone())),
        }
    }
}

/// What backs a field in the store.
#[derive(Debug)]
pub enum FieldStore {
    Scalar(ScalarDescriptor),
    Linked(LinkDescriptor),
}

#[derive(Debug, Clone)]
pub struct ScalarDescriptor {
    pub column: String,
    pub kind: ScalarType,
    pub codec: Arc<dyn ScalarCodec>,
}

impl ScalarDescriptor {
    /// Encodes a client value for `field`; `null` becomes `NULL`.
    pub fn encode(&self, field: &str, value: &Json) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.codec
            .encode(value)
            .map_err(|err| GraphError::InvalidValue {
                field: field.to_string(),
                reason: err.to_string(),
            })
    }

    /// Decodes a store value; `NULL` becomes `null`.
    pub fn decode(&self, value: Value) -> Result<Json> {
        if value.is_null() {
            return Ok(Json::Null);
        }
        self.codec.decode(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkDescriptor {
    pub source: EntityId,
    pub target: EntityId,
    /// Columns of `source` matched by the join.
    pub columns: KeyColumns,
    /// Columns matched on the far side of the first hop: `target` for direct
    /// links, the pivot entity for pivot links.
    pub foreign_columns: KeyColumns,
    pub cardinality: Cardinality,
    /// `source` holds the foreign key.
    pub owner: bool,
    /// Hop from the pivot entity to `target`.
    pub pivot: Option<Box<LinkDescriptor>>,
}

impl LinkDescriptor {
    /// Entity joined by the first hop.
    pub fn joined(&self) -> EntityId {
        self.pivot.as_ref().map_or(self.target, |pivot| pivot.source)
    }

    /// Local and foreign column pairs of the first hop.
    pub fn key_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.foreign_columns.iter().map(String::as_str))
    }
}
