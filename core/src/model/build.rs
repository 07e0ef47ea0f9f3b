use std::collections::HashMap;

use indexmap::IndexMap;

use super::{
    Entity, EntityId, Field, FieldStore, KeyColumns, LinkDescriptor, Model, ScalarDescriptor,
};
use crate::codec::{Codecs, ScalarType};
use crate::error::{GraphError, Result};
use crate::schema::{
    DefaultNamingStrategy, InferredLink, NamingStrategy, NormalizedSchema, NormalizedTable,
    StoreSchema, normalize, table_links,
};
use crate::tablegraph_trace_build;

/// Knobs for [`Model::build`].
pub struct ModelOptions {
    pub naming: Box<dyn NamingStrategy + Send + Sync>,
    pub codecs: Codecs,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            naming: Box::new(DefaultNamingStrategy),
            codecs: Codecs::default(),
        }
    }
}

impl ModelOptions {
    pub fn naming(mut self, naming: impl NamingStrategy + Send + Sync + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = codecs;
        self
    }
}

impl std::fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOptions")
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Builds the model from raw store metadata.
    ///
    /// Entities are allocated first and populated afterwards, so links can
    /// point at entities declared later or at their own entity.
    pub fn build(schema: StoreSchema, options: ModelOptions) -> Result<Model> {
        let schema = normalize(schema);

        let mut entities: IndexMap<String, Entity> = IndexMap::with_capacity(schema.tables.len());
        let mut ids: HashMap<&str, EntityId> = HashMap::with_capacity(schema.tables.len());

        for (index, table) in schema.tables.values().enumerate() {
            let name = options.naming.entity_name(&table.meta.name);
            let id = EntityId(index);
            let entity = Entity {
                id,
                name: name.clone(),
                table: table.meta.name.clone(),
                pivot: table.is_pivot,
                fields: IndexMap::new(),
            };
            if entities.insert(name.clone(), entity).is_some() {
                return Err(GraphError::DuplicateName {
                    entity: name,
                    name: table.meta.name.clone(),
                });
            }
            ids.insert(table.meta.name.as_str(), id);
        }

        let builder = Builder {
            schema: &schema,
            ids: &ids,
            options: &options,
        };

        for (index, table) in schema.tables.values().enumerate() {
            let fields = builder.fields(EntityId(index), table)?;
            if let Some((_, entity)) = entities.get_index_mut(index) {
                entity.fields = fields;
            }
        }

        Ok(Model { entities })
    }
}

struct Builder<'a> {
    schema: &'a NormalizedSchema,
    ids: &'a HashMap<&'a str, EntityId>,
    options: &'a ModelOptions,
}

impl Builder<'_> {
    fn fields(&self, id: EntityId, table: &NormalizedTable) -> Result<IndexMap<String, Field>> {
        let naming = &self.options.naming;
        let entity = naming.entity_name(&table.meta.name);
        let primary_key = table.meta.primary_key();
        let mut fields = IndexMap::new();

        for column in table.meta.columns.values() {
            let name = naming.field_name(&table.meta.name, &column.name);
            let sole_key = primary_key.len() == 1 && primary_key[0] == column.name;
            let kind = ScalarType::for_column(column.kind, sole_key);
            let field = Field {
                name: name.clone(),
                nullable: column.nullable,
                primary_key: column.primary_key,
                store: FieldStore::Scalar(ScalarDescriptor {
                    column: column.name.clone(),
                    kind,
                    codec: self.options.codecs.get(kind),
                }),
            };
            if fields.insert(name.clone(), field).is_some() {
                return Err(GraphError::DuplicateName { entity, name });
            }
        }

        for link in table_links(self.schema, &table.meta.name, &[])? {
            let name = naming.link_name(&table.meta.name, &link);
            let nullable = link.key.columns.iter().all(|column| {
                table
                    .meta
                    .columns
                    .get(column)
                    .is_some_and(|column| column.nullable)
            });
            let descriptor = self.link(id, &link)?;

            tablegraph_trace_build!(entity = entity, link = name, cardinality = descriptor.cardinality; "link");

            let field = Field {
                name: name.clone(),
                nullable,
                primary_key: false,
                store: FieldStore::Linked(descriptor),
            };
            if fields.insert(name.clone(), field).is_some() {
                return Err(GraphError::DuplicateName { entity, name });
            }
        }

        tablegraph_trace_build!(entity = entity, table = table.meta.name, fields = fields.len(); "entity");

        Ok(fields)
    }

    fn link(&self, source: EntityId, link: &InferredLink) -> Result<LinkDescriptor> {
        let key = &link.key;
        if key.columns.is_empty() || key.columns.len() != key.foreign_columns.len() {
            return Err(GraphError::KeyArity {
                table: key.table.clone(),
                message: format!(
                    "{} local and {} foreign columns referencing \"{}\"",
                    key.columns.len(),
                    key.foreign_columns.len(),
                    key.foreign_table
                ),
            });
        }

        let pivot = link
            .pivot
            .as_deref()
            .map(|pivot| self.link(self.id(&key.foreign_table)?, pivot))
            .transpose()?
            .map(Box::new);

        Ok(LinkDescriptor {
            source,
            target: self.id(&link.target)?,
            columns: key.columns.iter().cloned().collect::<KeyColumns>(),
            foreign_columns: key.foreign_columns.iter().cloned().collect::<KeyColumns>(),
            cardinality: link.cardinality,
            owner: link.owner,
            pivot,
        })
    }

    fn id(&self, table: &str) -> Result<EntityId> {
        self.ids
            .get(table)
            .copied()
            .ok_or_else(|| GraphError::UnknownTable(table.to_string()))
    }
}
