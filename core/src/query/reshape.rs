//! Regrouping flat joined rows into nested nodes.
//!
//! Column names follow the compiler's layout: `a.b.field` nests `field` under
//! link `b` of link `a`, `__key.` columns identify the rows of a level, and
//! root-level `__cursor.` columns carry raw cursor values.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::config::{CURSOR_PREFIX, KEY_PREFIX, SEPARATOR};
use crate::error::{GraphError, Result};
use crate::model::{Entity, Model};
use crate::value::Value;

/// Flat rows returned by the store, with their column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A reshaped root node and its raw cursor values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub node: Map<String, Json>,
    pub cursor: Vec<Value>,
}

/// Column positions of one nesting level.
#[derive(Debug, Default)]
struct Layout {
    keys: Vec<usize>,
    cursors: Vec<usize>,
    slots: IndexMap<String, Slot>,
}

#[derive(Debug)]
enum Slot {
    Scalar(usize),
    Nested(Layout),
}

impl Layout {
    fn new(columns: &[String]) -> Self {
        let mut layout = Layout::default();
        for (index, column) in columns.iter().enumerate() {
            layout.insert(index, column);
        }
        layout
    }

    fn insert(&mut self, index: usize, column: &str) {
        let Some((head, rest)) = column.split_once(SEPARATOR) else {
            self.slots.insert(column.to_string(), Slot::Scalar(index));
            return;
        };
        match head {
            KEY_PREFIX => self.keys.push(index),
            CURSOR_PREFIX => self.cursors.push(index),
            _ => {
                let slot = self
                    .slots
                    .entry(head.to_string())
                    .or_insert_with(|| Slot::Nested(Layout::default()));
                if let Slot::Nested(nested) = slot {
                    nested.insert(index, rest);
                }
            }
        }
    }

    /// Columns identifying one node at this level: the key columns, or every
    /// scalar column when the level has no key.
    fn identity(&self) -> Vec<usize> {
        if !self.keys.is_empty() {
            return self.keys.clone();
        }
        self.slots
            .values()
            .filter_map(|slot| match slot {
                Slot::Scalar(index) => Some(*index),
                Slot::Nested(_) => None,
            })
            .collect()
    }

    /// Groups `rows` by identity in order of first appearance, dropping
    /// groups whose identity is entirely NULL.
    fn group(&self, rows: &[Vec<Value>], subset: impl Iterator<Item = usize>) -> Vec<Vec<usize>> {
        let identity = self.identity();
        let mut groups: IndexMap<Vec<&Value>, Vec<usize>> = IndexMap::new();
        for row in subset {
            let key: Vec<&Value> = identity.iter().map(|&column| &rows[row][column]).collect();
            groups.entry(key).or_default().push(row);
        }
        groups
            .into_iter()
            .filter(|(key, _)| !key.iter().all(|value| value.is_null()))
            .map(|(_, rows)| rows)
            .collect()
    }
}

/// Lazily reshapes rows of `entity` into nodes, in order of first appearance
/// of each root identity.
pub struct Reshape<'m> {
    model: &'m Model,
    entity: &'m Entity,
    layout: Layout,
    rows: Vec<Vec<Value>>,
    groups: std::vec::IntoIter<Vec<usize>>,
}

pub fn reshape<'m>(model: &'m Model, entity: &'m Entity, rows: RowSet) -> Reshape<'m> {
    let layout = Layout::new(&rows.columns);
    let groups = layout.group(&rows.rows, 0..rows.rows.len());
    Reshape {
        model,
        entity,
        layout,
        rows: rows.rows,
        groups: groups.into_iter(),
    }
}

impl Iterator for Reshape<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.groups.next()?;
        let node = build(self.model, self.entity, &self.layout, &self.rows, &group);
        let cursor = self
            .layout
            .cursors
            .iter()
            .map(|&column| self.rows[group[0]][column].clone())
            .collect();
        Some(node.map(|node| Record { node, cursor }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

fn build(
    model: &Model,
    entity: &Entity,
    layout: &Layout,
    rows: &[Vec<Value>],
    group: &[usize],
) -> Result<Map<String, Json>> {
    let first = &rows[group[0]];
    let mut node = Map::new();

    for (name, slot) in &layout.slots {
        let field = entity.field(name)?;
        match slot {
            Slot::Scalar(column) => {
                let value = field.scalar()?.decode(first[*column].clone())?;
                node.insert(name.clone(), value);
            }
            Slot::Nested(nested) => {
                let link = field.link()?;
                let target = &model[link.target];
                let mut children = nested
                    .group(rows, group.iter().copied())
                    .into_iter()
                    .map(|child| build(model, target, nested, rows, &child).map(Json::Object))
                    .collect::<Result<Vec<Json>>>()?;

                let value = if link.cardinality.is_to_many() {
                    Json::Array(children)
                } else if children.len() > 1 {
                    return Err(GraphError::Cardinality(format!(
                        "\"{}.{name}\" resolved to {} rows",
                        entity.name,
                        children.len()
                    )));
                } else {
                    children.pop().unwrap_or(Json::Null)
                };
                node.insert(name.clone(), value);
            }
        }
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelOptions;
    use crate::schema::{ColumnKind, ColumnMeta, StoreSchema, TableMeta};
    use serde_json::json;

    fn model() -> Model {
        let schema = StoreSchema::new()
            .table(
                TableMeta::new("Suppliers")
                    .column(ColumnMeta::new("SupplierID", ColumnKind::Integer).primary())
                    .column(ColumnMeta::new("CompanyName", ColumnKind::String)),
            )
            .table(
                TableMeta::new("Products")
                    .column(ColumnMeta::new("ProductID", ColumnKind::Integer).primary())
                    .column(ColumnMeta::new("ProductName", ColumnKind::String))
                    .column(ColumnMeta::new("SupplierID", ColumnKind::Integer))
                    .foreign_key(["SupplierID"], "Suppliers", ["SupplierID"]),
            );
        Model::build(schema, ModelOptions::default()).unwrap()
    }

    fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> RowSet {
        RowSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn nodes(model: &Model, entity: &str, rows: RowSet) -> Vec<Json> {
        let entity = model.entity(entity).unwrap();
        reshape(model, entity, rows)
            .map(|record| Json::Object(record.unwrap().node))
            .collect()
    }

    #[test]
    fn groups_fanned_out_rows_in_first_seen_order() {
        let model = model();
        let data = rows(
            &[
                "__key.supplierId",
                "companyName",
                "products.__key.productId",
                "products.productName",
            ],
            vec![
                vec![Value::Integer(2), "New Orleans".into(), Value::Integer(4), "Chef Anton".into()],
                vec![Value::Integer(1), "Exotic Liquids".into(), Value::Integer(1), "Chai".into()],
                vec![Value::Integer(2), "New Orleans".into(), Value::Integer(5), "Gumbo".into()],
                vec![Value::Integer(1), "Exotic Liquids".into(), Value::Integer(2), "Chang".into()],
            ],
        );

        assert_eq!(
            nodes(&model, "Supplier", data),
            vec![
                json!({"companyName": "New Orleans", "products": [
                    {"productName": "Chef Anton"}, {"productName": "Gumbo"}
                ]}),
                json!({"companyName": "Exotic Liquids", "products": [
                    {"productName": "Chai"}, {"productName": "Chang"}
                ]}),
            ]
        );
    }

    #[test]
    fn missing_relations_become_null_or_empty() {
        let model = model();

        let product = rows(
            &["__key.productId", "productName", "supplier.__key.supplierId", "supplier.companyName"],
            vec![vec![Value::Integer(7), "Orphan".into(), Value::Null, Value::Null]],
        );
        assert_eq!(
            nodes(&model, "Product", product),
            vec![json!({"productName": "Orphan", "supplier": null})]
        );

        let supplier = rows(
            &["__key.supplierId", "companyName", "products.__key.productId", "products.productName"],
            vec![vec![Value::Integer(9), "Idle".into(), Value::Null, Value::Null]],
        );
        assert_eq!(
            nodes(&model, "Supplier", supplier),
            vec![json!({"companyName": "Idle", "products": []})]
        );
    }

    #[test]
    fn keyless_levels_group_by_their_columns() {
        let model = model();
        let data = rows(
            &["__key.productId", "productName", "supplier.supplierId"],
            vec![
                vec![Value::Integer(1), "Chai".into(), Value::Integer(1)],
                vec![Value::Integer(3), "Syrup".into(), Value::Null],
            ],
        );
        assert_eq!(
            nodes(&model, "Product", data),
            vec![
                json!({"productName": "Chai", "supplier": {"supplierId": "1"}}),
                json!({"productName": "Syrup", "supplier": null}),
            ]
        );
    }

    #[test]
    fn cursor_columns_stay_raw() {
        let model = model();
        let data = rows(
            &["__key.productId", "productName", "__cursor.0", "__cursor.1"],
            vec![vec![Value::Integer(1), "Chai".into(), "Chai".into(), Value::Integer(1)]],
        );
        let entity = model.entity("Product").unwrap();
        let record = reshape(&model, entity, data).next().unwrap().unwrap();
        assert_eq!(record.cursor, vec![Value::from("Chai"), Value::Integer(1)]);
        assert_eq!(Json::Object(record.node), json!({"productName": "Chai"}));
    }

    #[test]
    fn to_one_with_many_rows_is_an_invariant_failure() {
        let model = model();
        let data = rows(
            &["__key.productId", "supplier.__key.supplierId", "supplier.companyName"],
            vec![
                vec![Value::Integer(1), Value::Integer(1), "A".into()],
                vec![Value::Integer(1), Value::Integer(2), "B".into()],
            ],
        );
        let entity = model.entity("Product").unwrap();
        let result: Result<Vec<Record>> = reshape(&model, entity, data).collect();
        assert!(matches!(result, Err(GraphError::Cardinality(_))));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let model = model();
        let entity = model.entity("Product").unwrap();
        assert_eq!(reshape(&model, entity, RowSet::new(vec![])).count(), 0);
    }
}
