//! SQL generation for compiled graph queries.
//!
//! A [`SelectQuery`] is rendered into a single statement. When the query
//! carries a [`BoundedRoot`], root filters, order and limit are applied in a
//! `WITH "__root" AS (...)` expression and the joins run on top of it.

use crate::dialect::{Dialect, write_identifier, write_qualified_column};
use crate::value::Value;

use super::params::Direction;

/// Name of the common table expression holding the bounded root rows.
pub const ROOT_CTE: &str = "__root";

/// Rendered SQL text and its positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
}

impl JoinType {
    pub const fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

/// `"alias"."column"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(alias: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            column: column.into(),
        }
    }

    fn write(&self, sql: &mut String) {
        write_qualified_column(&self.alias, &self.column, sql);
    }
}

/// `"alias"."column" AS "name"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub column: ColumnRef,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub alias: String,
    /// Pairs of (left column, column of this join's alias).
    pub on: Vec<(ColumnRef, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
    Ne,
}

impl Comparison {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Gt => ">",
            Comparison::Ne => "<>",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: ColumnRef,
        op: Comparison,
        value: Value,
    },
    In {
        column: ColumnRef,
        values: Vec<Value>,
    },
    /// Disjunction of conjunctions.
    Any(Vec<Vec<Condition>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: ColumnRef,
    pub direction: Direction,
}

/// Root-table filters, order and limit evaluated before any join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundedRoot {
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderTerm>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub alias: String,
    pub projections: Vec<Projection>,
    pub joins: Vec<Join>,
    pub conditions: Vec<Condition>,
    pub order: Vec<OrderTerm>,
    pub limit: Option<u64>,
    pub bounded: Option<BoundedRoot>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            projections: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            bounded: None,
        }
    }

    pub fn project(&mut self, column: ColumnRef, name: impl Into<String>) {
        let name = name.into();
        if self.projections.iter().any(|projection| projection.name == name) {
            return;
        }
        self.projections.push(Projection { column, name });
    }

    /// Output column names in projection order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.projections.iter().map(|projection| projection.name.as_str())
    }

    pub fn render(&self, dialect: Dialect) -> SqlQuery {
        let mut writer = Writer {
            dialect,
            sql: String::with_capacity(256),
            params: Vec::new(),
        };

        if let Some(bounded) = &self.bounded {
            writer.sql.push_str("WITH ");
            write_identifier(ROOT_CTE, &mut writer.sql);
            writer.sql.push_str(" AS (SELECT * FROM ");
            writer.table(&self.table, &self.alias);
            writer.clauses(&bounded.conditions, &bounded.order, bounded.limit);
            writer.sql.push_str(") ");
        }

        writer.sql.push_str("SELECT ");
        for (i, projection) in self.projections.iter().enumerate() {
            if i > 0 {
                writer.sql.push_str(", ");
            }
            projection.column.write(&mut writer.sql);
            writer.sql.push_str(" AS ");
            write_identifier(&projection.name, &mut writer.sql);
        }

        writer.sql.push_str(" FROM ");
        if self.bounded.is_some() {
            writer.table(ROOT_CTE, &self.alias);
        } else {
            writer.table(&self.table, &self.alias);
        }

        for join in &self.joins {
            writer.sql.push(' ');
            writer.sql.push_str(join.join_type.as_sql());
            writer.sql.push(' ');
            writer.table(&join.table, &join.alias);
            writer.sql.push_str(" ON ");
            for (i, (left, right)) in join.on.iter().enumerate() {
                if i > 0 {
                    writer.sql.push_str(" AND ");
                }
                left.write(&mut writer.sql);
                writer.sql.push_str(" = ");
                write_qualified_column(&join.alias, right, &mut writer.sql);
            }
        }

        writer.clauses(&self.conditions, &self.order, self.limit);

        SqlQuery {
            sql: writer.sql,
            params: writer.params,
        }
    }
}

struct Writer {
    dialect: Dialect,
    sql: String,
    params: Vec<Value>,
}

impl Writer {
    fn table(&mut self, table: &str, alias: &str) {
        write_identifier(table, &mut self.sql);
        self.sql.push_str(" AS ");
        write_identifier(alias, &mut self.sql);
    }

    fn param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.render_placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    fn clauses(&mut self, conditions: &[Condition], order: &[OrderTerm], limit: Option<u64>) {
        if !conditions.is_empty() {
            self.sql.push_str(" WHERE ");
            self.conjunction(conditions);
        }

        if !order.is_empty() {
            self.sql.push_str(" ORDER BY ");
            for (i, term) in order.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                term.column.write(&mut self.sql);
                self.sql.push(' ');
                self.sql.push_str(term.direction.as_sql());
                // SQLite already places NULL lowest.
                if self.dialect == Dialect::PostgreSQL {
                    self.sql.push_str(match term.direction {
                        Direction::Asc => " NULLS FIRST",
                        Direction::Desc => " NULLS LAST",
                    });
                }
            }
        }

        if let Some(limit) = limit {
            self.sql.push_str(" LIMIT ");
            self.sql.push_str(&limit.to_string());
        }
    }

    fn conjunction(&mut self, conditions: &[Condition]) {
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(" AND ");
            }
            self.condition(condition);
        }
    }

    fn condition(&mut self, condition: &Condition) {
        match condition {
            Condition::Compare { column, op, value } if value.is_null() => match op {
                Comparison::Eq => {
                    column.write(&mut self.sql);
                    self.sql.push_str(" IS NULL");
                }
                Comparison::Ne => {
                    column.write(&mut self.sql);
                    self.sql.push_str(" IS NOT NULL");
                }
                // Ordering against NULL matches nothing.
                _ => self.sql.push_str("1 = 0"),
            },
            Condition::Compare { column, op, value } => {
                column.write(&mut self.sql);
                self.sql.push(' ');
                self.sql.push_str(op.as_sql());
                self.sql.push(' ');
                self.param(value.clone());
            }
            Condition::In { values, .. } if values.is_empty() => self.sql.push_str("1 = 0"),
            Condition::In { column, values } => {
                column.write(&mut self.sql);
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.param(value.clone());
                }
                self.sql.push(')');
            }
            Condition::Any(groups) if groups.is_empty() => self.sql.push_str("1 = 0"),
            Condition::Any(groups) => {
                self.sql.push('(');
                for (i, group) in groups.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(" OR ");
                    }
                    self.sql.push('(');
                    self.conjunction(group);
                    self.sql.push(')');
                }
                self.sql.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> SelectQuery {
        let mut query = SelectQuery::new("Products", "Products");
        query.project(ColumnRef::new("Products", "ProductID"), "__key.productId");
        query.project(ColumnRef::new("Products", "ProductName"), "productName");
        query
    }

    #[test]
    fn renders_plain_select() {
        let mut query = products();
        query.conditions.push(Condition::Compare {
            column: ColumnRef::new("Products", "UnitPrice"),
            op: Comparison::Gte,
            value: Value::Real(10.0),
        });
        query.order.push(OrderTerm {
            column: ColumnRef::new("Products", "ProductID"),
            direction: Direction::Asc,
        });
        query.limit = Some(3);

        let rendered = query.render(Dialect::SQLite);
        assert_eq!(
            rendered.sql,
            r#"SELECT "Products"."ProductID" AS "__key.productId", "Products"."ProductName" AS "productName" FROM "Products" AS "Products" WHERE "Products"."UnitPrice" >= ? ORDER BY "Products"."ProductID" ASC LIMIT 3"#
        );
        assert_eq!(rendered.params, vec![Value::Real(10.0)]);
    }

    #[test]
    fn renders_bounded_root_with_joins() {
        let mut query = products();
        query.project(ColumnRef::new("supplier", "CompanyName"), "supplier.companyName");
        query.joins.push(Join {
            join_type: JoinType::LeftOuter,
            table: "Suppliers".into(),
            alias: "supplier".into(),
            on: vec![(ColumnRef::new("Products", "SupplierID"), "SupplierID".into())],
        });
        query.conditions.push(Condition::Compare {
            column: ColumnRef::new("supplier", "Country"),
            op: Comparison::Eq,
            value: Value::from("UK"),
        });
        query.bounded = Some(BoundedRoot {
            conditions: vec![Condition::In {
                column: ColumnRef::new("Products", "CategoryID"),
                values: vec![Value::Integer(1), Value::Integer(2)],
            }],
            order: vec![OrderTerm {
                column: ColumnRef::new("Products", "ProductID"),
                direction: Direction::Desc,
            }],
            limit: Some(5),
        });

        let rendered = query.render(Dialect::PostgreSQL);
        assert_eq!(
            rendered.sql,
            concat!(
                r#"WITH "__root" AS (SELECT * FROM "Products" AS "Products" WHERE "Products"."CategoryID" IN ($1, $2) ORDER BY "Products"."ProductID" DESC NULLS LAST LIMIT 5) "#,
                r#"SELECT "Products"."ProductID" AS "__key.productId", "Products"."ProductName" AS "productName", "supplier"."CompanyName" AS "supplier.companyName" "#,
                r#"FROM "__root" AS "Products" LEFT OUTER JOIN "Suppliers" AS "supplier" ON "Products"."SupplierID" = "supplier"."SupplierID" "#,
                r#"WHERE "supplier"."Country" = $3"#
            )
        );
        assert_eq!(
            rendered.params,
            vec![Value::Integer(1), Value::Integer(2), Value::from("UK")]
        );
    }

    #[test]
    fn renders_keyset_disjunction_and_nulls() {
        let mut query = products();
        let id = ColumnRef::new("Products", "ProductID");
        let name = ColumnRef::new("Products", "ProductName");
        query.conditions.push(Condition::Any(vec![
            vec![Condition::Compare {
                column: name.clone(),
                op: Comparison::Gt,
                value: Value::from("Chai"),
            }],
            vec![
                Condition::Compare {
                    column: name,
                    op: Comparison::Eq,
                    value: Value::from("Chai"),
                },
                Condition::Compare {
                    column: id.clone(),
                    op: Comparison::Gt,
                    value: Value::Integer(1),
                },
            ],
        ]));
        query.conditions.push(Condition::Compare {
            column: ColumnRef::new("Products", "Discontinued"),
            op: Comparison::Eq,
            value: Value::Null,
        });

        let rendered = query.render(Dialect::SQLite);
        assert!(rendered.sql.ends_with(
            r#"WHERE (("Products"."ProductName" > ?) OR ("Products"."ProductName" = ? AND "Products"."ProductID" > ?)) AND "Products"."Discontinued" IS NULL"#
        ));
        assert_eq!(rendered.params.len(), 3);
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        let mut query = products();
        query.conditions.push(Condition::Any(Vec::new()));
        query.order.push(OrderTerm {
            column: ColumnRef::new("Products", "ProductID"),
            direction: Direction::Asc,
        });

        let rendered = query.render(Dialect::SQLite);
        assert!(rendered.sql.ends_with(
            r#"WHERE 1 = 0 ORDER BY "Products"."ProductID" ASC"#
        ));

        let rendered = query.render(Dialect::PostgreSQL);
        assert!(rendered.sql.ends_with(r#"ORDER BY "Products"."ProductID" ASC NULLS FIRST"#));
    }

    #[test]
    fn duplicate_projection_names_are_kept_once() {
        let mut query = products();
        query.project(ColumnRef::new("Products", "ProductName"), "productName");
        assert_eq!(query.column_names().count(), 2);
    }
}
