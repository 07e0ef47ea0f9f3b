use heck::{ToLowerCamelCase, ToUpperCamelCase};

use super::InferredLink;

/// Names entities, fields and links derived from store metadata.
pub trait NamingStrategy {
    fn entity_name(&self, table: &str) -> String;

    fn field_name(&self, table: &str, column: &str) -> String;

    /// Name of `link` as a field of the entity backed by `table`.
    fn link_name(&self, table: &str, link: &InferredLink) -> String;
}

/// Singular UpperCamelCase entities, lowerCamelCase fields, and link names
/// built from the target entity plus whatever distinguishes the key columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingStrategy;

impl NamingStrategy for DefaultNamingStrategy {
    fn entity_name(&self, table: &str) -> String {
        pluralizer::pluralize(&table.to_upper_camel_case(), 1, false)
    }

    fn field_name(&self, _table: &str, column: &str) -> String {
        column.to_lower_camel_case()
    }

    fn link_name(&self, table: &str, link: &InferredLink) -> String {
        let target = self.entity_name(&link.target);
        let columns: Vec<String> = link
            .key
            .columns
            .iter()
            .map(|column| self.field_name(table, column))
            .collect();
        let foreign: Vec<String> = link
            .key
            .foreign_columns
            .iter()
            .map(|column| self.field_name(&link.key.foreign_table, column))
            .collect();

        let base = if columns == foreign {
            target
        } else {
            match common_prefix(&foreign) {
                Some(prefix) => format!("{prefix}_{target}"),
                None => format!("{}_{target}", columns.join("_")),
            }
        };

        let count = if link.cardinality.is_to_many() { 2 } else { 1 };
        pluralizer::pluralize(&base, count, false).to_lower_camel_case()
    }
}

/// Longest prefix shared by two or more names.
fn common_prefix(names: &[String]) -> Option<&str> {
    let (first, rest) = names.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut len = first.len();
    for name in rest {
        len = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, ch), _)| index + ch.len_utf8())
            .min(len);
    }

    (len > 0).then(|| &first[..len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cardinality, ForeignKey};

    fn link(key: ForeignKey, target: &str, cardinality: Cardinality) -> InferredLink {
        InferredLink {
            target: target.to_string(),
            cardinality,
            key,
            pivot: None,
            owner: true,
        }
    }

    #[test]
    fn entities_are_singular_pascal() {
        let naming = DefaultNamingStrategy;
        assert_eq!(naming.entity_name("Categories"), "Category");
        assert_eq!(naming.entity_name("EmployeeTerritories"), "EmployeeTerritory");
        assert_eq!(naming.entity_name("order_details"), "OrderDetail");
    }

    #[test]
    fn fields_are_lower_camel() {
        let naming = DefaultNamingStrategy;
        assert_eq!(naming.field_name("Categories", "CategoryID"), "categoryId");
        assert_eq!(naming.field_name("Categories", "CategoryName"), "categoryName");
    }

    #[test]
    fn matching_columns_use_target_name() {
        let naming = DefaultNamingStrategy;
        let to_one = link(
            ForeignKey::new("Products", ["SupplierID"], "Suppliers", ["SupplierID"]),
            "Suppliers",
            Cardinality::ManyToOne,
        );
        assert_eq!(naming.link_name("Products", &to_one), "supplier");

        let to_many = link(
            ForeignKey::new("Suppliers", ["SupplierID"], "Products", ["SupplierID"]),
            "Products",
            Cardinality::OneToMany,
        );
        assert_eq!(naming.link_name("Suppliers", &to_many), "products");
    }

    #[test]
    fn differing_columns_prefix_the_target() {
        let naming = DefaultNamingStrategy;
        let manager = link(
            ForeignKey::new("Employees", ["ReportsTo"], "Employees", ["EmployeeID"]),
            "Employees",
            Cardinality::ManyToOne,
        );
        assert_eq!(naming.link_name("Employees", &manager), "reportsToEmployee");

        let composite = link(
            ForeignKey::new(
                "Shipments",
                ["OriginRegion", "OriginCode"],
                "Locations",
                ["LocationRegion", "LocationCode"],
            ),
            "Locations",
            Cardinality::ManyToOne,
        );
        assert_eq!(
            naming.link_name("Shipments", &composite),
            "locationLocation"
        );
    }

    #[test]
    fn common_prefix_needs_two_names() {
        let names = |list: &[&str]| list.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(common_prefix(&names(&["orderId"])), None);
        assert_eq!(common_prefix(&names(&["orderId", "orderLine"])), Some("order"));
        assert_eq!(common_prefix(&names(&["a", "b"])), None);
    }
}
