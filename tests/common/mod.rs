//! Shared fixtures: an in-memory Northwind subset.

#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::Value as Json;
use tablegraph::prelude::*;
use tablegraph::query::Edge;

pub const NORTHWIND: &str = r#"
CREATE TABLE Categories (
    CategoryID INTEGER PRIMARY KEY,
    CategoryName TEXT NOT NULL,
    Description TEXT
);
CREATE TABLE Suppliers (
    SupplierID INTEGER PRIMARY KEY,
    CompanyName TEXT NOT NULL,
    Country TEXT
);
CREATE TABLE SupplierDetails (
    SupplierID INTEGER PRIMARY KEY REFERENCES Suppliers (SupplierID),
    Note TEXT
);
CREATE TABLE Products (
    ProductID INTEGER PRIMARY KEY,
    ProductName TEXT NOT NULL,
    SupplierID INTEGER REFERENCES Suppliers (SupplierID),
    CategoryID INTEGER REFERENCES Categories (CategoryID),
    UnitPrice REAL,
    Discontinued BIT NOT NULL DEFAULT 0
);
CREATE TABLE Regions (
    RegionID INTEGER PRIMARY KEY,
    RegionDescription TEXT NOT NULL
);
CREATE TABLE Territories (
    TerritoryID VARCHAR(20) PRIMARY KEY,
    TerritoryDescription NVARCHAR(50) NOT NULL,
    RegionID INTEGER NOT NULL REFERENCES Regions (RegionID)
);
CREATE TABLE Employees (
    EmployeeID INTEGER PRIMARY KEY,
    LastName TEXT NOT NULL,
    FirstName TEXT NOT NULL,
    ReportsTo INTEGER REFERENCES Employees (EmployeeID)
);
CREATE TABLE EmployeeTerritories (
    EmployeeID INTEGER NOT NULL REFERENCES Employees (EmployeeID),
    TerritoryID VARCHAR(20) NOT NULL REFERENCES Territories (TerritoryID),
    PRIMARY KEY (EmployeeID, TerritoryID)
);

INSERT INTO Categories VALUES
    (1, 'Beverages', 'Soft drinks, coffees, teas, beers, and ales'),
    (2, 'Condiments', 'Sweet and savory sauces, relishes, spreads, and seasonings'),
    (3, 'Confections', 'Desserts, candies, and sweet breads'),
    (8, 'Seafood', 'Seaweed and fish');
INSERT INTO Suppliers VALUES
    (1, 'Exotic Liquids', 'UK'),
    (2, 'New Orleans Cajun Delights', 'USA'),
    (3, 'Grandma Kelly''s Homestead', 'USA'),
    (4, 'Tokyo Traders', 'Japan');
INSERT INTO SupplierDetails VALUES (1, 'Ships from London');
INSERT INTO Products VALUES
    (1, 'Chai', 1, 1, 18.0, 0),
    (2, 'Chang', 1, 1, 19.0, 0),
    (3, 'Aniseed Syrup', 1, 2, 10.0, 0),
    (4, 'Chef Anton''s Cajun Seasoning', 2, 2, 22.0, 0),
    (5, 'Chef Anton''s Gumbo Mix', 2, 2, 21.35, 1),
    (6, 'Grandma''s Boysenberry Spread', 3, 2, 25.0, 0),
    (7, 'Uncle Bob''s Organic Dried Pears', 3, NULL, 30.0, 0),
    (8, 'Northwoods Cranberry Sauce', 3, 2, 40.0, 0),
    (9, 'Mishi Kobe Niku', 4, 1, 97.0, 1),
    (10, 'Ikura', 4, 8, 31.0, 0),
    (11, 'Queso Cabrales', NULL, NULL, 18.0, 0);
INSERT INTO Regions VALUES (1, 'Eastern'), (2, 'Western');
INSERT INTO Territories VALUES
    ('01581', 'Westboro', 1),
    ('06897', 'Wilton', 1),
    ('19713', 'Neward', 1),
    ('94025', 'Menlo Park', 2);
INSERT INTO Employees VALUES
    (1, 'Davolio', 'Nancy', 2),
    (2, 'Fuller', 'Andrew', NULL),
    (3, 'Leverling', 'Janet', 2);
INSERT INTO EmployeeTerritories VALUES
    (1, '06897'),
    (1, '19713'),
    (2, '01581');
"#;

pub fn connection() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(NORTHWIND).expect("seed northwind");
    conn
}

pub fn graph() -> Graph<SqliteStore> {
    graph_with(GraphConfig::default())
}

pub fn graph_with(config: GraphConfig) -> Graph<SqliteStore> {
    let conn = connection();
    let schema = introspect(&conn).expect("introspect northwind");
    let model = Model::build(schema, ModelOptions::default()).expect("build model");
    Graph::with_config(model, SqliteStore::new(conn), config)
}

/// The `field` of every edge node.
pub fn column(edges: &[Edge], field: &str) -> Vec<Json> {
    edges.iter().map(|edge| edge.node[field].clone()).collect()
}
