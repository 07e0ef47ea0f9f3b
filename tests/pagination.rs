mod common;

use serde_json::{Value as Json, json};
use tablegraph::prelude::*;
use tablegraph::query::Connection;

async fn page(graph: &Graph<SqliteStore>, params: ListParams) -> Connection {
    graph
        .list("Product", &fields(["productId", "unitPrice"]), &params)
        .await
        .unwrap()
        .output
}

fn ids(connection: &Connection) -> Vec<Json> {
    common::column(&connection.edges, "productId")
}

fn all_ids() -> Vec<Json> {
    (1..=11).map(|id| json!(id.to_string())).collect()
}

#[tokio::test]
async fn forward_pages_cover_the_whole_set() {
    let graph = common::graph();
    let mut seen = Vec::new();
    let mut params = ListParams::new().first(2);

    loop {
        let connection = page(&graph, params.clone()).await;
        assert!(connection.edges.len() <= 2);
        seen.extend(ids(&connection));
        if !connection.page_info.has_next_page {
            break;
        }
        let end = connection.page_info.end_cursor.clone().unwrap();
        params = ListParams::new().first(2).after(end);
    }

    assert_eq!(seen, all_ids());
}

#[tokio::test]
async fn backward_pages_cover_the_whole_set() {
    let graph = common::graph();
    let mut pages = Vec::new();
    let mut params = ListParams::new().last(2);

    loop {
        let connection = page(&graph, params.clone()).await;
        assert!(connection.edges.len() <= 2);
        pages.push(ids(&connection));
        if !connection.page_info.has_previous_page {
            break;
        }
        let start = connection.page_info.start_cursor.clone().unwrap();
        params = ListParams::new().last(2).before(start);
    }

    assert_eq!(pages[0], [json!("10"), json!("11")]);
    pages.reverse();
    assert_eq!(pages.concat(), all_ids());
}

#[tokio::test]
async fn window_bound_and_next_page() {
    let graph = common::graph();

    let connection = page(&graph, ListParams::new().first(11)).await;
    assert_eq!(connection.edges.len(), 11);
    assert!(!connection.page_info.has_next_page);
    assert!(!connection.page_info.has_previous_page);

    let connection = page(&graph, ListParams::new().first(10)).await;
    assert_eq!(connection.edges.len(), 10);
    assert!(connection.page_info.has_next_page);
}

#[tokio::test]
async fn window_is_capped_by_configuration() {
    let config = GraphConfig::from_toml_str("max_limit = 3").unwrap();
    let graph = common::graph_with(config);

    let connection = page(&graph, ListParams::new().first(50)).await;
    assert_eq!(connection.edges.len(), 3);
    assert!(connection.page_info.has_next_page);

    let connection = page(&graph, ListParams::new()).await;
    assert_eq!(connection.edges.len(), 3);
}

#[tokio::test]
async fn descending_order_is_monotonic_across_pages() {
    let graph = common::graph();
    let order = |params: ListParams| params.order("unitPrice", Direction::Desc);

    let mut prices = Vec::new();
    let mut seen = Vec::new();
    let mut params = order(ListParams::new().first(3));
    loop {
        let connection = page(&graph, params).await;
        prices.extend(
            common::column(&connection.edges, "unitPrice")
                .iter()
                .map(|price| price.as_f64().unwrap()),
        );
        seen.extend(ids(&connection));
        if !connection.page_info.has_next_page {
            break;
        }
        let end = connection.page_info.end_cursor.clone().unwrap();
        params = order(ListParams::new().first(3).after(end));
    }

    assert!(prices.windows(2).all(|pair| pair[0] >= pair[1]));
    // Equal prices fall back to the primary key.
    assert_eq!(
        seen,
        ["9", "8", "10", "7", "6", "4", "5", "2", "1", "11", "3"]
            .map(|id| json!(id))
            .to_vec()
    );
}

#[tokio::test]
async fn after_cursor_is_strictly_exclusive() {
    let graph = common::graph();
    let params = ListParams::new().first(2).order("unitPrice", Direction::Asc);
    let first = page(&graph, params).await;
    assert_eq!(ids(&first), [json!("3"), json!("1")]);

    let end = first.page_info.end_cursor.clone().unwrap();
    let next = page(
        &graph,
        ListParams::new()
            .first(2)
            .after(end)
            .order("unitPrice", Direction::Asc),
    )
    .await;
    assert_eq!(ids(&next), [json!("11"), json!("2")]);
    assert!(next.page_info.has_previous_page);
}

#[tokio::test]
async fn last_within_first_keeps_the_tail() {
    let graph = common::graph();
    let connection = page(&graph, ListParams::new().first(5).last(2)).await;
    assert_eq!(ids(&connection), [json!("4"), json!("5")]);
    assert!(connection.page_info.has_next_page);
    assert!(connection.page_info.has_previous_page);
}

#[tokio::test]
async fn cursors_must_match_the_order_arity() {
    let graph = common::graph();
    let first = page(&graph, ListParams::new().first(1)).await;
    let cursor = first.page_info.end_cursor.unwrap();

    let err = graph
        .list(
            "Product",
            &[],
            &ListParams::new()
                .after(cursor)
                .order("unitPrice", Direction::Asc),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::MalformedCursor { side: "after", .. }));

    let err = graph
        .list("Product", &[], &ListParams::new().before("definitely not base64!"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::MalformedCursor { side: "before", .. }));
}

/// Every id in `direction` order on `field`, two rows per page.
async fn walk(
    graph: &Graph<SqliteStore>,
    field: &str,
    direction: Direction,
    forward: bool,
) -> Vec<Json> {
    let request = |cursor: Option<String>| {
        let params = if forward {
            let params = ListParams::new().first(2);
            match cursor {
                Some(cursor) => params.after(cursor),
                None => params,
            }
        } else {
            let params = ListParams::new().last(2);
            match cursor {
                Some(cursor) => params.before(cursor),
                None => params,
            }
        };
        params.order(field, direction)
    };

    let mut pages = Vec::new();
    let mut params = request(None);
    loop {
        let connection = page(graph, params).await;
        assert!(connection.edges.len() <= 2);
        pages.push(ids(&connection));
        let info = &connection.page_info;
        let cursor = if forward {
            info.has_next_page.then(|| info.end_cursor.clone()).flatten()
        } else {
            info.has_previous_page.then(|| info.start_cursor.clone()).flatten()
        };
        match cursor {
            Some(cursor) => params = request(Some(cursor)),
            None => break,
        }
    }

    if !forward {
        pages.reverse();
    }
    pages.concat()
}

fn expected(ids: &[&str]) -> Vec<Json> {
    ids.iter().map(|id| json!(id)).collect()
}

#[tokio::test]
async fn ordering_by_the_key_pages_without_a_second_tie_break() {
    let graph = common::graph();
    let order = |params: ListParams| params.order("__key.productId", Direction::Desc);

    let first = page(&graph, order(ListParams::new().first(2))).await;
    assert_eq!(ids(&first), expected(&["11", "10"]));

    let end = first.page_info.end_cursor.clone().unwrap();
    let next = page(&graph, order(ListParams::new().first(2).after(end))).await;
    assert_eq!(ids(&next), expected(&["9", "8"]));

    assert_eq!(
        walk(&graph, "__key.productId", Direction::Desc, true).await,
        expected(&["11", "10", "9", "8", "7", "6", "5", "4", "3", "2", "1"])
    );
}

#[tokio::test]
async fn nulls_sort_first_ascending_across_pages() {
    let graph = common::graph();
    let ascending = expected(&["7", "11", "1", "2", "9", "3", "4", "5", "6", "8", "10"]);

    assert_eq!(walk(&graph, "categoryId", Direction::Asc, true).await, ascending);
    assert_eq!(walk(&graph, "categoryId", Direction::Asc, false).await, ascending);
}

#[tokio::test]
async fn nulls_sort_last_descending_across_pages() {
    let graph = common::graph();
    let descending = expected(&["10", "3", "4", "5", "6", "8", "1", "2", "9", "7", "11"]);

    assert_eq!(walk(&graph, "categoryId", Direction::Desc, true).await, descending);
    assert_eq!(walk(&graph, "categoryId", Direction::Desc, false).await, descending);
}
