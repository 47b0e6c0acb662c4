//! Every bundled example query parses and renders to a fixed point.

mod common;
use common::*;

use table_query::ast::QueryExpression;
use table_query::rewrite::{convert_to_paginated_query, create_count_sql};
use table_query::QueryError;

#[test]
fn corpus_is_not_empty() {
    assert!(example_queries().len() > 50);
}

#[test]
fn corpus_round_trips() {
    for sql in example_queries() {
        round_trip(sql);
    }
}

#[test]
fn corpus_trees_are_linked() {
    for sql in example_queries() {
        let query = parse(sql);
        let tree = query.tree();
        assert_eq!(tree.parent(query.root()), None, "{sql}");
        for id in tree.descendants(query.root()) {
            for child in tree.children(id) {
                assert_eq!(tree.parent(child), Some(id), "{sql}: {child} under {id}");
            }
        }
        // the parser leaves nothing behind when it backtracks
        assert_eq!(tree.len(), tree.descendants(query.root()).len(), "{sql}");
    }
}

#[test]
fn corpus_rewrites() {
    for sql in example_queries() {
        let query = parse(sql);
        let single = query
            .node::<QueryExpression>()
            .and_then(|expression| expression.single_specification(query.tree()))
            .is_some();

        let paginated = convert_to_paginated_query(&query, Some(1), Some(2));
        assert_eq!(paginated.is_ok(), single, "{sql}");
        if let Ok(paginated) = paginated {
            assert!(paginated.to_sql().ends_with("LIMIT 2 OFFSET 1"), "{sql}");
            round_trip(&paginated.to_sql());
        }

        match create_count_sql(&query) {
            Ok(count) => {
                assert!(count.starts_with("SELECT COUNT("), "{sql}");
                let _ = parse(&count);
            }
            Err(QueryError::SimpleAggregateQuery(_) | QueryError::Unsupported(_)) => {}
            Err(err) => panic!("{sql}: {err}"),
        }
    }
}
