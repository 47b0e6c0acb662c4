//! Tests for identifiers, column references and table names.

mod common;
use common::*;

use table_query::ast::{
    ColumnReference, ComparisonPredicate, EntityId, HasPredicate, TableExpression,
};
use table_query::{Parser, QueryError};

#[test]
fn regular_identifier_keeps_case() {
    assert_eq!(render_value("FooBar"), "FooBar");
}

#[test]
fn identifier_starting_with_underscore() {
    assert_eq!(render_value("_C2_"), "_C2_");
}

#[test]
fn identifier_that_looks_like_exponent() {
    assert_eq!(render_value("e123"), "e123");
    assert_eq!(render_condition("e1 = 1e1"), "e1 = 1E1");
}

#[test]
fn double_quoted_identifier() {
    assert_eq!(render_value("\"First Name\""), "\"First Name\"");
    assert_eq!(render_value("\"has\"\"quote\""), "\"has\"\"quote\"");
}

#[test]
fn backticked_identifier() {
    assert_eq!(render_value("`foo bar`"), "`foo bar`");
}

#[test]
fn delimited_identifier_without_quotes() {
    let column = parse_with("\"has\"\"quote\"", Parser::column_reference);
    assert_eq!(column.to_sql_without_quotes(), "has\"quote");
    assert!(column.tree().has_quotes_recursive(column.root()));
}

#[test]
fn qualified_column_reference() {
    let column = parse_with("t.foo", Parser::column_reference);
    let reference = column.node::<ColumnReference>().unwrap();
    assert!(reference.qualifier.is_some());
    assert_eq!(column.to_sql(), "t.foo");
}

#[test]
fn entity_id_canonical_prefix() {
    for sql in ["select * from SYN123", "select * from syn123", "select * from SyN123"] {
        assert_eq!(render(sql), "SELECT * FROM syn123");
    }
}

#[test]
fn entity_id_with_version() {
    let query = parse("select * from syn123.456");
    assert_eq!(query.to_sql(), "SELECT * FROM syn123.456");
    let id = query.first_element_of_type::<EntityId>().unwrap();
    assert_eq!(
        query.tree().node::<EntityId>(id).copied(),
        Some(EntityId {
            id: 123,
            version: Some(456)
        })
    );
}

#[test]
fn entity_id_trailing_dot_dropped() {
    assert_eq!(render("select * from syn123."), "SELECT * FROM syn123");
    assert_eq!(render("select * from syn123. where a = 1"), "SELECT * FROM syn123 WHERE a = 1");
}

#[test]
fn entity_id_extra_segments_rejected() {
    let _ = parse_err("select * from syn123.456.789");
    let _ = parse_err("select * from syn123.456.");
}

#[test]
fn bare_table_name() {
    assert_eq!(render("select * from T123"), "SELECT * FROM T123");
}

#[test]
fn table_name_from_query() {
    let query = parse("select * from SYN123 where id = syn456");
    let table = query.first_element_of_type::<TableExpression>().unwrap();
    let table = query.tree().node::<TableExpression>(table).unwrap();
    assert_eq!(table.table_name(query.tree()).as_deref(), Some("syn123"));
}

#[test]
fn entity_id_as_comparison_value() {
    for sql in [
        "select * from syn123 where id = syn456",
        "select * from syn123 where id = 'syn456'",
        "select * from syn123 where id = \"syn456\"",
    ] {
        let query = parse(sql);
        let tree = query.tree();
        let predicate = query.first_element_of_type::<ComparisonPredicate>().unwrap();
        let predicate = tree.node::<ComparisonPredicate>(predicate).unwrap();
        assert_eq!(tree.to_sql(predicate.left_hand_side()), "id");
        assert_eq!(
            tree.to_sql_without_quotes(predicate.right_hand_side()[0]),
            "syn456",
            "{sql}"
        );
    }
}

#[test]
fn table_alias() {
    assert_eq!(render("select t.a from syn1 t"), "SELECT t.a FROM syn1 t");
    assert_eq!(render("select t.a from syn1 as t"), "SELECT t.a FROM syn1 AS t");
}

#[test]
fn current_user_is_not_a_table() {
    let err = parse_err("select * from current_user()");
    assert!(matches!(err, QueryError::Parse(_)));
}

#[test]
fn identifier_round_trips() {
    round_trip("select \"a\"\"b\", `c`, _d, e5 from syn1.2 as x where x.\"a\"\"b\" = 1");
}
