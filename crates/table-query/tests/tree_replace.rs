//! Tests for in-place tree mutation: element and clause replacement.

mod common;
use common::*;

use table_query::ast::{DefiningClause, QuerySpecification, TableExpression, WhereClause};
use table_query::{Fragment, NodeId, Parser, QueryError, Tree};

fn spec_and_table(query: &Fragment) -> (NodeId, NodeId) {
    let spec = query.first_element_of_type::<QuerySpecification>().unwrap();
    let table = query
        .tree()
        .node::<QuerySpecification>(spec)
        .unwrap()
        .table_expression;
    (spec, table)
}

fn where_clause(tree: &Tree, table: NodeId) -> Option<NodeId> {
    tree.node::<TableExpression>(table).unwrap().where_clause
}

/// Every node reachable from `root` is linked to the parent that lists it.
fn assert_links(tree: &Tree, root: NodeId) {
    assert_eq!(tree.parent(root), None);
    for id in tree.descendants(root) {
        for child in tree.children(id) {
            assert_eq!(tree.parent(child), Some(id), "{child} should be a child of {id}");
        }
    }
}

#[test]
fn replace_search_condition() {
    let mut query = parse("select * from syn1 where a = 1");
    let condition = parse_with("b > 2 or c is null", Parser::search_condition);
    let (_, table) = spec_and_table(&query);
    let root = query.root();
    let tree = query.tree_mut();

    let clause = where_clause(tree, table).unwrap();
    let old = tree.node::<WhereClause>(clause).unwrap().condition;
    let new = tree.graft(condition.tree(), condition.root()).unwrap();
    tree.replace_element(old, new).unwrap();

    assert_eq!(tree.to_sql(root), "SELECT * FROM syn1 WHERE b > 2 OR c IS NULL");
    assert_eq!(tree.parent(new), Some(clause));
    for detached in tree.descendants(old) {
        assert_eq!(tree.parent(detached), None);
    }
    assert_links(tree, root);
}

#[test]
fn replacement_must_fit_the_slot() {
    let mut query = parse("select * from syn1 where a = 1");
    let predicate = parse_with("b = 2", Parser::predicate);
    let (_, table) = spec_and_table(&query);
    let tree = query.tree_mut();

    let clause = where_clause(tree, table).unwrap();
    let old = tree.node::<WhereClause>(clause).unwrap().condition;
    let new = tree.graft(predicate.tree(), predicate.root()).unwrap();
    assert!(matches!(
        tree.replace_element(old, new),
        Err(QueryError::Construction(_))
    ));
    assert_eq!(tree.parent(old), Some(clause));
}

#[test]
fn replacement_must_be_detached() {
    let mut query = parse("select * from syn1 where a = 1");
    let (_, table) = spec_and_table(&query);
    let tree = query.tree_mut();
    let clause = where_clause(tree, table).unwrap();
    let old = tree.node::<WhereClause>(clause).unwrap().condition;
    assert!(matches!(
        tree.replace_element(old, old),
        Err(QueryError::Construction(_))
    ));
}

#[test]
fn root_cannot_be_replaced() {
    let mut query = parse("select * from syn1");
    let other = parse("select * from syn2");
    let root = query.root();
    let tree = query.tree_mut();
    let new = tree.graft(other.tree(), other.root()).unwrap();
    let err = tree.replace_element(root, new).unwrap_err();
    assert!(matches!(err, QueryError::State(_)), "{err}");
}

#[test]
fn add_and_remove_where_clause() {
    let mut query = parse("select * from syn1 order by a");
    let condition = parse_with("a > 1", Parser::search_condition);
    let (_, table) = spec_and_table(&query);
    let root = query.root();
    let tree = query.tree_mut();

    let condition = tree.graft(condition.tree(), condition.root()).unwrap();
    let clause = tree.add(WhereClause { condition }).unwrap();
    assert_eq!(tree.replace_where_clause(table, Some(clause)).unwrap(), None);
    assert_eq!(tree.to_sql(root), "SELECT * FROM syn1 WHERE a > 1 ORDER BY a");
    assert_links(tree, root);

    assert_eq!(tree.replace_where_clause(table, None).unwrap(), Some(clause));
    assert_eq!(tree.parent(clause), None);
    assert_eq!(tree.to_sql(root), "SELECT * FROM syn1 ORDER BY a");
}

#[test]
fn add_defining_clause() {
    let mut query = parse("select * from syn2 where a = 1");
    let condition = parse_with("foo = 'apple'", Parser::search_condition);
    let (_, table) = spec_and_table(&query);
    let root = query.root();
    let tree = query.tree_mut();

    let condition = tree.graft(condition.tree(), condition.root()).unwrap();
    let clause = tree.add(DefiningClause { condition }).unwrap();
    assert!(matches!(
        tree.replace_where_clause(table, Some(clause)),
        Err(QueryError::Construction(_))
    ));
    assert_eq!(tree.replace_defining_clause(table, Some(clause)).unwrap(), None);
    assert_eq!(
        tree.to_sql(root),
        "SELECT * FROM syn2 DEFINING_WHERE foo = 'apple' WHERE a = 1"
    );
    assert_links(tree, root);
}

#[test]
fn clause_kind_is_checked() {
    let mut query = parse("select * from syn1 where a = 1");
    let other = parse("select * from syn2 where b = 2");
    let (spec, table) = spec_and_table(&query);
    let (_, other_table) = spec_and_table(&other);
    let other_where = where_clause(other.tree(), other_table).unwrap();
    let root = query.root();
    let tree = query.tree_mut();

    let clause = tree.graft(other.tree(), other_where).unwrap();
    assert!(matches!(
        tree.replace_group_by(table, Some(clause)),
        Err(QueryError::Construction(_))
    ));
    assert!(matches!(
        tree.replace_where_clause(spec, Some(clause)),
        Err(QueryError::Construction(_))
    ));
    let previous = tree.replace_where_clause(table, Some(clause)).unwrap();
    assert!(previous.is_some());
    assert_eq!(tree.to_sql(root), "SELECT * FROM syn1 WHERE b = 2");
}

#[test]
fn replace_select_list() {
    let mut query = parse("select a from syn1");
    let list = parse_with("b, c as d", Parser::select_list);
    let (spec, table) = spec_and_table(&query);
    let root = query.root();
    let tree = query.tree_mut();

    let new = tree.graft(list.tree(), list.root()).unwrap();
    tree.replace_select_list(spec, new).unwrap();
    assert_eq!(tree.to_sql(root), "SELECT b, c AS d FROM syn1");

    let another = tree.graft(list.tree(), list.root()).unwrap();
    assert!(matches!(
        tree.replace_select_list(table, another),
        Err(QueryError::Construction(_))
    ));
}

#[test]
fn subtree_drops_detached_nodes() {
    let mut query = parse("select * from syn1 where a = 1 and b = 2");
    let (_, table) = spec_and_table(&query);
    let root = query.root();
    let before = query.tree().len();
    query.tree_mut().replace_where_clause(table, None).unwrap();
    assert_eq!(query.tree().len(), before);

    let compact = query.subtree(root).unwrap();
    assert_eq!(compact.tree().len(), compact.tree().descendants(compact.root()).len());
    assert_eq!(compact.to_sql(), "SELECT * FROM syn1");
    assert_links(compact.tree(), compact.root());
}

#[test]
fn fragment_root_must_be_detached() {
    let query = parse("select * from syn1");
    let (spec, _) = spec_and_table(&query);
    let (tree, _) = query.into_parts();
    assert!(matches!(
        Fragment::new(tree, spec),
        Err(QueryError::Construction(_))
    ));
}
