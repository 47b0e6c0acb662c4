//! Tests for predicates and the boolean precedence chain.

mod common;
use common::*;

use table_query::ast::{
    BooleanPrimary, HasPredicate, NodeKind, Predicate, SearchCondition, TextMatchesPredicate,
};
use table_query::constants::ROW_SEARCH_CONTENT;
use table_query::{Parser, QueryError};

#[test]
fn comparison_operators() {
    assert_eq!(render_condition("a=1"), "a = 1");
    assert_eq!(render_condition("a<>1"), "a <> 1");
    assert_eq!(render_condition("a != 1"), "a <> 1");
    assert_eq!(render_condition("a<=b"), "a <= b");
    assert_eq!(render_condition("a >= 'x'"), "a >= 'x'");
}

#[test]
fn between_predicate() {
    assert_eq!(render_condition("a between 1 and 2"), "a BETWEEN 1 AND 2");
    assert_eq!(render_condition("a not between 1 and 2"), "a NOT BETWEEN 1 AND 2");
}

#[test]
fn between_inside_and_chain() {
    assert_eq!(
        render_condition("a between 1 and 2 and b = 3"),
        "a BETWEEN 1 AND 2 AND b = 3"
    );
}

#[test]
fn in_predicate() {
    assert_eq!(render_condition("a in (1,2)"), "a IN ( 1, 2 )");
    assert_eq!(render_condition("a not in ('x')"), "a NOT IN ( 'x' )");
}

#[test]
fn like_predicate() {
    assert_eq!(render_condition("a like 'x%'"), "a LIKE 'x%'");
    assert_eq!(
        render_condition("a not like 'x!%' escape '!'"),
        "a NOT LIKE 'x!%' ESCAPE '!'"
    );
}

#[test]
fn null_predicate() {
    assert_eq!(render_condition("a is null"), "a IS NULL");
    assert_eq!(render_condition("a is not null"), "a IS NOT NULL");
}

#[test]
fn boolean_predicate() {
    assert_eq!(render_condition("a is true"), "a IS TRUE");
    assert_eq!(render_condition("a is not unknown"), "a IS NOT UNKNOWN");
}

#[test]
fn has_predicates() {
    assert_eq!(render_condition("a has (1, 2)"), "a HAS ( 1, 2 )");
    assert_eq!(render_condition("a not has (1)"), "a NOT HAS ( 1 )");
    assert_eq!(
        render_condition("a has_like ('x%', 'y%') escape '!'"),
        "a HAS_LIKE ( 'x%', 'y%' ) ESCAPE '!'"
    );
    assert_eq!(render_condition("a not has_like ('x%')"), "a NOT HAS_LIKE ( 'x%' )");
}

#[test]
fn text_matches() {
    let query = parse("select * from syn1 where text_matches('foo bar')");
    assert_eq!(query.to_sql(), "SELECT * FROM syn1 WHERE TEXT_MATCHES('foo bar')");

    let tree = query.tree();
    let id = query.first_element_of_type::<TextMatchesPredicate>().unwrap();
    let predicate = tree.node::<TextMatchesPredicate>(id).unwrap();
    assert_eq!(tree.to_sql(predicate.left_hand_side()), ROW_SEARCH_CONTENT);
    assert_eq!(tree.to_sql_without_quotes(predicate.value), "foo bar");
}

#[test]
fn text_matches_requires_single_quoted_string() {
    let _ = parse_err("select * from syn1 where text_matches(\"foo\")");
    let _ = parse_err("select * from syn1 where text_matches(1)");
    let _ = parse_err("select * from syn1 where text_matches(foo)");
}

#[test]
fn boolean_functions() {
    assert_eq!(render_condition("isnan(a)"), "ISNAN(a)");
    assert_eq!(render_condition("isInfinity(t.a)"), "ISINFINITY(t.a)");
    assert_eq!(render_condition("not isnan(a)"), "NOT ISNAN(a)");
}

#[test]
fn boolean_precedence() {
    assert_eq!(
        render_condition("a = 1 or b = 2 and c = 3"),
        "a = 1 OR b = 2 AND c = 3"
    );
    let query = parse("select * from syn1 where a = 1 or b = 2 and c = 3");
    let tree = query.tree();
    let condition = query.first_element_of_type::<SearchCondition>().unwrap();
    let condition = tree.node::<SearchCondition>(condition).unwrap();
    assert_eq!(condition.terms.len(), 2);
    assert_eq!(tree.to_sql(condition.terms[1]), "b = 2 AND c = 3");
}

#[test]
fn parenthesized_search_condition() {
    assert_eq!(
        render_condition("(a = 1 or b = 2) and c = 3"),
        "( a = 1 OR b = 2 ) AND c = 3"
    );
    assert_eq!(render_condition("((a = 1))"), "( ( a = 1 ) )");
}

#[test]
fn parenthesized_value_backtracks_to_predicate() {
    assert_eq!(render_condition("(a + 1) > 2"), "(a+1) > 2");
    let query = parse("select * from syn1 where (a + 1) > 2");
    let primary = query.first_element_of_type::<BooleanPrimary>().unwrap();
    let primary = query.tree().node::<BooleanPrimary>(primary).unwrap();
    assert_eq!(query.tree().kind(primary.inner), Some(NodeKind::Predicate));
}

#[test]
fn not_and_truth_test() {
    assert_eq!(render_condition("not a = 1"), "NOT a = 1");
    assert_eq!(render_condition("(a = 1) is not false"), "( a = 1 ) IS NOT FALSE");
}

#[test]
fn current_user_comparison() {
    assert_eq!(render_condition("createdBy = current_user()"), "createdBy = CURRENT_USER()");
    let err = parse_err("select * from syn1 where current_user() = current_user()");
    assert!(matches!(err, QueryError::Parse(_)));
}

#[test]
fn predicate_contract_values() {
    let predicate = parse_with("a not like 'x!%' escape '!'", Parser::predicate);
    let tree = predicate.tree();
    let contract = predicate.node::<Predicate>().unwrap().contract(tree).unwrap();
    assert!(contract.not());
    assert_eq!(tree.to_sql(contract.left_hand_side()), "a");
    let values: Vec<String> = contract
        .right_hand_side_values(tree)
        .into_iter()
        .map(|id| tree.to_sql_without_quotes(id))
        .collect();
    assert_eq!(values, ["x!%", "!"]);
}

#[test]
fn in_predicate_values() {
    let predicate = parse_with("a in (1, 'two', b)", Parser::predicate);
    let tree = predicate.tree();
    let contract = predicate.node::<Predicate>().unwrap().contract(tree).unwrap();
    let values: Vec<String> = contract
        .right_hand_side_values(tree)
        .into_iter()
        .map(|id| tree.to_sql(id))
        .collect();
    assert_eq!(values, ["1", "'two'"]);
}

#[test]
fn missing_operator() {
    let _ = parse_err("select * from syn1 where a");
    let _ = parse_err("select * from syn1 where a not = 1");
    let _ = parse_err("select * from syn1 where a is");
}

#[test]
fn predicate_round_trips() {
    round_trip(
        "select * from syn1 where (a = 1 or b <> 2) and not c is null and d has_like ('x%') \
         and e between -1 and 1.5 and text_matches('q') and (f) > 0",
    );
}
