#![allow(dead_code)]

use std::sync::LazyLock;

use table_query::{Fragment, NodeId, ParseError, Parser, QueryError};

pub fn parse(sql: &str) -> Fragment {
    Parser::parse_query(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> QueryError {
    Parser::parse_query(sql).expect_err(&format!("Expected parse error for: {sql}"))
}

/// Parses `sql` with a single production, e.g. `Parser::predicate`.
pub fn parse_with<F>(sql: &str, production: F) -> Fragment
where
    F: FnOnce(&mut Parser) -> Result<NodeId, ParseError>,
{
    Parser::parse_with(sql, production)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn render(sql: &str) -> String {
    parse(sql).to_sql()
}

/// Renders a query that starts with `select * from syn123 where ` followed
/// by `condition`, and returns only the rendered condition.
pub fn render_condition(condition: &str) -> String {
    let rendered = render(&format!("select * from syn123 where {condition}"));
    rendered
        .strip_prefix("SELECT * FROM syn123 WHERE ")
        .unwrap_or_else(|| panic!("Unexpected rendering: {rendered}"))
        .to_string()
}

/// Renders a single selected value.
pub fn render_value(value: &str) -> String {
    let rendered = render(&format!("select {value} from syn123"));
    rendered
        .strip_prefix("SELECT ")
        .and_then(|rest| rest.strip_suffix(" FROM syn123"))
        .unwrap_or_else(|| panic!("Unexpected rendering: {rendered}"))
        .to_string()
}

/// Verifies that rendering is a fixed point:
/// parse(sql).to_sql() re-parses and yields the same string again.
pub fn round_trip(sql: &str) {
    let rendered1 = render(sql);
    let rendered2 = render(&rendered1);
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}

/// The bundled example queries, one per line. Blank lines and lines
/// starting with `#` are skipped.
static QUERIES: LazyLock<Vec<String>> = LazyLock::new(|| {
    include_str!("../fixtures/example_queries.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
});

pub fn example_queries() -> &'static [String] {
    &QUERIES
}
