//! Count and row id queries derived from a query.

use std::collections::HashMap;

use tracing::debug;

use super::{parts, query_specification};
use crate::ast::{
    DerivedColumn, Fragment, GroupByClause, NodeId, SelectList, TableExpression, Tree,
    WhereClause,
};
use crate::constants::{ROW_ID, ROW_VERSION};
use crate::error::{QueryError, Result};

/// SQL counting the rows `query` returns, ignoring its ORDER BY and
/// pagination.
///
/// - a plain query counts `*`;
/// - a GROUP BY query counts the distinct grouping values;
/// - a `SELECT DISTINCT` query counts the distinct selected values.
///
/// # Errors
///
/// Returns [`QueryError::SimpleAggregateQuery`] for an aggregate query without
/// GROUP BY or DISTINCT, which always returns one row.
pub fn create_count_sql(query: &Fragment) -> Result<String> {
    let spec = query_specification(query)?;
    let tree = query.tree();
    let (specification, _, table) = parts(tree, spec)?;

    let mut sql = String::from("SELECT ");
    if !specification.is_aggregate(tree) {
        sql.push_str("COUNT(*)");
    } else if let Some(group_by) = table.group_by {
        sql.push_str("COUNT(DISTINCT ");
        sql.push_str(&create_select_from_group_by(
            tree,
            specification.select_list,
            group_by,
        ));
        sql.push(')');
    } else if specification.is_distinct() {
        sql.push_str("COUNT(DISTINCT ");
        sql.push_str(&create_select_without_as(tree, specification.select_list));
        sql.push(')');
    } else {
        return Err(QueryError::SimpleAggregateQuery(String::from(
            "Simple aggregate queries always return one row",
        )));
    }
    sql.push(' ');
    write_row_filter(tree, table, &mut sql);
    debug!(%sql, "count query");
    Ok(sql)
}

/// SQL selecting the row id and version of at most `max_limit` rows matched
/// by `query`. Aggregate queries have no row ids, so they yield `None`.
///
/// # Errors
///
/// Returns [`QueryError::Unsupported`] if `query` is not a single query
/// specification.
pub fn build_sql_select_row_ids_and_versions(
    query: &Fragment,
    max_limit: u64,
) -> Result<Option<String>> {
    let spec = query_specification(query)?;
    let tree = query.tree();
    let (specification, _, table) = parts(tree, spec)?;
    if specification.is_aggregate(tree) {
        debug!("aggregate query has no row ids");
        return Ok(None);
    }
    let mut sql = format!("SELECT {ROW_ID}, {ROW_VERSION} ");
    write_row_filter(tree, table, &mut sql);
    sql.push_str(&format!(" LIMIT {max_limit}"));
    debug!(%sql, "row id query");
    Ok(Some(sql))
}

/// Writes the FROM clause and the clauses that filter its rows.
fn write_row_filter(tree: &Tree, table: &TableExpression, sql: &mut String) {
    tree.write_sql(table.from, sql);
    for clause in [table.defining_clause, table.where_clause].into_iter().flatten() {
        sql.push(' ');
        tree.write_sql(clause, sql);
    }
}

/// Renders the grouping columns of `group_by`, replacing any that name a
/// select list alias with the aliased expression.
#[must_use]
pub fn create_select_from_group_by(tree: &Tree, select_list: NodeId, group_by: NodeId) -> String {
    let aliases: HashMap<String, NodeId> = derived_columns(tree, select_list)
        .filter_map(|column| Some((column.alias_name(tree)?, column.value)))
        .collect();
    let references = tree
        .node::<GroupByClause>(group_by)
        .map(|clause| clause.references.as_slice())
        .unwrap_or_default();
    references
        .iter()
        .map(|&reference| {
            let unquoted = tree.to_sql_without_quotes(reference);
            aliases
                .get(&unquoted)
                .map_or_else(|| tree.to_sql(reference), |&value| tree.to_sql(value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the select list with every AS clause dropped.
#[must_use]
pub fn create_select_without_as(tree: &Tree, select_list: NodeId) -> String {
    derived_columns(tree, select_list)
        .map(|column| tree.to_sql(column.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn derived_columns(tree: &Tree, select_list: NodeId) -> impl Iterator<Item = &DerivedColumn> {
    tree.node::<SelectList>(select_list)
        .map(|list| list.columns.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(move |&id| tree.node::<DerivedColumn>(id))
}

/// Appends a WHERE clause combining the query's own condition with an extra
/// one.
///
/// `original` is a fragment rooted at a [`WhereClause`] or directly at its
/// search condition. With both present the result is
/// ` WHERE (original) AND (extra)`; with neither nothing is appended.
pub fn append_combined_where_clause(
    buffer: &mut String,
    search_condition: Option<&str>,
    original: Option<&Fragment>,
) {
    let original = original.map(|fragment| {
        let condition = fragment
            .node::<WhereClause>()
            .map_or(fragment.root(), |clause| clause.condition);
        fragment.tree().to_sql(condition)
    });
    match (original, search_condition) {
        (Some(original), Some(extra)) => {
            buffer.push_str(&format!(" WHERE ({original}) AND ({extra})"));
        }
        (Some(condition), None) => {
            buffer.push_str(" WHERE ");
            buffer.push_str(&condition);
        }
        (None, Some(condition)) => {
            buffer.push_str(" WHERE ");
            buffer.push_str(condition);
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::QuerySpecification;
    use crate::Parser;

    fn count(sql: &str) -> Result<String> {
        create_count_sql(&Parser::parse_query(sql).unwrap())
    }

    fn select_list_and_group_by(query: &Fragment) -> (NodeId, Option<NodeId>) {
        let tree = query.tree();
        let spec = query.first_element_of_type::<QuerySpecification>().unwrap();
        let (specification, _, table) = parts(tree, spec).unwrap();
        (specification.select_list, table.group_by)
    }

    #[test]
    fn test_count_plain_query() {
        assert_eq!(
            count("select * from syn123 where bar < 1.0 order by foo, bar limit 2 offset 5").unwrap(),
            "SELECT COUNT(*) FROM syn123 WHERE bar < 1.0"
        );
    }

    #[test]
    fn test_count_group_by_and_distinct() {
        assert_eq!(
            count("select foo, bar, count(*) from syn123 group by foo, bar").unwrap(),
            "SELECT COUNT(DISTINCT foo, bar) FROM syn123"
        );
        assert_eq!(
            count("select distinct foo, bar from syn123").unwrap(),
            "SELECT COUNT(DISTINCT foo, bar) FROM syn123"
        );
        assert_eq!(
            count("select foo as a from syn123 group by a").unwrap(),
            "SELECT COUNT(DISTINCT foo) FROM syn123"
        );
        assert_eq!(
            count("select distinct foo as a from syn123").unwrap(),
            "SELECT COUNT(DISTINCT foo) FROM syn123"
        );
    }

    #[test]
    fn test_count_simple_aggregate() {
        assert!(matches!(
            count("select count(*) from syn123"),
            Err(QueryError::SimpleAggregateQuery(_))
        ));
        assert!(matches!(
            count("select sum(foo), max(bar) from syn123"),
            Err(QueryError::SimpleAggregateQuery(_))
        ));
    }

    #[test]
    fn test_row_ids_and_versions() {
        let query = Parser::parse_query("select * from T123 WHERE _C2_ = 'BAR' ORDER BY _C1_").unwrap();
        assert_eq!(
            build_sql_select_row_ids_and_versions(&query, 100).unwrap().as_deref(),
            Some("SELECT ROW_ID, ROW_VERSION FROM T123 WHERE _C2_ = 'BAR' LIMIT 100")
        );
        let query = Parser::parse_query("select * from T123 limit 200 offset 100").unwrap();
        assert_eq!(
            build_sql_select_row_ids_and_versions(&query, 100).unwrap().as_deref(),
            Some("SELECT ROW_ID, ROW_VERSION FROM T123 LIMIT 100")
        );
        let query = Parser::parse_query("select count(*) from T123").unwrap();
        assert_eq!(build_sql_select_row_ids_and_versions(&query, 100).unwrap(), None);
    }

    #[test]
    fn test_select_from_group_by() {
        for (sql, expected) in [
            ("select foo as a, bar from syn123 group by bar, a", "bar, foo"),
            ("select 'has space' as b from syn123 group by b", "'has space'"),
            ("select \"has space\" as b from syn123 group by b", "\"has space\""),
        ] {
            let query = Parser::parse_query(sql).unwrap();
            let (select_list, group_by) = select_list_and_group_by(&query);
            assert_eq!(
                create_select_from_group_by(query.tree(), select_list, group_by.unwrap()),
                expected
            );
        }
    }

    #[test]
    fn test_select_without_as() {
        for (sql, expected) in [
            ("select foo as a, bar as boo from syn123", "foo, bar"),
            ("select 'foo' as a, \"bar\" as boo from syn123", "'foo', \"bar\""),
        ] {
            let query = Parser::parse_query(sql).unwrap();
            let (select_list, _) = select_list_and_group_by(&query);
            assert_eq!(create_select_without_as(query.tree(), select_list), expected);
        }
    }

    #[test]
    fn test_append_combined_where_clause() {
        let where_clause =
            Parser::parse_with("WHERE water=wet AND sky=blue", Parser::where_clause).unwrap();
        let extra = "(tabs > spaces)";

        let mut buffer = String::new();
        append_combined_where_clause(&mut buffer, None, None);
        assert!(buffer.is_empty());

        append_combined_where_clause(&mut buffer, Some(extra), None);
        assert_eq!(buffer, " WHERE (tabs > spaces)");

        buffer.clear();
        append_combined_where_clause(&mut buffer, None, Some(&where_clause));
        assert_eq!(buffer, " WHERE water = wet AND sky = blue");

        buffer.clear();
        append_combined_where_clause(&mut buffer, Some(extra), Some(&where_clause));
        assert_eq!(buffer, " WHERE (water = wet AND sky = blue) AND ((tabs > spaces))");
    }
}
