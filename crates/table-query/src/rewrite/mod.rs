//! Pure rewrites of parsed queries.
//!
//! Every function here takes a parsed query and returns a new query or a
//! derived SQL string; the input is never mutated. A query is a [`Fragment`]
//! rooted at a [`QuerySpecification`], or at a [`QueryExpression`] whose body
//! is a single query specification.
//!
//! ```
//! use table_query::rewrite::override_pagination;
//! use table_query::Parser;
//!
//! let query = Parser::parse_query("select * from syn123 limit 100 offset 50").unwrap();
//! let page = override_pagination(&query, Some(10), Some(25), Some(1000)).unwrap();
//! assert_eq!(page.to_sql(), "SELECT * FROM syn123 LIMIT 25 OFFSET 60");
//! ```

mod count;
mod pagination;
mod sort;

pub use count::{
    append_combined_where_clause, build_sql_select_row_ids_and_versions, create_count_sql,
    create_select_from_group_by, create_select_without_as,
};
pub use pagination::{convert_to_paginated_query, limit_max_rows_per_page, override_pagination};
pub use sort::{
    convert_to_sorted_query, create_double_quoted_derived_column,
    create_non_quoted_derived_column, create_sort_key, wrap_in_double_quotes, SortDirection,
    SortItem,
};

use crate::ast::{Element, Fragment, NodeId, QuerySpecification, TableExpression, Tree};
use crate::error::{QueryError, Result};

/// Finds the query specification a rewrite applies to.
fn query_specification(query: &Fragment) -> Result<NodeId> {
    let tree = query.tree();
    let root = query.root();
    let found = match tree.get(root) {
        Some(Element::QuerySpecification(_)) => Some(root),
        Some(Element::QueryExpression(expression)) => expression.single_specification(tree),
        _ => None,
    };
    found.ok_or_else(|| {
        let kind = query.kind().map_or("nothing", |kind| kind.name());
        QueryError::Unsupported(format!(
            "expected a single query specification, found {kind}"
        ))
    })
}

/// The query specification at `spec` and its table expression.
fn parts(tree: &Tree, spec: NodeId) -> Result<(&QuerySpecification, NodeId, &TableExpression)> {
    let query = tree
        .node::<QuerySpecification>(spec)
        .ok_or_else(|| QueryError::state(format!("{spec} is not a QuerySpecification")))?;
    let table = query.table_expression;
    let expression = tree
        .node::<TableExpression>(table)
        .ok_or_else(|| QueryError::state(format!("{table} is not a TableExpression")))?;
    Ok((query, table, expression))
}

/// Drops the nodes a rewrite detached from `query`.
fn compact(query: &Fragment) -> Result<Fragment> {
    query.subtree(query.root())
}
