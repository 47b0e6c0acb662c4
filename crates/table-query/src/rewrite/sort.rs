//! ORDER BY rewrites and identifier quoting helpers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{compact, parts, query_specification};
use crate::ast::{
    Fragment, NodeId, OrderByClause, Ordering, SetFunctionSpecification, SortKey,
    SortSpecification,
};
use crate::error::Result;
use crate::parser::Parser;

/// Direction of a requested sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for Ordering {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// A caller supplied sort: a column name and an optional direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortItem {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SortItem {
    /// Creates a sort item.
    #[must_use]
    pub fn new(column: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Puts the requested sorts ahead of the query's own ORDER BY.
///
/// An existing sort specification whose key renders exactly as a requested
/// column is dropped; the others follow the requested ones in their original
/// order. Requested sorts default to ascending.
///
/// # Errors
///
/// Returns [`QueryError::Unsupported`](crate::QueryError::Unsupported) if
/// `query` is not a single query specification, or a parse error if a
/// column cannot be turned into a sort key.
pub fn convert_to_sorted_query(query: &Fragment, items: &[SortItem]) -> Result<Fragment> {
    let spec = query_specification(query)?;
    if items.is_empty() {
        return Ok(query.clone());
    }
    let mut result = query.clone();
    let tree = result.tree_mut();
    let (_, table, expression) = parts(tree, spec)?;

    let existing = expression
        .order_by
        .and_then(|id| tree.node::<OrderByClause>(id))
        .map(|clause| clause.specifications.clone())
        .unwrap_or_default();
    let mut originals: Vec<(String, NodeId)> = Vec::with_capacity(existing.len());
    for id in existing {
        let Some(specification) = tree.node::<SortSpecification>(id) else {
            continue;
        };
        let key = tree.to_sql(specification.key);
        match originals.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = id,
            None => originals.push((key, id)),
        }
    }

    let mut specifications = Vec::with_capacity(originals.len() + items.len());
    for item in items {
        originals.retain(|(name, _)| *name != item.column);
        let key = create_sort_key(&item.column)?;
        let key = tree.graft(key.tree(), key.root())?;
        let ordering = item.direction.unwrap_or(SortDirection::Asc).into();
        specifications.push(tree.add(SortSpecification {
            key,
            ordering: Some(ordering),
        })?);
    }
    for (_, id) in originals {
        specifications.push(tree.copy_subtree(id)?);
    }

    let order_by = tree.add(OrderByClause { specifications })?;
    tree.replace_order_by(table, Some(order_by))?;
    debug!(sorts = items.len(), "sorted query");
    compact(&result)
}

/// Builds a sort key for a column name.
///
/// A name that parses completely as an aggregate expression, e.g. `max(foo)`,
/// is used as is. Anything else is treated as a column name and double
/// quoted, so `First Name` becomes `"First Name"`.
///
/// # Errors
///
/// Returns a parse error if even the quoted name does not parse.
pub fn create_sort_key(name: &str) -> Result<Fragment> {
    let mut parser = Parser::new(name);
    if let Ok(value) = parser.value_expression() {
        if parser.is_at_end()
            && parser
                .tree()
                .first_element_of_type::<SetFunctionSpecification>(value)
                .is_some()
        {
            let (mut tree, value) = parser.into_fragment(value).into_parts();
            let key = tree.add(SortKey { value })?;
            return Fragment::new(tree, key);
        }
    }
    Ok(Parser::parse_with(&wrap_in_double_quotes(name), Parser::sort_key)?)
}

/// Wraps `value` in double quotes, doubling any it contains.
#[must_use]
pub fn wrap_in_double_quotes(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// A derived column naming `name` as a double quoted identifier.
///
/// # Errors
///
/// Returns a parse error if the quoted name cannot be read back.
pub fn create_double_quoted_derived_column(name: &str) -> Result<Fragment> {
    Ok(Parser::parse_with(
        &wrap_in_double_quotes(name),
        Parser::derived_column,
    )?)
}

/// A derived column parsed from `name` verbatim.
///
/// # Errors
///
/// Returns a parse error if `name` is not a valid derived column.
pub fn create_non_quoted_derived_column(name: &str) -> Result<Fragment> {
    Ok(Parser::parse_with(name, Parser::derived_column)?)
}
