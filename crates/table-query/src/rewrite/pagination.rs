//! LIMIT/OFFSET rewrites.

use tracing::debug;

use super::{compact, parts, query_specification};
use crate::ast::{Fragment, Pagination};
use crate::constants::UNBOUNDED_LIMIT;
use crate::error::Result;

/// Replaces the pagination of `query` with `LIMIT limit OFFSET offset`.
///
/// # Errors
///
/// Returns [`QueryError::Unsupported`](crate::QueryError::Unsupported) if
/// `query` is not a single query specification.
pub fn convert_to_paginated_query(
    query: &Fragment,
    offset: Option<u64>,
    limit: Option<u64>,
) -> Result<Fragment> {
    let spec = query_specification(query)?;
    let mut result = query.clone();
    let tree = result.tree_mut();
    let (_, table, _) = parts(tree, spec)?;
    let pagination = tree.add(Pagination { limit, offset })?;
    tree.replace_pagination(table, Some(pagination))?;
    debug!(?limit, ?offset, "paginated query");
    compact(&result)
}

/// Combines a requested page with the pagination already in `query`.
///
/// The requested offset is relative to the query's own window: it is added to
/// the query offset and shrinks the query limit. The smaller of the two limits
/// wins, capped at `max_rows_per_page`. With all three inputs absent the query
/// is returned unchanged.
///
/// # Errors
///
/// Returns [`QueryError::Unsupported`](crate::QueryError::Unsupported) if
/// `query` is not a single query specification.
pub fn override_pagination(
    query: &Fragment,
    offset: Option<u64>,
    limit: Option<u64>,
    max_rows_per_page: Option<u64>,
) -> Result<Fragment> {
    let spec = query_specification(query)?;
    if offset.is_none() && limit.is_none() && max_rows_per_page.is_none() {
        return Ok(query.clone());
    }

    let tree = query.tree();
    let (_, _, table) = parts(tree, spec)?;
    let existing = table
        .pagination
        .and_then(|id| tree.node::<Pagination>(id))
        .copied()
        .unwrap_or_default();

    let request_limit = limit.unwrap_or(UNBOUNDED_LIMIT);
    let request_offset = offset.unwrap_or(0);
    let query_limit = existing.limit.unwrap_or(UNBOUNDED_LIMIT);
    let query_offset = existing.offset.unwrap_or(0);

    let page = limit_max_rows_per_page(
        Pagination {
            limit: Some(request_limit.min(query_limit.saturating_sub(request_offset))),
            offset: Some(query_offset.saturating_add(request_offset)),
        },
        max_rows_per_page,
    );
    debug!(?existing, ?page, "overriding pagination");
    convert_to_paginated_query(query, page.offset, page.limit)
}

/// Caps the limit of `pagination` at `max_rows_per_page`. An absent limit is
/// unbounded and therefore capped too.
#[must_use]
pub fn limit_max_rows_per_page(pagination: Pagination, max_rows_per_page: Option<u64>) -> Pagination {
    let Some(max) = max_rows_per_page else {
        return pagination;
    };
    let limit = pagination.limit.unwrap_or(UNBOUNDED_LIMIT).min(max);
    Pagination {
        limit: Some(limit),
        ..pagination
    }
}
