//! Fixed names and limits shared by the parser and the rewrites.

/// Longest character string literal, in characters, accepted in a query.
pub const MAX_STRING_LENGTH: usize = 524_288;

/// Row id column present on every table.
pub const ROW_ID: &str = "ROW_ID";

/// Row version column present on every table.
pub const ROW_VERSION: &str = "ROW_VERSION";

/// Synthetic column that `TEXT_MATCHES` searches.
pub const ROW_SEARCH_CONTENT: &str = "ROW_SEARCH_CONTENT";

/// Limit used when neither the request nor the query sets one. This is the
/// largest signed 64-bit value, so the rendered LIMIT fits a signed column.
pub const UNBOUNDED_LIMIT: u64 = i64::MAX.unsigned_abs();
