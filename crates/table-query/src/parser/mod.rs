//! Recursive descent parser for table queries.
//!
//! The grammar covers the subset of SQL accepted against Synapse tables:
//! a single SELECT (optionally with WITH and UNION), FROM one table or a
//! chain of joins, and the WHERE, GROUP BY, ORDER BY and LIMIT clauses.

mod error;
mod parser;

pub use error::ParseError;
pub use parser::Parser;
