//! # table-query
//!
//! Parser, syntax tree and rewriting engine for the SQL dialect used to query
//! Synapse tables, whose names take the form `syn<digits>[.<version>]`.
//!
//! This crate provides:
//! - A hand-written lexer and recursive descent parser with one entry point
//!   per grammar production
//! - An arena backed syntax tree with parent links, type-indexed search and
//!   in-place subtree replacement
//! - Canonical rendering: uppercase keywords, normalized numbers, stable
//!   spacing
//! - Pure rewrites for pagination, sorting and count queries
//!
//! ## Parsing and rendering
//!
//! ```rust
//! use table_query::Parser;
//!
//! let query = Parser::parse_query("select foo, count(*) from SYN123.4 where bar > 1.5e3 group by foo").unwrap();
//! assert_eq!(
//!     query.to_sql(),
//!     "SELECT foo, COUNT(*) FROM syn123.4 WHERE bar > 1.5E3 GROUP BY foo"
//! );
//! ```
//!
//! ## Rewriting
//!
//! ```rust
//! use table_query::rewrite::{convert_to_sorted_query, create_count_sql, SortDirection, SortItem};
//! use table_query::Parser;
//!
//! let query = Parser::parse_query("select * from syn123 where a = 1 limit 10").unwrap();
//! assert_eq!(
//!     create_count_sql(&query).unwrap(),
//!     "SELECT COUNT(*) FROM syn123 WHERE a = 1"
//! );
//!
//! let sorted = convert_to_sorted_query(&query, &[SortItem::new("First Name", Some(SortDirection::Desc))]).unwrap();
//! assert_eq!(
//!     sorted.to_sql(),
//!     "SELECT * FROM syn123 WHERE a = 1 ORDER BY \"First Name\" DESC LIMIT 10"
//! );
//! ```

pub mod ast;
pub mod column_type;
pub mod constants;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod rewrite;

pub use ast::{Element, Fragment, Node, NodeId, NodeKind, SqlElement, Tree};
pub use column_type::ColumnType;
pub use error::{QueryError, Result, TokenError};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};
