//! Abstract syntax tree for table queries.
//!
//! Nodes live in a [`Tree`] arena and refer to their children by [`NodeId`].
//! Each slot records its parent, which is what makes in-place subtree
//! replacement possible without back references.
//!
//! The node kinds are grouped by grammar category:
//!
//! - [`identifier`]: bare and delimited identifiers, column references
//! - [`literal`]: numbers, strings, booleans, intervals
//! - [`value`]: arithmetic, set functions, CASE, CAST, scalar functions
//! - [`boolean`]: the OR/AND/NOT/IS chain
//! - [`predicate`]: comparisons, BETWEEN, IN, LIKE, HAS, TEXT_MATCHES, ...
//! - [`query`]: WITH, UNION, SELECT, select lists
//! - [`table`]: FROM, WHERE, GROUP BY, ORDER BY, LIMIT

pub mod boolean;
mod element;
pub mod identifier;
pub mod literal;
pub mod predicate;
pub mod query;
pub mod table;
mod tree;
pub mod value;

pub use boolean::{
    BooleanFactor, BooleanPrimary, BooleanTerm, BooleanTest, SearchCondition, TruthCheck,
    TruthValue,
};
pub use element::{Element, Node, NodeKind, SqlElement, SqlWriter};
pub use identifier::{
    ActualIdentifier, ColumnName, ColumnReference, DelimitedIdentifier, QuoteStyle,
    RegularIdentifier,
};
pub use literal::{
    ApproximateNumericLiteral, BooleanLiteral, CharacterStringLiteral, ExactNumericLiteral,
    GeneralLiteral, IntervalLiteral, IntervalUnit, Sign, SignedLiteral, UnsignedLiteral,
};
pub use predicate::{
    ArrayHasLikePredicate, ArrayHasPredicate, BetweenPredicate, BooleanFunction,
    BooleanFunctionPredicate, BooleanPredicate, ComparisonOperator, ComparisonPredicate,
    EscapeCharacter, HasPredicate, InPredicate, InValueList, LikeModifiers, LikePredicate,
    NullPredicate, Predicate, TextMatchesPredicate,
};
pub use query::{
    AsClause, DerivedColumn, NonJoinQueryExpression, QueryExpression, QueryPrimary,
    QuerySpecification, SelectList, UnionLeft, WithListElement,
};
pub use table::{
    CorrelationSpecification, DefiningClause, EntityId, FromClause, GroupByClause, GroupingColumnReference,
    JoinCondition, JoinType, OrderByClause, Ordering, Pagination, QualifiedJoin, SortKey,
    SortSpecification, TableExpression, TableName, TableNameCorrelation, TableReference,
    WhereClause,
};
pub use tree::{Fragment, NodeId, Tree};
pub use value::{
    AdditiveOperator, ArrayFunctionSpecification, CaseAbbreviation, CaseAbbreviationKind,
    CastSpecification, CastTarget, CastType, CurrentUserFunction, ElseClause, Factor,
    FactorOperation, MultiplicativeOperator, MySqlCastType, MySqlFunction, MySqlFunctionName,
    NumericValueExpression, ParenthesizedExpression, SearchedCase, SearchedWhenClause,
    SetFunctionSpecification, SetFunctionType, SetQuantifier, SimpleCase, SimpleWhenClause,
    Term, TermOperation, ValueExpression, ValueExpressionPrimary,
};
