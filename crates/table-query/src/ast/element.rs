//! The closed set of node kinds and the contract every node implements.

use super::boolean::{BooleanFactor, BooleanPrimary, BooleanTerm, BooleanTest, SearchCondition};
use super::identifier::{
    ActualIdentifier, ColumnName, ColumnReference, DelimitedIdentifier, RegularIdentifier,
};
use super::literal::{
    ApproximateNumericLiteral, BooleanLiteral, CharacterStringLiteral, ExactNumericLiteral,
    GeneralLiteral, IntervalLiteral, SignedLiteral, UnsignedLiteral,
};
use super::predicate::{
    ArrayHasLikePredicate, ArrayHasPredicate, BetweenPredicate, BooleanFunctionPredicate,
    BooleanPredicate, ComparisonPredicate, EscapeCharacter, InPredicate, InValueList,
    LikePredicate, NullPredicate, Predicate, TextMatchesPredicate,
};
use super::query::{
    AsClause, DerivedColumn, NonJoinQueryExpression, QueryExpression, QueryPrimary,
    QuerySpecification, SelectList, WithListElement,
};
use super::table::{
    CorrelationSpecification, DefiningClause, EntityId, FromClause, GroupByClause, GroupingColumnReference,
    JoinCondition, OrderByClause, Pagination, QualifiedJoin, SortKey, SortSpecification,
    TableExpression, TableName, TableNameCorrelation, TableReference, WhereClause,
};
use super::tree::{NodeId, Tree};
use super::value::{
    ArrayFunctionSpecification, CaseAbbreviation, CastSpecification, CastTarget,
    CurrentUserFunction, ElseClause, Factor, MySqlFunction, NumericValueExpression,
    ParenthesizedExpression, SearchedCase, SearchedWhenClause, SetFunctionSpecification,
    SimpleCase, SimpleWhenClause, Term, ValueExpression, ValueExpressionPrimary,
};

/// Behaviour shared by every node kind.
pub trait SqlElement {
    /// Immediate children, in rendering order.
    fn children(&self) -> Vec<NodeId>;

    /// The child slots, in the same order as [`SqlElement::children`].
    fn child_slots(&mut self) -> Vec<&mut NodeId>;

    /// Writes the canonical SQL of this node.
    fn write_sql(&self, w: &mut SqlWriter<'_>);

    /// True for delimited identifiers and string literals.
    fn has_quotes(&self) -> bool {
        false
    }
}

/// A concrete node kind that can be recovered from an [`Element`].
pub trait Node: SqlElement + Into<Element> + Sized {
    /// Discriminant of this kind.
    const KIND: NodeKind;

    /// Returns the node if `element` is of this kind.
    fn cast(element: &Element) -> Option<&Self>;
}

/// Output buffer for canonical rendering.
pub struct SqlWriter<'a> {
    tree: &'a Tree,
    out: &'a mut String,
    quotes: bool,
}

impl<'a> SqlWriter<'a> {
    pub(crate) fn new(tree: &'a Tree, out: &'a mut String, quotes: bool) -> Self {
        Self { tree, out, quotes }
    }

    /// Renders the node `id`.
    pub fn node(&mut self, id: NodeId) {
        let tree = self.tree;
        if let Some(element) = tree.get(id) {
            element.write_sql(self);
        }
    }

    /// Appends raw text.
    pub fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Appends a single character.
    pub fn char(&mut self, c: char) {
        self.out.push(c);
    }

    /// Renders `ids` with `separator` between them.
    pub fn join(&mut self, ids: impl IntoIterator<Item = NodeId>, separator: &str) {
        for (index, id) in ids.into_iter().enumerate() {
            if index > 0 {
                self.out.push_str(separator);
            }
            self.node(id);
        }
    }

    /// False when rendering with delimiters stripped.
    #[must_use]
    pub const fn quotes(&self) -> bool {
        self.quotes
    }

    /// The tree being rendered.
    #[must_use]
    pub const fn tree(&self) -> &'a Tree {
        self.tree
    }
}

macro_rules! elements {
    ($($kind:ident),+ $(,)?) => {
        /// A node of the table query AST.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum Element {
            $($kind($kind)),+
        }

        /// Discriminant of [`Element`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($kind),+
        }

        impl NodeKind {
            /// Returns the name of the kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind)),+
                }
            }
        }

        impl Element {
            /// Returns the kind of this element.
            #[must_use]
            pub const fn kind(&self) -> NodeKind {
                match self {
                    $(Self::$kind(_) => NodeKind::$kind),+
                }
            }
        }

        impl SqlElement for Element {
            fn children(&self) -> Vec<NodeId> {
                match self {
                    $(Self::$kind(node) => node.children()),+
                }
            }

            fn child_slots(&mut self) -> Vec<&mut NodeId> {
                match self {
                    $(Self::$kind(node) => node.child_slots()),+
                }
            }

            fn write_sql(&self, w: &mut SqlWriter<'_>) {
                match self {
                    $(Self::$kind(node) => node.write_sql(w)),+
                }
            }

            fn has_quotes(&self) -> bool {
                match self {
                    $(Self::$kind(node) => node.has_quotes()),+
                }
            }
        }

        $(
            impl From<$kind> for Element {
                fn from(node: $kind) -> Self {
                    Self::$kind(node)
                }
            }

            impl Node for $kind {
                const KIND: NodeKind = NodeKind::$kind;

                fn cast(element: &Element) -> Option<&Self> {
                    match element {
                        Element::$kind(node) => Some(node),
                        _ => None,
                    }
                }
            }
        )+
    };
}

elements! {
    // identifier
    RegularIdentifier,
    DelimitedIdentifier,
    ActualIdentifier,
    ColumnName,
    ColumnReference,
    // literal
    ExactNumericLiteral,
    ApproximateNumericLiteral,
    CharacterStringLiteral,
    GeneralLiteral,
    IntervalLiteral,
    SignedLiteral,
    BooleanLiteral,
    UnsignedLiteral,
    // value
    ValueExpression,
    NumericValueExpression,
    Term,
    Factor,
    ValueExpressionPrimary,
    ParenthesizedExpression,
    SetFunctionSpecification,
    SimpleCase,
    SearchedCase,
    SimpleWhenClause,
    SearchedWhenClause,
    ElseClause,
    CaseAbbreviation,
    CastSpecification,
    CastTarget,
    MySqlFunction,
    CurrentUserFunction,
    ArrayFunctionSpecification,
    // boolean
    SearchCondition,
    BooleanTerm,
    BooleanFactor,
    BooleanTest,
    BooleanPrimary,
    // predicate
    Predicate,
    ComparisonPredicate,
    BetweenPredicate,
    InPredicate,
    InValueList,
    LikePredicate,
    EscapeCharacter,
    NullPredicate,
    BooleanPredicate,
    ArrayHasPredicate,
    ArrayHasLikePredicate,
    TextMatchesPredicate,
    BooleanFunctionPredicate,
    // query
    QueryExpression,
    WithListElement,
    NonJoinQueryExpression,
    QueryPrimary,
    QuerySpecification,
    SelectList,
    DerivedColumn,
    AsClause,
    // table
    TableExpression,
    FromClause,
    TableReference,
    QualifiedJoin,
    JoinCondition,
    TableNameCorrelation,
    TableName,
    EntityId,
    CorrelationSpecification,
    DefiningClause,
    WhereClause,
    GroupByClause,
    GroupingColumnReference,
    OrderByClause,
    SortSpecification,
    SortKey,
    Pagination,
}

impl NodeKind {
    /// Kinds that may stand in for each other as the child of this wrapper.
    #[must_use]
    pub const fn alternatives(self) -> &'static [Self] {
        match self {
            Self::ActualIdentifier => &[Self::RegularIdentifier, Self::DelimitedIdentifier],
            Self::UnsignedLiteral => &[
                Self::ExactNumericLiteral,
                Self::ApproximateNumericLiteral,
                Self::GeneralLiteral,
                Self::BooleanLiteral,
            ],
            Self::GeneralLiteral => &[Self::CharacterStringLiteral, Self::IntervalLiteral],
            Self::SignedLiteral => &[Self::ExactNumericLiteral, Self::ApproximateNumericLiteral],
            Self::ValueExpressionPrimary => &[
                Self::UnsignedLiteral,
                Self::ColumnReference,
                Self::SetFunctionSpecification,
                Self::ParenthesizedExpression,
                Self::SimpleCase,
                Self::SearchedCase,
                Self::CaseAbbreviation,
                Self::CastSpecification,
                Self::MySqlFunction,
                Self::CurrentUserFunction,
                Self::ArrayFunctionSpecification,
            ],
            Self::BooleanPrimary => &[Self::Predicate, Self::SearchCondition],
            Self::Predicate => &[
                Self::ComparisonPredicate,
                Self::BetweenPredicate,
                Self::InPredicate,
                Self::LikePredicate,
                Self::NullPredicate,
                Self::BooleanPredicate,
                Self::ArrayHasPredicate,
                Self::ArrayHasLikePredicate,
                Self::TextMatchesPredicate,
                Self::BooleanFunctionPredicate,
            ],
            Self::QueryPrimary => &[Self::QuerySpecification, Self::NonJoinQueryExpression],
            Self::TableReference => &[Self::TableNameCorrelation, Self::QualifiedJoin],
            Self::TableName => &[Self::EntityId, Self::ActualIdentifier],
            _ => &[],
        }
    }

    /// Returns true if `new` may take the place of `old` under this kind.
    #[must_use]
    pub fn slot_accepts(self, old: Self, new: Self) -> bool {
        let alternatives = self.alternatives();
        old == new || (alternatives.contains(&old) && alternatives.contains(&new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::QuerySpecification.name(), "QuerySpecification");
        assert_eq!(RegularIdentifier::KIND, NodeKind::RegularIdentifier);
    }

    #[test]
    fn test_slot_accepts_alternatives() {
        let wrapper = NodeKind::ActualIdentifier;
        assert!(wrapper.slot_accepts(NodeKind::RegularIdentifier, NodeKind::DelimitedIdentifier));
        assert!(!wrapper.slot_accepts(NodeKind::RegularIdentifier, NodeKind::EntityId));
        assert!(NodeKind::WhereClause.slot_accepts(NodeKind::SearchCondition, NodeKind::SearchCondition));
        assert!(!NodeKind::WhereClause.slot_accepts(NodeKind::SearchCondition, NodeKind::Predicate));
    }
}
