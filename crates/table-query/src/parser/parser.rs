//! Table query parser implementation.

use tracing::{debug, trace};

use super::error::ParseError;
use crate::ast::{
    ActualIdentifier, AdditiveOperator, ApproximateNumericLiteral, ArrayFunctionSpecification,
    ArrayHasLikePredicate, ArrayHasPredicate, AsClause, BetweenPredicate, BooleanFactor,
    BooleanFunction, BooleanFunctionPredicate, BooleanLiteral, BooleanPredicate, BooleanPrimary,
    BooleanTerm, BooleanTest, CaseAbbreviation, CaseAbbreviationKind, CastSpecification,
    CastTarget, CastType, CharacterStringLiteral, ColumnName, ColumnReference,
    ComparisonOperator, ComparisonPredicate, CorrelationSpecification, CurrentUserFunction,
    DefiningClause,
    DelimitedIdentifier, DerivedColumn, Element, ElseClause, EntityId, EscapeCharacter,
    ExactNumericLiteral, Factor, FactorOperation, Fragment, FromClause, GeneralLiteral,
    GroupByClause, GroupingColumnReference, InPredicate, InValueList, IntervalLiteral,
    IntervalUnit, JoinCondition, JoinType, LikeModifiers, LikePredicate, MultiplicativeOperator,
    MySqlCastType, MySqlFunction, MySqlFunctionName, NodeId, NonJoinQueryExpression,
    NullPredicate, NumericValueExpression, OrderByClause, Ordering, Pagination,
    ParenthesizedExpression, Predicate, QualifiedJoin, QueryExpression, QueryPrimary,
    QuerySpecification, QuoteStyle, RegularIdentifier, SearchCondition, SearchedCase,
    SearchedWhenClause, SelectList, SetFunctionSpecification, SetFunctionType, SetQuantifier,
    Sign, SignedLiteral, SimpleCase, SimpleWhenClause, SortKey, SortSpecification,
    TableExpression, TableName, TableNameCorrelation, TableReference, Term, TermOperation,
    TextMatchesPredicate, Tree, TruthCheck, TruthValue, UnionLeft, UnsignedLiteral,
    ValueExpression, ValueExpressionPrimary, WhereClause, WithListElement,
};
use crate::column_type::ColumnType;
use crate::constants::ROW_SEARCH_CONTENT;
use crate::error::QueryError;
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// A saved parser position.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    len: usize,
}

/// Table query parser.
///
/// Each grammar production is a public method that parses from the current
/// position, appends the nodes it builds to the parser's [`Tree`] and returns
/// the id of the production's node.
pub struct Parser {
    tokens: Vec<Token>,
    eof: Token,
    pos: usize,
    tree: Tree,
}

impl Parser {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let tokens = Lexer::new(input).tokenize();
        let end = input.len();
        let eof = tokens
            .last()
            .filter(|token| token.is_eof())
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, Span::new(end, end)));
        Self {
            tokens,
            eof,
            pos: 0,
            tree: Tree::new(),
        }
    }

    /// Parses a complete query.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Parse`] if the input does not match the grammar,
    /// or [`QueryError::Token`] if it could not be tokenized.
    pub fn parse_query(sql: &str) -> Result<Fragment, QueryError> {
        debug!(len = sql.len(), "parsing table query");
        let fragment = Self::parse_with(sql, Self::query_expression)?;
        debug!(nodes = fragment.tree().len(), "parsed table query");
        Ok(fragment)
    }

    /// Parses `sql` with a single production and requires all input to be
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the production fails or input remains.
    pub fn parse_with<F>(sql: &str, production: F) -> Result<Fragment, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<NodeId, ParseError>,
    {
        let mut parser = Self::new(sql);
        let root = production(&mut parser)?;
        parser.finish(root)
    }

    /// Requires end of input and hands out the parsed fragment.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if tokens remain.
    pub fn finish(self, root: NodeId) -> Result<Fragment, ParseError> {
        if !self.is_at_end() {
            return Err(self.error("end of input"));
        }
        Ok(self.into_fragment(root))
    }

    /// Hands out the parsed fragment without checking for remaining input.
    #[must_use]
    pub fn into_fragment(self, root: NodeId) -> Fragment {
        Fragment::from_parts(self.tree, root)
    }

    /// Returns true once every token has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// The nodes built so far.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// `[WITH with_list_element {, with_list_element}] non_join_query_expression`
    pub fn query_expression(&mut self) -> Result<NodeId, ParseError> {
        let mut with = Vec::new();
        if self.check_keyword(Keyword::With) {
            self.advance();
            with.push(self.with_list_element()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                with.push(self.with_list_element()?);
            }
        }
        let body = self.non_join_query_expression()?;
        Ok(self.tree.push(QueryExpression { with, body }))
    }

    /// `name [(column {, column})] AS (query_expression)`
    pub fn with_list_element(&mut self) -> Result<NodeId, ParseError> {
        let name = self.actual_identifier()?;
        let mut columns = Vec::new();
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            columns.push(self.column_name()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                columns.push(self.column_name()?);
            }
            self.expect(&TokenKind::RightParen)?;
        }
        self.expect_keyword(Keyword::As)?;
        self.expect(&TokenKind::LeftParen)?;
        let query = self.query_expression()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(WithListElement {
            name,
            columns,
            query,
        }))
    }

    /// `query_primary {UNION [ALL|DISTINCT] query_primary}`
    pub fn non_join_query_expression(&mut self) -> Result<NodeId, ParseError> {
        let term = self.query_primary()?;
        let mut node = self.tree.push(NonJoinQueryExpression { union: None, term });
        while self.check_keyword(Keyword::Union) {
            self.advance();
            let quantifier = self.set_quantifier();
            let term = self.query_primary()?;
            node = self.tree.push(NonJoinQueryExpression {
                union: Some(UnionLeft {
                    left: node,
                    quantifier,
                }),
                term,
            });
        }
        Ok(node)
    }

    /// `query_specification | ( non_join_query_expression )`
    pub fn query_primary(&mut self) -> Result<NodeId, ParseError> {
        let inner = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let inner = self.non_join_query_expression()?;
            self.expect(&TokenKind::RightParen)?;
            inner
        } else {
            self.query_specification()?
        };
        Ok(self.tree.push(QueryPrimary { inner }))
    }

    /// `SELECT [DISTINCT|ALL] select_list table_expression`
    pub fn query_specification(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        let quantifier = self.set_quantifier();
        let select_list = self.select_list()?;
        let table_expression = self.table_expression()?;
        Ok(self.tree.push(QuerySpecification {
            quantifier,
            select_list,
            table_expression,
        }))
    }

    /// `* | derived_column {, derived_column}`
    pub fn select_list(&mut self) -> Result<NodeId, ParseError> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(self.tree.push(SelectList {
                asterisk: true,
                columns: Vec::new(),
            }));
        }
        let mut columns = vec![self.derived_column()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            columns.push(self.derived_column()?);
        }
        Ok(self.tree.push(SelectList {
            asterisk: false,
            columns,
        }))
    }

    /// `value_expression [as_clause]`
    pub fn derived_column(&mut self) -> Result<NodeId, ParseError> {
        let value = self.value_expression()?;
        let alias = if self.check_keyword(Keyword::As) {
            Some(self.as_clause()?)
        } else {
            None
        };
        Ok(self.tree.push(DerivedColumn { value, alias }))
    }

    /// `AS column_name`
    pub fn as_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::As)?;
        let name = self.column_name()?;
        Ok(self.tree.push(AsClause { name }))
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    /// `from_clause [defining_clause] [where_clause] [group_by_clause]
    /// [order_by_clause] [pagination]`
    pub fn table_expression(&mut self) -> Result<NodeId, ParseError> {
        let from = self.from_clause()?;
        let defining_clause = if self.check_keyword(Keyword::DefiningWhere) {
            Some(self.defining_clause()?)
        } else {
            None
        };
        let where_clause = if self.check_keyword(Keyword::Where) {
            Some(self.where_clause()?)
        } else {
            None
        };
        let group_by = if self.check_keyword(Keyword::Group) {
            Some(self.group_by_clause()?)
        } else {
            None
        };
        let order_by = if self.check_keyword(Keyword::Order) {
            Some(self.order_by_clause()?)
        } else {
            None
        };
        let pagination = if self.check_keyword(Keyword::Limit) {
            Some(self.pagination()?)
        } else {
            None
        };
        Ok(self.tree.push(TableExpression {
            from,
            defining_clause,
            where_clause,
            group_by,
            order_by,
            pagination,
        }))
    }

    /// `FROM table_reference`
    pub fn from_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::From)?;
        let reference = self.table_reference()?;
        Ok(self.tree.push(FromClause { reference }))
    }

    /// `table_name_correlation {[join_type] JOIN table_name_correlation [join_condition]}`
    pub fn table_reference(&mut self) -> Result<NodeId, ParseError> {
        let first = self.table_name_correlation()?;
        let mut reference = self.tree.push(TableReference { inner: first });
        while let Some(join_type) = self.join_type()? {
            let right = self.table_name_correlation()?;
            let condition = if self.check_keyword(Keyword::On) {
                Some(self.join_condition()?)
            } else {
                None
            };
            let join = self.tree.push(QualifiedJoin {
                left: reference,
                join_type,
                right,
                condition,
            });
            reference = self.tree.push(TableReference { inner: join });
        }
        Ok(reference)
    }

    /// Consumes `[INNER | LEFT [OUTER] | RIGHT [OUTER]] JOIN`. The outer
    /// `None` means no join follows.
    fn join_type(&mut self) -> Result<Option<Option<JoinType>>, ParseError> {
        let join_type = match self.current().as_keyword() {
            Some(Keyword::Join) => None,
            Some(Keyword::Inner) => {
                self.advance();
                Some(JoinType::Inner)
            }
            Some(Keyword::Left) => {
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                    Some(JoinType::LeftOuter)
                } else {
                    Some(JoinType::Left)
                }
            }
            Some(Keyword::Right) => {
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                    Some(JoinType::RightOuter)
                } else {
                    Some(JoinType::Right)
                }
            }
            _ => return Ok(None),
        };
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    /// `ON search_condition`
    pub fn join_condition(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::On)?;
        let condition = self.search_condition()?;
        Ok(self.tree.push(JoinCondition { condition }))
    }

    /// `table_name [correlation_specification]`
    pub fn table_name_correlation(&mut self) -> Result<NodeId, ParseError> {
        let name = self.table_name()?;
        let correlation = if self.check_keyword(Keyword::As) || self.check_identifier() {
            Some(self.correlation_specification()?)
        } else {
            None
        };
        Ok(self.tree.push(TableNameCorrelation { name, correlation }))
    }

    /// `entity_id | actual_identifier`
    ///
    /// A trailing `.` after an unversioned entity id is dropped.
    pub fn table_name(&mut self) -> Result<NodeId, ParseError> {
        let inner = match &self.current().kind {
            TokenKind::EntityId(text) => {
                let span = self.current().span;
                let entity_id = parse_entity_id(text, span)?;
                self.advance();
                if self.check(&TokenKind::Dot) {
                    if entity_id.version.is_some() {
                        return Err(ParseError::new(
                            format!("Invalid table name: {entity_id}."),
                            span.merge(self.current().span),
                        ));
                    }
                    self.advance();
                }
                self.tree.push(entity_id)
            }
            TokenKind::Identifier(_) if self.peek_is(1, &TokenKind::LeftParen) => {
                return Err(self.error("table name"));
            }
            _ => self.actual_identifier()?,
        };
        Ok(self.tree.push(TableName { inner }))
    }

    /// `[AS] actual_identifier`
    pub fn correlation_specification(&mut self) -> Result<NodeId, ParseError> {
        let with_as = self.check_keyword(Keyword::As);
        if with_as {
            self.advance();
        }
        let name = self.actual_identifier()?;
        Ok(self.tree.push(CorrelationSpecification { with_as, name }))
    }

    /// `DEFINING_WHERE search_condition`
    pub fn defining_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::DefiningWhere)?;
        let condition = self.search_condition()?;
        Ok(self.tree.push(DefiningClause { condition }))
    }

    /// `WHERE search_condition`
    pub fn where_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Where)?;
        let condition = self.search_condition()?;
        Ok(self.tree.push(WhereClause { condition }))
    }

    /// `GROUP BY grouping_column_reference {, grouping_column_reference}`
    pub fn group_by_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Group)?;
        self.expect_keyword(Keyword::By)?;
        let mut references = vec![self.grouping_column_reference()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            references.push(self.grouping_column_reference()?);
        }
        Ok(self.tree.push(GroupByClause { references }))
    }

    pub fn grouping_column_reference(&mut self) -> Result<NodeId, ParseError> {
        let value = self.value_expression()?;
        Ok(self.tree.push(GroupingColumnReference { value }))
    }

    /// `ORDER BY sort_specification {, sort_specification}`
    pub fn order_by_clause(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Order)?;
        self.expect_keyword(Keyword::By)?;
        let mut specifications = vec![self.sort_specification()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            specifications.push(self.sort_specification()?);
        }
        Ok(self.tree.push(OrderByClause { specifications }))
    }

    /// `sort_key [ASC|DESC]`
    pub fn sort_specification(&mut self) -> Result<NodeId, ParseError> {
        let key = self.sort_key()?;
        let ordering = match self.current().as_keyword() {
            Some(Keyword::Asc) => {
                self.advance();
                Some(Ordering::Asc)
            }
            Some(Keyword::Desc) => {
                self.advance();
                Some(Ordering::Desc)
            }
            _ => None,
        };
        Ok(self.tree.push(SortSpecification { key, ordering }))
    }

    pub fn sort_key(&mut self) -> Result<NodeId, ParseError> {
        let value = self.value_expression()?;
        Ok(self.tree.push(SortKey { value }))
    }

    /// `LIMIT n [OFFSET m]`
    pub fn pagination(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Limit)?;
        let limit = self.unsigned_integer()?;
        let offset = if self.check_keyword(Keyword::Offset) {
            self.advance();
            Some(self.unsigned_integer()?)
        } else {
            None
        };
        Ok(self.tree.push(Pagination {
            limit: Some(limit),
            offset,
        }))
    }

    fn unsigned_integer(&mut self) -> Result<u64, ParseError> {
        if let TokenKind::ExactNumeric(text) = &self.current().kind {
            if let Ok(value) = text.parse::<u64>() {
                self.advance();
                return Ok(value);
            }
        }
        Err(self.error("unsigned integer"))
    }

    // ------------------------------------------------------------------
    // Boolean chain
    // ------------------------------------------------------------------

    /// `boolean_term {OR boolean_term}`
    pub fn search_condition(&mut self) -> Result<NodeId, ParseError> {
        let mut terms = vec![self.boolean_term()?];
        while self.check_keyword(Keyword::Or) {
            self.advance();
            terms.push(self.boolean_term()?);
        }
        Ok(self.tree.push(SearchCondition { terms }))
    }

    /// `boolean_factor {AND boolean_factor}`
    pub fn boolean_term(&mut self) -> Result<NodeId, ParseError> {
        let mut factors = vec![self.boolean_factor()?];
        while self.check_keyword(Keyword::And) {
            self.advance();
            factors.push(self.boolean_factor()?);
        }
        Ok(self.tree.push(BooleanTerm { factors }))
    }

    /// `[NOT] boolean_test`
    pub fn boolean_factor(&mut self) -> Result<NodeId, ParseError> {
        let not = self.check_keyword(Keyword::Not);
        if not {
            self.advance();
        }
        let test = self.boolean_test()?;
        Ok(self.tree.push(BooleanFactor { not, test }))
    }

    /// `boolean_primary [IS [NOT] truth_value]`
    pub fn boolean_test(&mut self) -> Result<NodeId, ParseError> {
        let primary = self.boolean_primary()?;
        let truth = if self.check_keyword(Keyword::Is) {
            self.advance();
            Some(self.truth_check()?)
        } else {
            None
        };
        Ok(self.tree.push(BooleanTest { primary, truth }))
    }

    /// `predicate | ( search_condition )`
    pub fn boolean_primary(&mut self) -> Result<NodeId, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            let checkpoint = self.checkpoint();
            self.advance();
            match self.search_condition() {
                Ok(condition) if self.check(&TokenKind::RightParen) => {
                    self.advance();
                    return Ok(self.tree.push(BooleanPrimary { inner: condition }));
                }
                // A parenthesised value, e.g. `(a + 1) > 2`.
                _ => self.restore(checkpoint),
            }
        }
        let inner = self.predicate()?;
        Ok(self.tree.push(BooleanPrimary { inner }))
    }

    /// `[NOT] TRUE|FALSE|UNKNOWN`, after `IS` has been consumed.
    fn truth_check(&mut self) -> Result<TruthCheck, ParseError> {
        let not = self.check_keyword(Keyword::Not);
        if not {
            self.advance();
        }
        let value = match self.current().as_keyword() {
            Some(Keyword::True) => TruthValue::True,
            Some(Keyword::False) => TruthValue::False,
            Some(Keyword::Unknown) => TruthValue::Unknown,
            _ => return Err(self.error("TRUE, FALSE or UNKNOWN")),
        };
        self.advance();
        Ok(TruthCheck { not, value })
    }

    // ------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------

    /// Any predicate, wrapped in a [`Predicate`] node.
    pub fn predicate(&mut self) -> Result<NodeId, ParseError> {
        let inner = if self.check_keyword(Keyword::TextMatches) {
            self.text_matches_predicate()?
        } else if self.boolean_function().is_some() {
            self.boolean_function_predicate()?
        } else {
            let lhs = self.value_expression()?;
            self.predicate_rest(lhs)?
        };
        Ok(self.tree.push(Predicate { inner }))
    }

    /// Parses whatever follows the left-hand side of a predicate.
    fn predicate_rest(&mut self, lhs: NodeId) -> Result<NodeId, ParseError> {
        if let Some(op) = self.comparison_operator() {
            self.advance();
            let rhs = self.value_expression()?;
            let tree = &self.tree;
            if tree.first_element_of_type::<CurrentUserFunction>(lhs).is_some()
                && tree.first_element_of_type::<CurrentUserFunction>(rhs).is_some()
            {
                return Err(ParseError::new(
                    "CURRENT_USER() cannot be used on both sides of a comparison",
                    self.previous().span,
                ));
            }
            return Ok(self.tree.push(ComparisonPredicate { lhs, op, rhs }));
        }

        if self.check_keyword(Keyword::Is) {
            self.advance();
            let not = self.check_keyword(Keyword::Not);
            if self.peek_keyword(usize::from(not), Keyword::Null) {
                if not {
                    self.advance();
                }
                self.advance();
                return Ok(self.tree.push(NullPredicate { lhs, not }));
            }
            let truth = self.truth_check()?;
            return Ok(self.tree.push(BooleanPredicate { lhs, truth }));
        }

        let not = self.check_keyword(Keyword::Not);
        if not {
            self.advance();
        }
        match self.current().as_keyword() {
            Some(Keyword::Between) => {
                self.advance();
                let low = self.value_expression()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.value_expression()?;
                Ok(self.tree.push(BetweenPredicate {
                    lhs,
                    not,
                    low,
                    high,
                }))
            }
            Some(Keyword::In) => {
                self.advance();
                let values = self.in_value_list()?;
                Ok(self.tree.push(InPredicate { lhs, not, values }))
            }
            Some(Keyword::Like) => {
                self.advance();
                let pattern = self.value_expression()?;
                let escape = self.optional_escape()?;
                Ok(self.tree.push(LikePredicate {
                    lhs,
                    modifiers: LikeModifiers { not, escape },
                    pattern,
                }))
            }
            Some(Keyword::Has) => {
                self.advance();
                let values = self.in_value_list()?;
                Ok(self.tree.push(ArrayHasPredicate { lhs, not, values }))
            }
            Some(Keyword::HasLike) => {
                self.advance();
                let values = self.in_value_list()?;
                let escape = self.optional_escape()?;
                Ok(self.tree.push(ArrayHasLikePredicate {
                    lhs,
                    modifiers: LikeModifiers { not, escape },
                    values,
                }))
            }
            _ if not => Err(self.error("BETWEEN, IN, LIKE, HAS or HAS_LIKE")),
            _ => Err(self.error("comparison operator or predicate")),
        }
    }

    fn comparison_operator(&self) -> Option<ComparisonOperator> {
        match self.current().kind {
            TokenKind::Eq => Some(ComparisonOperator::Eq),
            TokenKind::NotEq => Some(ComparisonOperator::NotEq),
            TokenKind::Lt => Some(ComparisonOperator::Lt),
            TokenKind::LtEq => Some(ComparisonOperator::LtEq),
            TokenKind::Gt => Some(ComparisonOperator::Gt),
            TokenKind::GtEq => Some(ComparisonOperator::GtEq),
            _ => None,
        }
    }

    fn optional_escape(&mut self) -> Result<Option<NodeId>, ParseError> {
        if self.check_keyword(Keyword::Escape) {
            Ok(Some(self.escape_character()?))
        } else {
            Ok(None)
        }
    }

    /// `ESCAPE value_expression`
    pub fn escape_character(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Escape)?;
        let value = self.value_expression()?;
        Ok(self.tree.push(EscapeCharacter { value }))
    }

    /// `( value_expression {, value_expression} )`
    pub fn in_value_list(&mut self) -> Result<NodeId, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut values = vec![self.value_expression()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            values.push(self.value_expression()?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(InValueList { values }))
    }

    /// `TEXT_MATCHES ( 'string' )`
    pub fn text_matches_predicate(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::TextMatches)?;
        self.expect(&TokenKind::LeftParen)?;
        if !matches!(self.current().kind, TokenKind::String(_)) {
            return Err(self.error("a single-quoted string"));
        }
        let value = self.character_string_literal()?;
        self.expect(&TokenKind::RightParen)?;

        let identifier = self.tree.push(RegularIdentifier::new(ROW_SEARCH_CONTENT));
        let identifier = self.tree.push(ActualIdentifier { inner: identifier });
        let name = self.tree.push(ColumnName { identifier });
        let lhs = self.tree.push(ColumnReference {
            qualifier: None,
            name,
        });
        Ok(self.tree.push(TextMatchesPredicate { lhs, value }))
    }

    fn boolean_function(&self) -> Option<BooleanFunction> {
        match &self.current().kind {
            TokenKind::Identifier(name) if self.peek_is(1, &TokenKind::LeftParen) => {
                BooleanFunction::from_str(name)
            }
            _ => None,
        }
    }

    /// `ISNAN ( column_reference )` or `ISINFINITY ( column_reference )`
    pub fn boolean_function_predicate(&mut self) -> Result<NodeId, ParseError> {
        let function = self
            .boolean_function()
            .ok_or_else(|| self.error("ISNAN or ISINFINITY"))?;
        self.advance();
        self.expect(&TokenKind::LeftParen)?;
        let column = self.column_reference()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(BooleanFunctionPredicate { function, column }))
    }

    // ------------------------------------------------------------------
    // Value expressions
    // ------------------------------------------------------------------

    pub fn value_expression(&mut self) -> Result<NodeId, ParseError> {
        let expression = self.numeric_value_expression()?;
        Ok(self.tree.push(ValueExpression { expression }))
    }

    /// `term {(+|-) term}`
    pub fn numeric_value_expression(&mut self) -> Result<NodeId, ParseError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let operator = match self.current().kind {
                TokenKind::Plus => AdditiveOperator::Add,
                TokenKind::Minus => AdditiveOperator::Subtract,
                _ => break,
            };
            self.advance();
            rest.push(TermOperation {
                operator,
                term: self.term()?,
            });
        }
        Ok(self.tree.push(NumericValueExpression { first, rest }))
    }

    /// `factor {(*|/|%|DIV) factor}`
    pub fn term(&mut self) -> Result<NodeId, ParseError> {
        let first = self.factor()?;
        let mut rest = Vec::new();
        loop {
            let operator = match self.current().kind {
                TokenKind::Star => MultiplicativeOperator::Multiply,
                TokenKind::Slash => MultiplicativeOperator::Divide,
                TokenKind::Percent => MultiplicativeOperator::Modulo,
                TokenKind::Keyword(Keyword::Div) => MultiplicativeOperator::IntegerDivide,
                _ => break,
            };
            self.advance();
            rest.push(FactorOperation {
                operator,
                factor: self.factor()?,
            });
        }
        Ok(self.tree.push(Term { first, rest }))
    }

    /// `[+|-] value_expression_primary`
    pub fn factor(&mut self) -> Result<NodeId, ParseError> {
        let sign = self.sign();
        let primary = self.value_expression_primary()?;
        Ok(self.tree.push(Factor { sign, primary }))
    }

    fn sign(&mut self) -> Option<Sign> {
        let sign = match self.current().kind {
            TokenKind::Plus => Sign::Plus,
            TokenKind::Minus => Sign::Minus,
            _ => return None,
        };
        self.advance();
        Some(sign)
    }

    /// Literal, column, function call, CASE, CAST or parenthesised value.
    pub fn value_expression_primary(&mut self) -> Result<NodeId, ParseError> {
        let inner = match &self.current().kind {
            TokenKind::ExactNumeric(_)
            | TokenKind::ApproximateNumeric(_)
            | TokenKind::String(_)
            | TokenKind::Keyword(Keyword::True | Keyword::False | Keyword::Interval) => {
                self.unsigned_literal()?
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.value_expression()?;
                self.expect(&TokenKind::RightParen)?;
                self.tree.push(ParenthesizedExpression { expression })
            }
            TokenKind::Keyword(Keyword::Case) => self.case_expression()?,
            TokenKind::Keyword(Keyword::Cast) => self.cast_specification()?,
            TokenKind::Identifier(name) if self.peek_is(1, &TokenKind::LeftParen) => {
                let name = name.clone();
                self.function_call(&name)?
            }
            TokenKind::Identifier(name)
                if MySqlFunctionName::from_str(name).is_some_and(MySqlFunctionName::allows_bare) =>
            {
                self.mysql_function()?
            }
            TokenKind::Identifier(_)
            | TokenKind::EntityId(_)
            | TokenKind::DoubleQuoted(_)
            | TokenKind::Backticked(_) => self.column_reference()?,
            _ => return Err(self.error("value expression")),
        };
        Ok(self.tree.push(ValueExpressionPrimary { inner }))
    }

    /// Dispatches `name(` to the production for that function.
    fn function_call(&mut self, name: &str) -> Result<NodeId, ParseError> {
        if SetFunctionType::from_str(name).is_some() {
            self.set_function_specification()
        } else if CaseAbbreviationKind::from_str(name).is_some() {
            self.case_abbreviation()
        } else if name.eq_ignore_ascii_case("UNNEST") {
            self.array_function_specification()
        } else if name.eq_ignore_ascii_case("CURRENT_USER") {
            self.current_user_function()
        } else if MySqlFunctionName::from_str(name).is_some() {
            self.mysql_function()
        } else {
            Err(ParseError::new(
                format!("Unknown function: {name}"),
                self.current().span,
            ))
        }
    }

    /// `COUNT(*)`, `COUNT([DISTINCT] a {, b})`, `MAX([DISTINCT] a)`,
    /// `GROUP_CONCAT([DISTINCT] a {, b} [ORDER BY ..] [SEPARATOR '..'])`, ...
    pub fn set_function_specification(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current().span;
        let function = match &self.current().kind {
            TokenKind::Identifier(name) => SetFunctionType::from_str(name),
            _ => None,
        }
        .ok_or_else(|| self.error("aggregate function"))?;
        self.advance();
        self.expect(&TokenKind::LeftParen)?;

        if function == SetFunctionType::Count && self.check(&TokenKind::Star) {
            self.advance();
            self.expect(&TokenKind::RightParen)?;
            return Ok(self.tree.push(SetFunctionSpecification {
                function,
                quantifier: None,
                asterisk: true,
                arguments: Vec::new(),
                order_by: None,
                separator: None,
            }));
        }

        let quantifier = self.set_quantifier();
        let mut arguments = vec![self.value_expression()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            arguments.push(self.value_expression()?);
        }
        let multiple = matches!(function, SetFunctionType::Count | SetFunctionType::GroupConcat);
        if arguments.len() > 1 && !multiple {
            return Err(ParseError::new(
                format!("{} takes a single argument", function.as_str()),
                span,
            ));
        }

        let mut order_by = None;
        let mut separator = None;
        if function == SetFunctionType::GroupConcat {
            if self.check_keyword(Keyword::Order) {
                order_by = Some(self.order_by_clause()?);
            }
            if self.check_keyword(Keyword::Separator) {
                self.advance();
                separator = Some(self.character_string_literal()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(SetFunctionSpecification {
            function,
            quantifier,
            asterisk: false,
            arguments,
            order_by,
            separator,
        }))
    }

    fn set_quantifier(&mut self) -> Option<SetQuantifier> {
        let quantifier = match self.current().as_keyword() {
            Some(Keyword::Distinct) => SetQuantifier::Distinct,
            Some(Keyword::All) => SetQuantifier::All,
            _ => return None,
        };
        self.advance();
        Some(quantifier)
    }

    /// `CASE [operand] WHEN .. THEN .. {WHEN .. THEN ..} [ELSE ..] END`
    pub fn case_expression(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Case)?;
        if self.check_keyword(Keyword::When) {
            let mut whens = Vec::new();
            while self.check_keyword(Keyword::When) {
                self.advance();
                let condition = self.search_condition()?;
                self.expect_keyword(Keyword::Then)?;
                let result = self.value_expression()?;
                whens.push(self.tree.push(SearchedWhenClause { condition, result }));
            }
            let else_clause = self.else_clause()?;
            self.expect_keyword(Keyword::End)?;
            return Ok(self.tree.push(SearchedCase { whens, else_clause }));
        }

        let operand = self.value_expression()?;
        if !self.check_keyword(Keyword::When) {
            return Err(self.error("WHEN"));
        }
        let mut whens = Vec::new();
        while self.check_keyword(Keyword::When) {
            self.advance();
            let operand = self.value_expression()?;
            self.expect_keyword(Keyword::Then)?;
            let result = self.value_expression()?;
            whens.push(self.tree.push(SimpleWhenClause { operand, result }));
        }
        let else_clause = self.else_clause()?;
        self.expect_keyword(Keyword::End)?;
        Ok(self.tree.push(SimpleCase {
            operand,
            whens,
            else_clause,
        }))
    }

    fn else_clause(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check_keyword(Keyword::Else) {
            return Ok(None);
        }
        self.advance();
        let result = self.value_expression()?;
        Ok(Some(self.tree.push(ElseClause { result })))
    }

    /// `NULLIF(a, b)` or `COALESCE(a {, b})`
    pub fn case_abbreviation(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current().span;
        let kind = match &self.current().kind {
            TokenKind::Identifier(name) => CaseAbbreviationKind::from_str(name),
            _ => None,
        }
        .ok_or_else(|| self.error("NULLIF or COALESCE"))?;
        self.advance();
        let arguments = self.argument_list()?;
        if kind == CaseAbbreviationKind::NullIf && arguments.len() != 2 {
            return Err(ParseError::new("NULLIF takes exactly two arguments", span));
        }
        if arguments.is_empty() {
            return Err(ParseError::new("COALESCE needs at least one argument", span));
        }
        Ok(self.tree.push(CaseAbbreviation { kind, arguments }))
    }

    /// `CAST ( value_expression AS cast_target )`
    pub fn cast_specification(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let operand = self.value_expression()?;
        self.expect_keyword(Keyword::As)?;
        let target = self.cast_target()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(CastSpecification { operand, target }))
    }

    /// A column type, a MySQL cast type, or a column id.
    pub fn cast_target(&mut self) -> Result<NodeId, ParseError> {
        let cast_type = match &self.current().kind {
            TokenKind::Identifier(name) => ColumnType::from_str(name)
                .map(CastType::Column)
                .or_else(|| MySqlCastType::from_str(name).map(CastType::Sql)),
            TokenKind::ExactNumeric(text) => text.parse().ok().map(CastType::ColumnId),
            _ => None,
        }
        .ok_or_else(|| self.error("column type or column id"))?;
        self.advance();
        Ok(self.tree.push(CastTarget { cast_type }))
    }

    /// A scalar MySQL function, e.g. `FROM_UNIXTIME(a,'%Y')` or a bare
    /// `CURRENT_DATE`.
    pub fn mysql_function(&mut self) -> Result<NodeId, ParseError> {
        let name = match &self.current().kind {
            TokenKind::Identifier(name) => MySqlFunctionName::from_str(name),
            _ => None,
        }
        .ok_or_else(|| self.error("function name"))?;
        self.advance();
        if !self.check(&TokenKind::LeftParen) {
            if name.allows_bare() {
                return Ok(self.tree.push(MySqlFunction {
                    name,
                    parentheses: false,
                    arguments: Vec::new(),
                }));
            }
            return Err(self.error("'('"));
        }
        let arguments = self.argument_list()?;
        Ok(self.tree.push(MySqlFunction {
            name,
            parentheses: true,
            arguments,
        }))
    }

    /// `( [value_expression {, value_expression}] )`
    fn argument_list(&mut self) -> Result<Vec<NodeId>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            arguments.push(self.value_expression()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                arguments.push(self.value_expression()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(arguments)
    }

    /// `CURRENT_USER ( )`
    pub fn current_user_function(&mut self) -> Result<NodeId, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) if name.eq_ignore_ascii_case("CURRENT_USER") => {
                self.advance();
            }
            _ => return Err(self.error("CURRENT_USER")),
        }
        self.expect(&TokenKind::LeftParen)?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(CurrentUserFunction))
    }

    /// `UNNEST ( column_reference )`
    pub fn array_function_specification(&mut self) -> Result<NodeId, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(name) if name.eq_ignore_ascii_case("UNNEST") => {
                self.advance();
            }
            _ => return Err(self.error("UNNEST")),
        }
        self.expect(&TokenKind::LeftParen)?;
        let column = self.column_reference()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(self.tree.push(ArrayFunctionSpecification { column }))
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    /// A numeric, string, boolean or interval literal.
    pub fn unsigned_literal(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current().span;
        let inner = match &self.current().kind {
            TokenKind::ExactNumeric(text) => {
                let literal = ExactNumericLiteral::new(text).map_err(|e| construction(&e, span))?;
                self.advance();
                self.tree.push(literal)
            }
            TokenKind::ApproximateNumeric(text) => {
                let literal =
                    ApproximateNumericLiteral::new(text).map_err(|e| construction(&e, span))?;
                self.advance();
                self.tree.push(literal)
            }
            TokenKind::String(_) | TokenKind::Keyword(Keyword::Interval) => {
                self.general_literal()?
            }
            TokenKind::Keyword(keyword @ (Keyword::True | Keyword::False)) => {
                let value = *keyword == Keyword::True;
                self.advance();
                self.tree.push(BooleanLiteral { value })
            }
            _ => return Err(self.error("literal")),
        };
        Ok(self.tree.push(UnsignedLiteral { inner }))
    }

    /// A string or interval literal.
    pub fn general_literal(&mut self) -> Result<NodeId, ParseError> {
        let inner = if self.check_keyword(Keyword::Interval) {
            self.interval_literal()?
        } else {
            self.character_string_literal()?
        };
        Ok(self.tree.push(GeneralLiteral { inner }))
    }

    /// A single-quoted string.
    pub fn character_string_literal(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current().span;
        let TokenKind::String(value) = &self.current().kind else {
            return Err(self.error("string literal"));
        };
        let literal =
            CharacterStringLiteral::new(value.as_str()).map_err(|e| construction(&e, span))?;
        self.advance();
        Ok(self.tree.push(literal))
    }

    /// `INTERVAL signed_literal unit`
    pub fn interval_literal(&mut self) -> Result<NodeId, ParseError> {
        self.expect_keyword(Keyword::Interval)?;
        let value = self.signed_literal()?;
        let unit = match &self.current().kind {
            TokenKind::Identifier(name) => IntervalUnit::from_str(name),
            _ => None,
        }
        .ok_or_else(|| self.error("interval unit"))?;
        self.advance();
        Ok(self.tree.push(IntervalLiteral { value, unit }))
    }

    /// `[+|-] numeric_literal` or a general literal.
    pub fn signed_literal(&mut self) -> Result<NodeId, ParseError> {
        let span = self.current().span;
        let sign = self.sign();
        let (numeric, general) = match &self.current().kind {
            TokenKind::ExactNumeric(text) => {
                let literal = ExactNumericLiteral::new(text).map_err(|e| construction(&e, span))?;
                self.advance();
                (Some(self.tree.push(literal)), None)
            }
            TokenKind::ApproximateNumeric(text) => {
                let literal =
                    ApproximateNumericLiteral::new(text).map_err(|e| construction(&e, span))?;
                self.advance();
                (Some(self.tree.push(literal)), None)
            }
            _ => (None, Some(self.general_literal()?)),
        };
        let literal = SignedLiteral::new(sign, numeric, general).map_err(|e| construction(&e, span))?;
        Ok(self.tree.push(literal))
    }

    // ------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------

    /// A bare, double-quoted or backticked identifier. Entity ids are
    /// accepted as bare identifiers here.
    pub fn actual_identifier(&mut self) -> Result<NodeId, ParseError> {
        let element: Element = match &self.current().kind {
            TokenKind::Identifier(name) | TokenKind::EntityId(name) => {
                RegularIdentifier::new(name.as_str()).into()
            }
            TokenKind::DoubleQuoted(value) => {
                DelimitedIdentifier::new(value.as_str(), QuoteStyle::DoubleQuote).into()
            }
            TokenKind::Backticked(value) => {
                DelimitedIdentifier::new(value.as_str(), QuoteStyle::Backtick).into()
            }
            _ => return Err(self.error("identifier")),
        };
        self.advance();
        let inner = self.tree.push(element);
        Ok(self.tree.push(ActualIdentifier { inner }))
    }

    pub fn column_name(&mut self) -> Result<NodeId, ParseError> {
        let identifier = self.actual_identifier()?;
        Ok(self.tree.push(ColumnName { identifier }))
    }

    /// `column_name [. column_name]`
    pub fn column_reference(&mut self) -> Result<NodeId, ParseError> {
        let first = self.column_name()?;
        if self.check(&TokenKind::Dot) {
            self.advance();
            let name = self.column_name()?;
            return Ok(self.tree.push(ColumnReference {
                qualifier: Some(first),
                name,
            }));
        }
        Ok(self.tree.push(ColumnReference {
            qualifier: None,
            name: first,
        }))
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        self.pos
            .checked_sub(1)
            .and_then(|pos| self.tokens.get(pos))
            .unwrap_or(&self.eof)
    }

    fn peek_is(&self, offset: usize, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.pos + offset)
            .is_some_and(|token| &token.kind == kind)
    }

    fn peek_keyword(&self, offset: usize, keyword: Keyword) -> bool {
        self.peek_is(offset, &TokenKind::Keyword(keyword))
    }

    fn advance(&mut self) {
        if !self.current().is_eof() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().as_keyword() == Some(keyword)
    }

    fn check_identifier(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Identifier(_) | TokenKind::DoubleQuoted(_) | TokenKind::Backticked(_)
        )
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(kind.describe()))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(keyword.as_str()))
        }
    }

    fn error(&self, expected: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::unexpected(expected, token.kind.clone(), token.span)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            len: self.tree.checkpoint(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        trace!(from = self.pos, to = checkpoint.pos, "backtracking");
        self.pos = checkpoint.pos;
        self.tree.truncate(checkpoint.len);
    }
}

/// Splits `syn<id>[.<version>]`; the lexer has already checked the shape.
fn parse_entity_id(text: &str, span: Span) -> Result<EntityId, ParseError> {
    let out_of_range = || ParseError::new(format!("Invalid entity id: {text}"), span);
    let digits = text.get(3..).ok_or_else(out_of_range)?;
    let (id, version) = match digits.split_once('.') {
        Some((id, version)) => (id, Some(version)),
        None => (digits, None),
    };
    let number = |s: &str| s.parse::<u64>().map_err(|_| out_of_range());
    Ok(EntityId {
        id: number(id)?,
        version: version.map(number).transpose()?,
    })
}

/// Reports a node that failed its own construction checks as a parse error.
fn construction(err: &QueryError, span: Span) -> ParseError {
    ParseError::new(err.to_string(), span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(sql: &str) -> String {
        Parser::parse_query(sql).unwrap().to_sql()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(render("select * from syn123"), "SELECT * FROM syn123");
    }

    #[test]
    fn test_entity_id_forms() {
        assert_eq!(render("select * from SyN123"), "SELECT * FROM syn123");
        assert_eq!(render("select * from syn123.456"), "SELECT * FROM syn123.456");
        assert_eq!(render("select * from syn123."), "SELECT * FROM syn123");
        assert!(Parser::parse_query("select * from syn123.456.").is_err());
        assert!(Parser::parse_query("select * from syn123.456.789").is_err());
        assert!(Parser::parse_query("select * from syn99999999999999999999999").is_err());
    }

    #[test]
    fn test_backtracking_leaves_no_garbage() {
        let fragment = Parser::parse_query("select * from syn1 where (a+1) > 2").unwrap();
        assert_eq!(fragment.to_sql(), "SELECT * FROM syn1 WHERE (a+1) > 2");
        let tree = fragment.tree();
        for index in 0..tree.len() {
            let reachable = tree.descendants(fragment.root()).len();
            assert!(index < reachable, "node #{index} is unreachable");
        }
    }

    #[test]
    fn test_parse_with_requires_end_of_input() {
        assert!(Parser::parse_with("foo bar", Parser::value_expression).is_err());
        let fragment = Parser::parse_with("foo", Parser::value_expression).unwrap();
        assert_eq!(fragment.to_sql(), "foo");
    }

    #[test]
    fn test_lexer_errors_become_token_errors() {
        let err = Parser::parse_query("select * from syn1 where a = #").unwrap_err();
        assert!(matches!(err, QueryError::Token(_)));
    }
}
