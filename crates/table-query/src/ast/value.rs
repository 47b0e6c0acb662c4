//! Value expressions: arithmetic, function calls, CASE and CAST.

use super::element::{SqlElement, SqlWriter};
use super::literal::Sign;
use super::tree::NodeId;
use crate::column_type::ColumnType;

/// The root of every value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueExpression {
    /// A [`NumericValueExpression`].
    pub expression: NodeId,
}

impl SqlElement for ValueExpression {
    fn children(&self) -> Vec<NodeId> {
        vec![self.expression]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.expression]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.expression);
    }
}

/// `+` or `-` between terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdditiveOperator {
    Add,
    Subtract,
}

impl AdditiveOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
        }
    }
}

/// `*`, `/`, `%` or `DIV` between factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiplicativeOperator {
    Multiply,
    Divide,
    Modulo,
    /// Integer division.
    IntegerDivide,
}

impl MultiplicativeOperator {
    /// The operator as rendered between two factors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::IntegerDivide => " DIV ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermOperation {
    pub operator: AdditiveOperator,
    pub term: NodeId,
}

/// `term {(+|-) term}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericValueExpression {
    pub first: NodeId,
    pub rest: Vec<TermOperation>,
}

impl SqlElement for NumericValueExpression {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.first];
        children.extend(self.rest.iter().map(|op| op.term));
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.first];
        slots.extend(self.rest.iter_mut().map(|op| &mut op.term));
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.first);
        for op in &self.rest {
            w.text(op.operator.as_str());
            w.node(op.term);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorOperation {
    pub operator: MultiplicativeOperator,
    pub factor: NodeId,
}

/// `factor {(*|/|%|DIV) factor}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub first: NodeId,
    pub rest: Vec<FactorOperation>,
}

impl SqlElement for Term {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.first];
        children.extend(self.rest.iter().map(|op| op.factor));
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.first];
        slots.extend(self.rest.iter_mut().map(|op| &mut op.factor));
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.first);
        for op in &self.rest {
            w.text(op.operator.as_str());
            w.node(op.factor);
        }
    }
}

/// `[+|-] primary`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    pub sign: Option<Sign>,
    /// A [`ValueExpressionPrimary`].
    pub primary: NodeId,
}

impl SqlElement for Factor {
    fn children(&self) -> Vec<NodeId> {
        vec![self.primary]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.primary]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if let Some(sign) = self.sign {
            w.text(sign.as_str());
        }
        w.node(self.primary);
    }
}

/// One of the primary value forms (literal, column, function call, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueExpressionPrimary {
    pub inner: NodeId,
}

impl SqlElement for ValueExpressionPrimary {
    fn children(&self) -> Vec<NodeId> {
        vec![self.inner]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.inner]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.inner);
    }
}

/// `( value_expression )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenthesizedExpression {
    pub expression: NodeId,
}

impl SqlElement for ParenthesizedExpression {
    fn children(&self) -> Vec<NodeId> {
        vec![self.expression]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.expression]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.char('(');
        w.node(self.expression);
        w.char(')');
    }
}

/// `DISTINCT` or `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetQuantifier {
    Distinct,
    All,
}

impl SetQuantifier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
        }
    }
}

/// The aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetFunctionType {
    Count,
    Max,
    Min,
    Sum,
    Avg,
    GroupConcat,
    JsonArrayAgg,
}

impl SetFunctionType {
    const ALL: [Self; 7] = [
        Self::Count,
        Self::Max,
        Self::Min,
        Self::Sum,
        Self::Avg,
        Self::GroupConcat,
        Self::JsonArrayAgg,
    ];

    /// Looks up an aggregate by name (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str().eq_ignore_ascii_case(s))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::GroupConcat => "GROUP_CONCAT",
            Self::JsonArrayAgg => "JSON_ARRAYAGG",
        }
    }
}

/// An aggregate call such as `COUNT(*)` or
/// `GROUP_CONCAT(DISTINCT a ORDER BY a SEPARATOR '#')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFunctionSpecification {
    pub function: SetFunctionType,
    pub quantifier: Option<SetQuantifier>,
    /// `COUNT(*)`
    pub asterisk: bool,
    /// [`ValueExpression`] arguments.
    pub arguments: Vec<NodeId>,
    /// An [`OrderByClause`](super::OrderByClause), `GROUP_CONCAT` only.
    pub order_by: Option<NodeId>,
    /// A [`CharacterStringLiteral`](super::CharacterStringLiteral),
    /// `GROUP_CONCAT` only.
    pub separator: Option<NodeId>,
}

impl SqlElement for SetFunctionSpecification {
    fn children(&self) -> Vec<NodeId> {
        let mut children = self.arguments.clone();
        children.extend(self.order_by);
        children.extend(self.separator);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots: Vec<&mut NodeId> = self.arguments.iter_mut().collect();
        slots.extend(self.order_by.iter_mut());
        slots.extend(self.separator.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(self.function.as_str());
        w.char('(');
        if self.asterisk {
            w.char('*');
        } else {
            if let Some(quantifier) = self.quantifier {
                w.text(quantifier.as_str());
                w.char(' ');
            }
            w.join(self.arguments.iter().copied(), ", ");
        }
        if let Some(order_by) = self.order_by {
            w.char(' ');
            w.node(order_by);
        }
        if let Some(separator) = self.separator {
            w.text(" SEPARATOR ");
            w.node(separator);
        }
        w.char(')');
    }
}

/// `CASE operand WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCase {
    pub operand: NodeId,
    /// [`SimpleWhenClause`] nodes.
    pub whens: Vec<NodeId>,
    /// An [`ElseClause`].
    pub else_clause: Option<NodeId>,
}

impl SqlElement for SimpleCase {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.operand];
        children.extend(self.whens.iter().copied());
        children.extend(self.else_clause);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.operand];
        slots.extend(self.whens.iter_mut());
        slots.extend(self.else_clause.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("CASE ");
        w.node(self.operand);
        for when in &self.whens {
            w.char(' ');
            w.node(*when);
        }
        if let Some(else_clause) = self.else_clause {
            w.char(' ');
            w.node(else_clause);
        }
        w.text(" END");
    }
}

/// `CASE WHEN condition THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchedCase {
    /// [`SearchedWhenClause`] nodes.
    pub whens: Vec<NodeId>,
    pub else_clause: Option<NodeId>,
}

impl SqlElement for SearchedCase {
    fn children(&self) -> Vec<NodeId> {
        let mut children = self.whens.clone();
        children.extend(self.else_clause);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots: Vec<&mut NodeId> = self.whens.iter_mut().collect();
        slots.extend(self.else_clause.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("CASE");
        for when in &self.whens {
            w.char(' ');
            w.node(*when);
        }
        if let Some(else_clause) = self.else_clause {
            w.char(' ');
            w.node(else_clause);
        }
        w.text(" END");
    }
}

/// `WHEN value THEN result`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleWhenClause {
    pub operand: NodeId,
    pub result: NodeId,
}

impl SqlElement for SimpleWhenClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.operand, self.result]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.operand, &mut self.result]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("WHEN ");
        w.node(self.operand);
        w.text(" THEN ");
        w.node(self.result);
    }
}

/// `WHEN search_condition THEN result`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchedWhenClause {
    pub condition: NodeId,
    pub result: NodeId,
}

impl SqlElement for SearchedWhenClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.condition, self.result]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.condition, &mut self.result]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("WHEN ");
        w.node(self.condition);
        w.text(" THEN ");
        w.node(self.result);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseClause {
    pub result: NodeId,
}

impl SqlElement for ElseClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.result]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.result]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("ELSE ");
        w.node(self.result);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseAbbreviationKind {
    NullIf,
    Coalesce,
}

impl CaseAbbreviationKind {
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("NULLIF") {
            Some(Self::NullIf)
        } else if s.eq_ignore_ascii_case("COALESCE") {
            Some(Self::Coalesce)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NullIf => "NULLIF",
            Self::Coalesce => "COALESCE",
        }
    }
}

/// `NULLIF(a,b)` or `COALESCE(a,...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseAbbreviation {
    pub kind: CaseAbbreviationKind,
    pub arguments: Vec<NodeId>,
}

impl SqlElement for CaseAbbreviation {
    fn children(&self) -> Vec<NodeId> {
        self.arguments.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.arguments.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(self.kind.as_str());
        w.char('(');
        w.join(self.arguments.iter().copied(), ",");
        w.char(')');
    }
}

/// MySQL cast types accepted besides the column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MySqlCastType {
    Char,
    Signed,
    Unsigned,
    Decimal,
    DateTime,
    Time,
    Binary,
}

impl MySqlCastType {
    const ALL: [Self; 7] = [
        Self::Char,
        Self::Signed,
        Self::Unsigned,
        Self::Decimal,
        Self::DateTime,
        Self::Time,
        Self::Binary,
    ];

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Char => "CHAR",
            Self::Signed => "SIGNED",
            Self::Unsigned => "UNSIGNED",
            Self::Decimal => "DECIMAL",
            Self::DateTime => "DATETIME",
            Self::Time => "TIME",
            Self::Binary => "BINARY",
        }
    }
}

/// What a CAST converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    Column(ColumnType),
    Sql(MySqlCastType),
    /// Takes the type of the column with this id.
    ColumnId(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastTarget {
    pub cast_type: CastType,
}

impl SqlElement for CastTarget {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        match self.cast_type {
            CastType::Column(column_type) => w.text(column_type.as_str()),
            CastType::Sql(sql_type) => w.text(sql_type.as_str()),
            CastType::ColumnId(id) => w.text(&id.to_string()),
        }
    }
}

/// `CAST(value AS target)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastSpecification {
    pub operand: NodeId,
    /// A [`CastTarget`].
    pub target: NodeId,
}

impl SqlElement for CastSpecification {
    fn children(&self) -> Vec<NodeId> {
        vec![self.operand, self.target]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.operand, &mut self.target]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("CAST(");
        w.node(self.operand);
        w.text(" AS ");
        w.node(self.target);
        w.char(')');
    }
}

/// Scalar MySQL functions the dialect passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MySqlFunctionName {
    CurrentTimestamp,
    CurrentDate,
    CurrentTime,
    Now,
    UnixTimestamp,
    FromUnixtime,
    Date,
    DateFormat,
    DayOfMonth,
    DayOfWeek,
    DayOfYear,
    Week,
    Month,
    Quarter,
    Year,
    Hour,
    Minute,
    Second,
    Microsecond,
    Concat,
    Replace,
    Upper,
    Lower,
    Trim,
    Round,
    IfNull,
    JsonExtract,
    JsonUnquote,
    JsonObject,
    JsonArray,
    JsonOverlaps,
}

impl MySqlFunctionName {
    const ALL: [Self; 31] = [
        Self::CurrentTimestamp,
        Self::CurrentDate,
        Self::CurrentTime,
        Self::Now,
        Self::UnixTimestamp,
        Self::FromUnixtime,
        Self::Date,
        Self::DateFormat,
        Self::DayOfMonth,
        Self::DayOfWeek,
        Self::DayOfYear,
        Self::Week,
        Self::Month,
        Self::Quarter,
        Self::Year,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Microsecond,
        Self::Concat,
        Self::Replace,
        Self::Upper,
        Self::Lower,
        Self::Trim,
        Self::Round,
        Self::IfNull,
        Self::JsonExtract,
        Self::JsonUnquote,
        Self::JsonObject,
        Self::JsonArray,
        Self::JsonOverlaps,
    ];

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str().eq_ignore_ascii_case(s))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::CurrentDate => "CURRENT_DATE",
            Self::CurrentTime => "CURRENT_TIME",
            Self::Now => "NOW",
            Self::UnixTimestamp => "UNIX_TIMESTAMP",
            Self::FromUnixtime => "FROM_UNIXTIME",
            Self::Date => "DATE",
            Self::DateFormat => "DATE_FORMAT",
            Self::DayOfMonth => "DAYOFMONTH",
            Self::DayOfWeek => "DAYOFWEEK",
            Self::DayOfYear => "DAYOFYEAR",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Quarter => "QUARTER",
            Self::Year => "YEAR",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::Microsecond => "MICROSECOND",
            Self::Concat => "CONCAT",
            Self::Replace => "REPLACE",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::Trim => "TRIM",
            Self::Round => "ROUND",
            Self::IfNull => "IFNULL",
            Self::JsonExtract => "JSON_EXTRACT",
            Self::JsonUnquote => "JSON_UNQUOTE",
            Self::JsonObject => "JSON_OBJECT",
            Self::JsonArray => "JSON_ARRAY",
            Self::JsonOverlaps => "JSON_OVERLAPS",
        }
    }

    /// Functions that may be written without parentheses.
    #[must_use]
    pub const fn allows_bare(self) -> bool {
        matches!(
            self,
            Self::CurrentTimestamp | Self::CurrentDate | Self::CurrentTime
        )
    }
}

/// A scalar MySQL function call, e.g. `FROM_UNIXTIME(a,'%Y')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlFunction {
    pub name: MySqlFunctionName,
    /// False for the bare form of `CURRENT_TIMESTAMP` and friends.
    pub parentheses: bool,
    /// [`ValueExpression`] arguments.
    pub arguments: Vec<NodeId>,
}

impl SqlElement for MySqlFunction {
    fn children(&self) -> Vec<NodeId> {
        self.arguments.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.arguments.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(self.name.as_str());
        if self.parentheses {
            w.char('(');
            w.join(self.arguments.iter().copied(), ",");
            w.char(')');
        }
    }
}

/// `CURRENT_USER()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUserFunction;

impl SqlElement for CurrentUserFunction {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("CURRENT_USER()");
    }
}

/// `UNNEST(column)`, expands a list column into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayFunctionSpecification {
    /// A [`ColumnReference`](super::ColumnReference).
    pub column: NodeId,
}

impl SqlElement for ArrayFunctionSpecification {
    fn children(&self) -> Vec<NodeId> {
        vec![self.column]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.column]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("UNNEST(");
        w.node(self.column);
        w.char(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name_lookup() {
        assert_eq!(SetFunctionType::from_str("group_concat"), Some(SetFunctionType::GroupConcat));
        assert_eq!(SetFunctionType::from_str("median"), None);
        assert_eq!(MySqlFunctionName::from_str("from_unixtime"), Some(MySqlFunctionName::FromUnixtime));
        assert!(MySqlFunctionName::CurrentDate.allows_bare());
        assert!(!MySqlFunctionName::Now.allows_bare());
        assert_eq!(CaseAbbreviationKind::from_str("Coalesce"), Some(CaseAbbreviationKind::Coalesce));
        assert_eq!(MySqlCastType::from_str("datetime"), Some(MySqlCastType::DateTime));
    }
}
