//! Predicates and the left/right-hand-side contract they share.

use super::boolean::TruthCheck;
use super::element::{Element, SqlElement, SqlWriter};
use super::literal::UnsignedLiteral;
use super::tree::{NodeId, Tree};

/// The shape shared by every predicate: a left-hand side, the values it is
/// tested against, and optional `NOT` and `ESCAPE`.
pub trait HasPredicate {
    /// The tested expression.
    fn left_hand_side(&self) -> NodeId;

    /// The expressions on the right-hand side, in order.
    fn right_hand_side(&self) -> Vec<NodeId>;

    fn not(&self) -> bool {
        false
    }

    /// The [`EscapeCharacter`], for the LIKE family.
    fn escape(&self) -> Option<NodeId> {
        None
    }

    /// The literals on the right-hand side, escape character included.
    /// Right-hand-side expressions without a literal are skipped.
    fn right_hand_side_values(&self, tree: &Tree) -> Vec<NodeId> {
        self.right_hand_side()
            .into_iter()
            .chain(self.escape())
            .filter_map(|id| tree.first_element_of_type::<UnsignedLiteral>(id))
            .collect()
    }
}

/// Shared `NOT` and `ESCAPE` of `LIKE` and `HAS_LIKE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeModifiers {
    pub not: bool,
    /// An [`EscapeCharacter`].
    pub escape: Option<NodeId>,
}

impl LikeModifiers {
    fn write_not(self, w: &mut SqlWriter<'_>) {
        if self.not {
            w.text("NOT ");
        }
    }

    fn write_escape(self, w: &mut SqlWriter<'_>) {
        if let Some(escape) = self.escape {
            w.text(" ESCAPE ");
            w.node(escape);
        }
    }
}

/// Wrapper around one concrete predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub inner: NodeId,
}

impl Predicate {
    /// Views the wrapped predicate through [`HasPredicate`].
    #[must_use]
    pub fn contract<'t>(&self, tree: &'t Tree) -> Option<&'t dyn HasPredicate> {
        let contract: &dyn HasPredicate = match tree.get(self.inner)? {
            Element::ComparisonPredicate(p) => p,
            Element::BetweenPredicate(p) => p,
            Element::InPredicate(p) => p,
            Element::LikePredicate(p) => p,
            Element::NullPredicate(p) => p,
            Element::BooleanPredicate(p) => p,
            Element::ArrayHasPredicate(p) => p,
            Element::ArrayHasLikePredicate(p) => p,
            Element::TextMatchesPredicate(p) => p,
            Element::BooleanFunctionPredicate(p) => p,
            _ => return None,
        };
        Some(contract)
    }
}

impl SqlElement for Predicate {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// `lhs op rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPredicate {
    pub lhs: NodeId,
    pub op: ComparisonOperator,
    pub rhs: NodeId,
}

impl SqlElement for ComparisonPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs, self.rhs]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs, &mut self.rhs]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.char(' ');
        w.text(self.op.as_str());
        w.char(' ');
        w.node(self.rhs);
    }
}

impl HasPredicate for ComparisonPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.rhs]
    }
}

/// `lhs [NOT] BETWEEN low AND high`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetweenPredicate {
    pub lhs: NodeId,
    pub not: bool,
    pub low: NodeId,
    pub high: NodeId,
}

impl SqlElement for BetweenPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs, self.low, self.high]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs, &mut self.low, &mut self.high]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.text(if self.not { " NOT BETWEEN " } else { " BETWEEN " });
        w.node(self.low);
        w.text(" AND ");
        w.node(self.high);
    }
}

impl HasPredicate for BetweenPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.low, self.high]
    }

    fn not(&self) -> bool {
        self.not
    }
}

/// `( v1, v2, ... )` after `IN`, `HAS` or `HAS_LIKE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InValueList {
    /// [`ValueExpression`](super::ValueExpression) nodes.
    pub values: Vec<NodeId>,
}

impl SqlElement for InValueList {
    fn children(&self) -> Vec<NodeId> {
        self.values.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.values.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("( ");
        w.join(self.values.iter().copied(), ", ");
        w.text(" )");
    }
}

fn list_values(tree: &Tree, list: NodeId) -> Vec<NodeId> {
    tree.node::<InValueList>(list)
        .map(|list| list.values.clone())
        .unwrap_or_default()
}

/// `lhs [NOT] IN ( ... )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InPredicate {
    pub lhs: NodeId,
    pub not: bool,
    /// An [`InValueList`].
    pub values: NodeId,
}

impl InPredicate {
    /// The listed expressions.
    #[must_use]
    pub fn list(&self, tree: &Tree) -> Vec<NodeId> {
        list_values(tree, self.values)
    }
}

impl SqlElement for InPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs, self.values]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs, &mut self.values]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.text(if self.not { " NOT IN " } else { " IN " });
        w.node(self.values);
    }
}

impl HasPredicate for InPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.values]
    }

    fn not(&self) -> bool {
        self.not
    }

    fn right_hand_side_values(&self, tree: &Tree) -> Vec<NodeId> {
        self.list(tree)
            .into_iter()
            .filter_map(|id| tree.first_element_of_type::<UnsignedLiteral>(id))
            .collect()
    }
}

/// `ESCAPE <value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeCharacter {
    pub value: NodeId,
}

impl SqlElement for EscapeCharacter {
    fn children(&self) -> Vec<NodeId> {
        vec![self.value]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.value]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.value);
    }
}

/// `lhs [NOT] LIKE pattern [ESCAPE c]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePredicate {
    pub lhs: NodeId,
    pub modifiers: LikeModifiers,
    pub pattern: NodeId,
}

impl SqlElement for LikePredicate {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.lhs, self.pattern];
        children.extend(self.modifiers.escape);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.lhs, &mut self.pattern];
        slots.extend(self.modifiers.escape.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.char(' ');
        self.modifiers.write_not(w);
        w.text("LIKE ");
        w.node(self.pattern);
        self.modifiers.write_escape(w);
    }
}

impl HasPredicate for LikePredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.pattern]
    }

    fn not(&self) -> bool {
        self.modifiers.not
    }

    fn escape(&self) -> Option<NodeId> {
        self.modifiers.escape
    }
}

/// `lhs IS [NOT] NULL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullPredicate {
    pub lhs: NodeId,
    pub not: bool,
}

impl SqlElement for NullPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.text(if self.not { " IS NOT NULL" } else { " IS NULL" });
    }
}

impl HasPredicate for NullPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn not(&self) -> bool {
        self.not
    }
}

/// `lhs IS [NOT] TRUE|FALSE|UNKNOWN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanPredicate {
    pub lhs: NodeId,
    pub truth: TruthCheck,
}

impl SqlElement for BooleanPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        self.truth.write_sql(w);
    }
}

impl HasPredicate for BooleanPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn not(&self) -> bool {
        self.truth.not
    }
}

/// `lhs [NOT] HAS ( ... )`, true when a list column holds any listed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayHasPredicate {
    pub lhs: NodeId,
    pub not: bool,
    /// An [`InValueList`].
    pub values: NodeId,
}

impl SqlElement for ArrayHasPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs, self.values]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs, &mut self.values]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.text(if self.not { " NOT HAS " } else { " HAS " });
        w.node(self.values);
    }
}

impl HasPredicate for ArrayHasPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.values]
    }

    fn not(&self) -> bool {
        self.not
    }

    fn right_hand_side_values(&self, tree: &Tree) -> Vec<NodeId> {
        list_values(tree, self.values)
            .into_iter()
            .filter_map(|id| tree.first_element_of_type::<UnsignedLiteral>(id))
            .collect()
    }
}

/// `lhs [NOT] HAS_LIKE ( ... ) [ESCAPE c]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayHasLikePredicate {
    pub lhs: NodeId,
    pub modifiers: LikeModifiers,
    /// An [`InValueList`] of patterns.
    pub values: NodeId,
}

impl SqlElement for ArrayHasLikePredicate {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.lhs, self.values];
        children.extend(self.modifiers.escape);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.lhs, &mut self.values];
        slots.extend(self.modifiers.escape.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.lhs);
        w.char(' ');
        self.modifiers.write_not(w);
        w.text("HAS_LIKE ");
        w.node(self.values);
        self.modifiers.write_escape(w);
    }
}

impl HasPredicate for ArrayHasLikePredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.values]
    }

    fn not(&self) -> bool {
        self.modifiers.not
    }

    fn escape(&self) -> Option<NodeId> {
        self.modifiers.escape
    }

    fn right_hand_side_values(&self, tree: &Tree) -> Vec<NodeId> {
        list_values(tree, self.values)
            .into_iter()
            .chain(self.modifiers.escape)
            .filter_map(|id| tree.first_element_of_type::<UnsignedLiteral>(id))
            .collect()
    }
}

/// `TEXT_MATCHES('...')`. The left-hand side is the synthetic
/// `ROW_SEARCH_CONTENT` column, which is not rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatchesPredicate {
    /// A [`ColumnReference`](super::ColumnReference).
    pub lhs: NodeId,
    /// A [`CharacterStringLiteral`](super::CharacterStringLiteral).
    pub value: NodeId,
}

impl SqlElement for TextMatchesPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.lhs, self.value]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.lhs, &mut self.value]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("TEXT_MATCHES(");
        w.node(self.value);
        w.char(')');
    }
}

impl HasPredicate for TextMatchesPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.lhs
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        vec![self.value]
    }

    fn right_hand_side_values(&self, _tree: &Tree) -> Vec<NodeId> {
        vec![self.value]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanFunction {
    IsNan,
    IsInfinity,
}

impl BooleanFunction {
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ISNAN") {
            Some(Self::IsNan)
        } else if s.eq_ignore_ascii_case("ISINFINITY") {
            Some(Self::IsInfinity)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IsNan => "ISNAN",
            Self::IsInfinity => "ISINFINITY",
        }
    }
}

/// `ISNAN(column)` or `ISINFINITY(column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanFunctionPredicate {
    pub function: BooleanFunction,
    /// A [`ColumnReference`](super::ColumnReference).
    pub column: NodeId,
}

impl SqlElement for BooleanFunctionPredicate {
    fn children(&self) -> Vec<NodeId> {
        vec![self.column]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.column]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(self.function.as_str());
        w.char('(');
        w.node(self.column);
        w.char(')');
    }
}

impl HasPredicate for BooleanFunctionPredicate {
    fn left_hand_side(&self) -> NodeId {
        self.column
    }

    fn right_hand_side(&self) -> Vec<NodeId> {
        Vec::new()
    }
}
