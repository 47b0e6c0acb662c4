//! The boolean precedence chain: OR, AND, NOT, IS, primary.

use super::element::{NodeKind, SqlElement, SqlWriter};
use super::tree::NodeId;

/// `TRUE`, `FALSE` or `UNKNOWN` after `IS [NOT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

impl TruthValue {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// `IS [NOT] <truth value>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TruthCheck {
    pub not: bool,
    pub value: TruthValue,
}

impl TruthCheck {
    pub(crate) fn write_sql(self, w: &mut SqlWriter<'_>) {
        w.text(if self.not { " IS NOT " } else { " IS " });
        w.text(self.value.as_str());
    }
}

/// `term {OR term}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCondition {
    /// [`BooleanTerm`] nodes.
    pub terms: Vec<NodeId>,
}

impl SqlElement for SearchCondition {
    fn children(&self) -> Vec<NodeId> {
        self.terms.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.terms.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.join(self.terms.iter().copied(), " OR ");
    }
}

/// `factor {AND factor}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanTerm {
    /// [`BooleanFactor`] nodes.
    pub factors: Vec<NodeId>,
}

impl SqlElement for BooleanTerm {
    fn children(&self) -> Vec<NodeId> {
        self.factors.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.factors.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.join(self.factors.iter().copied(), " AND ");
    }
}

/// `[NOT] test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanFactor {
    pub not: bool,
    pub test: NodeId,
}

impl SqlElement for BooleanFactor {
    fn children(&self) -> Vec<NodeId> {
        vec![self.test]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.test]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if self.not {
            w.text("NOT ");
        }
        w.node(self.test);
    }
}

/// `primary [IS [NOT] truth_value]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanTest {
    pub primary: NodeId,
    pub truth: Option<TruthCheck>,
}

impl SqlElement for BooleanTest {
    fn children(&self) -> Vec<NodeId> {
        vec![self.primary]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.primary]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.primary);
        if let Some(truth) = self.truth {
            truth.write_sql(w);
        }
    }
}

/// A predicate, or a parenthesised search condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanPrimary {
    pub inner: NodeId,
}

impl SqlElement for BooleanPrimary {
    fn children(&self) -> Vec<NodeId> {
        vec![self.inner]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.inner]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if w.tree().kind(self.inner) == Some(NodeKind::SearchCondition) {
            w.text("( ");
            w.node(self.inner);
            w.text(" )");
        } else {
            w.node(self.inner);
        }
    }
}
