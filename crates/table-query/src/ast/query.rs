//! Query level nodes: WITH, UNION, SELECT and the select list.

use super::element::{Element, NodeKind, SqlElement, SqlWriter};
use super::table::TableExpression;
use super::tree::{NodeId, Tree};
use super::value::{SetFunctionSpecification, SetQuantifier};
use crate::error::{QueryError, Result};

/// `[WITH cte {, cte}] body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpression {
    /// [`WithListElement`] nodes.
    pub with: Vec<NodeId>,
    /// A [`NonJoinQueryExpression`].
    pub body: NodeId,
}

impl QueryExpression {
    /// The query specification, when the body is a single SELECT without
    /// UNION or parentheses.
    #[must_use]
    pub fn single_specification(&self, tree: &Tree) -> Option<NodeId> {
        let body = tree.node::<NonJoinQueryExpression>(self.body)?;
        if body.union.is_some() {
            return None;
        }
        let primary = tree.node::<QueryPrimary>(body.term)?;
        (tree.kind(primary.inner) == Some(NodeKind::QuerySpecification)).then_some(primary.inner)
    }
}

impl SqlElement for QueryExpression {
    fn children(&self) -> Vec<NodeId> {
        let mut children = self.with.clone();
        children.push(self.body);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots: Vec<&mut NodeId> = self.with.iter_mut().collect();
        slots.push(&mut self.body);
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if !self.with.is_empty() {
            w.text("WITH ");
            w.join(self.with.iter().copied(), ", ");
            w.char(' ');
        }
        w.node(self.body);
    }
}

/// `name [(column {, column})] AS (query)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithListElement {
    /// An [`ActualIdentifier`](super::ActualIdentifier).
    pub name: NodeId,
    /// [`ColumnName`](super::ColumnName) nodes.
    pub columns: Vec<NodeId>,
    /// A [`QueryExpression`].
    pub query: NodeId,
}

impl SqlElement for WithListElement {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.name];
        children.extend(self.columns.iter().copied());
        children.push(self.query);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.name];
        slots.extend(self.columns.iter_mut());
        slots.push(&mut self.query);
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.name);
        if !self.columns.is_empty() {
            w.text(" (");
            w.join(self.columns.iter().copied(), ", ");
            w.char(')');
        }
        w.text(" AS (");
        w.node(self.query);
        w.char(')');
    }
}

/// The left operand of a UNION.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnionLeft {
    /// A [`NonJoinQueryExpression`].
    pub left: NodeId,
    pub quantifier: Option<SetQuantifier>,
}

/// `primary` or `left UNION [ALL|DISTINCT] primary`, left associative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonJoinQueryExpression {
    pub union: Option<UnionLeft>,
    /// A [`QueryPrimary`].
    pub term: NodeId,
}

impl SqlElement for NonJoinQueryExpression {
    fn children(&self) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self.union.iter().map(|union| union.left).collect();
        children.push(self.term);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots: Vec<&mut NodeId> = self.union.iter_mut().map(|union| &mut union.left).collect();
        slots.push(&mut self.term);
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if let Some(union) = self.union {
            w.node(union.left);
            w.text(" UNION ");
            if let Some(quantifier) = union.quantifier {
                w.text(quantifier.as_str());
                w.char(' ');
            }
        }
        w.node(self.term);
    }
}

/// A query specification, or a parenthesised query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPrimary {
    pub inner: NodeId,
}

impl SqlElement for QueryPrimary {
    fn children(&self) -> Vec<NodeId> {
        vec![self.inner]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.inner]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if w.tree().kind(self.inner) == Some(NodeKind::NonJoinQueryExpression) {
            w.char('(');
            w.node(self.inner);
            w.char(')');
        } else {
            w.node(self.inner);
        }
    }
}

/// `SELECT [DISTINCT|ALL] select_list table_expression`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpecification {
    pub quantifier: Option<SetQuantifier>,
    /// A [`SelectList`].
    pub select_list: NodeId,
    /// A [`TableExpression`].
    pub table_expression: NodeId,
}

impl QuerySpecification {
    /// True for `SELECT DISTINCT`.
    #[must_use]
    pub fn is_distinct(&self) -> bool {
        self.quantifier == Some(SetQuantifier::Distinct)
    }

    /// True if the table expression has a GROUP BY clause.
    #[must_use]
    pub fn has_group_by(&self, tree: &Tree) -> bool {
        tree.node::<TableExpression>(self.table_expression)
            .is_some_and(|table| table.group_by.is_some())
    }

    /// True if the select list calls any set function.
    #[must_use]
    pub fn has_any_aggregate_elements(&self, tree: &Tree) -> bool {
        tree.first_element_of_type::<SetFunctionSpecification>(self.select_list)
            .is_some()
    }

    /// True for DISTINCT, GROUP BY, or a set function in the select list.
    #[must_use]
    pub fn is_aggregate(&self, tree: &Tree) -> bool {
        self.is_distinct() || self.has_group_by(tree) || self.has_any_aggregate_elements(tree)
    }
}

impl SqlElement for QuerySpecification {
    fn children(&self) -> Vec<NodeId> {
        vec![self.select_list, self.table_expression]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.select_list, &mut self.table_expression]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("SELECT ");
        if let Some(quantifier) = self.quantifier {
            w.text(quantifier.as_str());
            w.char(' ');
        }
        w.node(self.select_list);
        w.char(' ');
        w.node(self.table_expression);
    }
}

/// `*` or a list of derived columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectList {
    pub asterisk: bool,
    /// [`DerivedColumn`] nodes.
    pub columns: Vec<NodeId>,
}

impl SqlElement for SelectList {
    fn children(&self) -> Vec<NodeId> {
        self.columns.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.columns.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if self.asterisk {
            w.char('*');
        } else {
            w.join(self.columns.iter().copied(), ", ");
        }
    }
}

/// `value [AS name]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumn {
    /// A [`ValueExpression`](super::ValueExpression).
    pub value: NodeId,
    /// An [`AsClause`].
    pub alias: Option<NodeId>,
}

impl DerivedColumn {
    /// The alias without quotes, if the column has one.
    #[must_use]
    pub fn alias_name(&self, tree: &Tree) -> Option<String> {
        let alias = tree.node::<AsClause>(self.alias?)?;
        Some(tree.to_sql_without_quotes(alias.name))
    }

    /// The name a result column is displayed under: the alias, or else the
    /// value rendered without quotes.
    #[must_use]
    pub fn display_name(&self, tree: &Tree) -> String {
        self.alias_name(tree)
            .unwrap_or_else(|| tree.to_sql_without_quotes(self.value))
    }
}

impl SqlElement for DerivedColumn {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.value];
        children.extend(self.alias);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.value];
        slots.extend(self.alias.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.value);
        if let Some(alias) = self.alias {
            w.char(' ');
            w.node(alias);
        }
    }
}

/// `AS name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsClause {
    /// A [`ColumnName`](super::ColumnName).
    pub name: NodeId,
}

impl SqlElement for AsClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.name]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.name]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("AS ");
        w.node(self.name);
    }
}

impl Tree {
    /// Swaps the select list of the query specification `query`.
    ///
    /// # Errors
    ///
    /// Fails like [`Tree::replace_element`], or with
    /// [`QueryError::Construction`] if `query` is not a query specification.
    pub fn replace_select_list(&mut self, query: NodeId, select_list: NodeId) -> Result<()> {
        let old = match self.get(query) {
            Some(Element::QuerySpecification(spec)) => spec.select_list,
            _ => {
                return Err(QueryError::construction(format!(
                    "{query} is not a QuerySpecification"
                )))
            }
        };
        self.replace_element(old, select_list)
    }
}
