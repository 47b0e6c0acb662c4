//! FROM, WHERE, GROUP BY, ORDER BY and LIMIT.

use std::fmt;

use super::element::{Element, NodeKind, SqlElement, SqlWriter};
use super::tree::{NodeId, Tree};
use crate::error::Result;

/// `from [where] [group by] [order by] [pagination]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExpression {
    /// A [`FromClause`].
    pub from: NodeId,
    /// A [`DefiningClause`].
    pub defining_clause: Option<NodeId>,
    /// A [`WhereClause`].
    pub where_clause: Option<NodeId>,
    /// A [`GroupByClause`].
    pub group_by: Option<NodeId>,
    /// An [`OrderByClause`].
    pub order_by: Option<NodeId>,
    /// A [`Pagination`].
    pub pagination: Option<NodeId>,
}

impl TableExpression {
    /// The first table named in the FROM clause.
    #[must_use]
    pub fn table_name(&self, tree: &Tree) -> Option<String> {
        tree.first_element_of_type::<TableName>(self.from)
            .map(|name| tree.to_sql_without_quotes(name))
    }
}

impl SqlElement for TableExpression {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.from];
        children.extend(self.defining_clause);
        children.extend(self.where_clause);
        children.extend(self.group_by);
        children.extend(self.order_by);
        children.extend(self.pagination);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.from];
        slots.extend(self.defining_clause.iter_mut());
        slots.extend(self.where_clause.iter_mut());
        slots.extend(self.group_by.iter_mut());
        slots.extend(self.order_by.iter_mut());
        slots.extend(self.pagination.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.from);
        for clause in [
            self.defining_clause,
            self.where_clause,
            self.group_by,
            self.order_by,
            self.pagination,
        ]
        .into_iter()
        .flatten()
        {
            w.char(' ');
            w.node(clause);
        }
    }
}

/// `FROM table_reference`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromClause {
    /// A [`TableReference`].
    pub reference: NodeId,
}

impl SqlElement for FromClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.reference]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.reference]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("FROM ");
        w.node(self.reference);
    }
}

/// A single table, or a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub inner: NodeId,
}

impl SqlElement for TableReference {
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
pub enum JoinType {
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
}

impl JoinType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::LeftOuter => "LEFT OUTER",
            Self::Right => "RIGHT",
            Self::RightOuter => "RIGHT OUTER",
        }
    }
}

/// `left [join type] JOIN right ON condition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedJoin {
    /// A [`TableReference`].
    pub left: NodeId,
    pub join_type: Option<JoinType>,
    /// A [`TableNameCorrelation`].
    pub right: NodeId,
    /// A [`JoinCondition`]. Absent for a cross join.
    pub condition: Option<NodeId>,
}

impl SqlElement for QualifiedJoin {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.left, self.right];
        children.extend(self.condition);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.left, &mut self.right];
        slots.extend(self.condition.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.left);
        w.char(' ');
        if let Some(join_type) = self.join_type {
            w.text(join_type.as_str());
            w.char(' ');
        }
        w.text("JOIN ");
        w.node(self.right);
        if let Some(condition) = self.condition {
            w.char(' ');
            w.node(condition);
        }
    }
}

/// `ON search_condition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub condition: NodeId,
}

impl SqlElement for JoinCondition {
    fn children(&self) -> Vec<NodeId> {
        vec![self.condition]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.condition]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("ON ");
        w.node(self.condition);
    }
}

/// `table_name [[AS] alias]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNameCorrelation {
    /// A [`TableName`].
    pub name: NodeId,
    /// A [`CorrelationSpecification`].
    pub correlation: Option<NodeId>,
}

impl SqlElement for TableNameCorrelation {
    fn children(&self) -> Vec<NodeId> {
        let mut children = vec![self.name];
        children.extend(self.correlation);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots = vec![&mut self.name];
        slots.extend(self.correlation.iter_mut());
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.name);
        if let Some(correlation) = self.correlation {
            w.char(' ');
            w.node(correlation);
        }
    }
}

/// An entity id or an identifier naming a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub inner: NodeId,
}

impl SqlElement for TableName {
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

/// `syn<id>[.<version>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub id: u64,
    pub version: Option<u64>,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syn{}", self.id)?;
        if let Some(version) = self.version {
            write!(f, ".{version}")?;
        }
        Ok(())
    }
}

impl SqlElement for EntityId {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(&self.to_string());
    }
}

/// `[AS] alias` after a table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationSpecification {
    pub with_as: bool,
    /// An [`ActualIdentifier`](super::ActualIdentifier).
    pub name: NodeId,
}

impl SqlElement for CorrelationSpecification {
    fn children(&self) -> Vec<NodeId> {
        vec![self.name]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.name]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if self.with_as {
            w.text("AS ");
        }
        w.node(self.name);
    }
}

/// `DEFINING_WHERE search_condition`
///
/// Filters the rows of a virtual table's defining query before the outer
/// WHERE applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefiningClause {
    /// A [`SearchCondition`](super::SearchCondition).
    pub condition: NodeId,
}

impl SqlElement for DefiningClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.condition]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.condition]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("DEFINING_WHERE ");
        w.node(self.condition);
    }
}

/// `WHERE search_condition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    /// A [`SearchCondition`](super::SearchCondition).
    pub condition: NodeId,
}

impl SqlElement for WhereClause {
    fn children(&self) -> Vec<NodeId> {
        vec![self.condition]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.condition]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("WHERE ");
        w.node(self.condition);
    }
}

/// `GROUP BY ref {, ref}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupByClause {
    /// [`GroupingColumnReference`] nodes.
    pub references: Vec<NodeId>,
}

impl SqlElement for GroupByClause {
    fn children(&self) -> Vec<NodeId> {
        self.references.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.references.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("GROUP BY ");
        w.join(self.references.iter().copied(), ", ");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingColumnReference {
    /// A [`ValueExpression`](super::ValueExpression).
    pub value: NodeId,
}

impl SqlElement for GroupingColumnReference {
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

/// `ORDER BY spec {, spec}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByClause {
    /// [`SortSpecification`] nodes.
    pub specifications: Vec<NodeId>,
}

impl SqlElement for OrderByClause {
    fn children(&self) -> Vec<NodeId> {
        self.specifications.clone()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        self.specifications.iter_mut().collect()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text("ORDER BY ");
        w.join(self.specifications.iter().copied(), ", ");
    }
}

/// `ASC` or `DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ordering {
    Asc,
    Desc,
}

impl Ordering {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `sort_key [ASC|DESC]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpecification {
    /// A [`SortKey`].
    pub key: NodeId,
    pub ordering: Option<Ordering>,
}

impl SqlElement for SortSpecification {
    fn children(&self) -> Vec<NodeId> {
        vec![self.key]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.key]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.key);
        if let Some(ordering) = self.ordering {
            w.char(' ');
            w.text(ordering.as_str());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// A [`ValueExpression`](super::ValueExpression).
    pub value: NodeId,
}

impl SqlElement for SortKey {
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

/// `LIMIT n [OFFSET m]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SqlElement for Pagination {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        let mut parts = Vec::with_capacity(2);
        if let Some(limit) = self.limit {
            parts.push(format!("LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            parts.push(format!("OFFSET {offset}"));
        }
        w.text(&parts.join(" "));
    }
}

macro_rules! optional_clause {
    ($(#[$doc:meta])* $name:ident, $field:ident, $kind:ident) => {
        $(#[$doc])*
        ///
        /// Returns the detached previous clause.
        ///
        /// # Errors
        ///
        /// Returns [`QueryError::Construction`](crate::QueryError::Construction)
        /// if `table` is not a table expression, or the new clause is unknown,
        /// attached, or of the wrong kind.
        pub fn $name(&mut self, table: NodeId, clause: Option<NodeId>) -> Result<Option<NodeId>> {
            self.replace_optional(table, NodeKind::$kind, clause, |element| match element {
                Element::TableExpression(expression) => Some(&mut expression.$field),
                _ => None,
            })
        }
    };
}

impl Tree {
    optional_clause!(
        /// Sets or removes the DEFINING_WHERE clause of `table`.
        replace_defining_clause,
        defining_clause,
        DefiningClause
    );
    optional_clause!(
        /// Sets or removes the WHERE clause of `table`.
        replace_where_clause,
        where_clause,
        WhereClause
    );
    optional_clause!(
        /// Sets or removes the GROUP BY clause of `table`.
        replace_group_by,
        group_by,
        GroupByClause
    );
    optional_clause!(
        /// Sets or removes the ORDER BY clause of `table`.
        replace_order_by,
        order_by,
        OrderByClause
    );
    optional_clause!(
        /// Sets or removes the LIMIT/OFFSET of `table`.
        replace_pagination,
        pagination,
        Pagination
    );
}
