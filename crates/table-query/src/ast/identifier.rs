//! Identifier nodes.

use super::element::{SqlElement, SqlWriter};
use super::tree::{NodeId, Tree};

/// A bare identifier, e.g. `foo` or `_bar1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularIdentifier {
    pub name: String,
}

impl RegularIdentifier {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SqlElement for RegularIdentifier {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.text(&self.name);
    }
}

/// The delimiter of a [`DelimitedIdentifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    /// `"name"`
    DoubleQuote,
    /// `` `name` ``
    Backtick,
}

impl QuoteStyle {
    /// The delimiter character.
    #[must_use]
    pub const fn delimiter(self) -> char {
        match self {
            Self::DoubleQuote => '"',
            Self::Backtick => '`',
        }
    }
}

/// A quoted identifier. `value` holds the unescaped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedIdentifier {
    pub value: String,
    pub quote: QuoteStyle,
}

impl DelimitedIdentifier {
    #[must_use]
    pub fn new(value: impl Into<String>, quote: QuoteStyle) -> Self {
        Self {
            value: value.into(),
            quote,
        }
    }

    /// A double-quoted identifier.
    #[must_use]
    pub fn double_quoted(value: impl Into<String>) -> Self {
        Self::new(value, QuoteStyle::DoubleQuote)
    }
}

impl SqlElement for DelimitedIdentifier {
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        Vec::new()
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if !w.quotes() {
            w.text(&self.value);
            return;
        }
        let delimiter = self.quote.delimiter();
        w.char(delimiter);
        for c in self.value.chars() {
            if c == delimiter {
                w.char(delimiter);
            }
            w.char(c);
        }
        w.char(delimiter);
    }

    fn has_quotes(&self) -> bool {
        true
    }
}

/// Either a regular or a delimited identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualIdentifier {
    pub inner: NodeId,
}

impl ActualIdentifier {
    /// Returns the identifier text with any delimiters stripped.
    #[must_use]
    pub fn unquoted(&self, tree: &Tree) -> String {
        tree.to_sql_without_quotes(self.inner)
    }
}

impl SqlElement for ActualIdentifier {
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

/// A column name, wrapping an [`ActualIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnName {
    pub identifier: NodeId,
}

impl SqlElement for ColumnName {
    fn children(&self) -> Vec<NodeId> {
        vec![self.identifier]
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        vec![&mut self.identifier]
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.node(self.identifier);
    }
}

/// A possibly qualified column reference, e.g. `t.foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    /// The table or alias qualifier, a [`ColumnName`].
    pub qualifier: Option<NodeId>,
    /// The column, a [`ColumnName`].
    pub name: NodeId,
}

impl SqlElement for ColumnReference {
    fn children(&self) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self.qualifier.into_iter().collect();
        children.push(self.name);
        children
    }

    fn child_slots(&mut self) -> Vec<&mut NodeId> {
        let mut slots: Vec<&mut NodeId> = self.qualifier.iter_mut().collect();
        slots.push(&mut self.name);
        slots
    }

    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if let Some(qualifier) = self.qualifier {
            w.node(qualifier);
            w.char('.');
        }
        w.node(self.name);
    }
}
