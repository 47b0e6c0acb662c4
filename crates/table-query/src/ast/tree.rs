//! Arena storage for the AST with parent links and structural replacement.

use std::fmt;

use tracing::trace;

use super::element::{Element, Node, NodeKind, SqlElement, SqlWriter};
use crate::error::{QueryError, Result};

/// Index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    element: Element,
    parent: Option<NodeId>,
}

/// An arena of AST nodes.
///
/// Nodes refer to their children by [`NodeId`] and every slot records the
/// parent that owns it. A node has at most one parent. Detached subtrees stay
/// in the arena but are unreachable from the root they used to belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Returns the number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true if `id` names a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.slots.len()
    }

    /// Appends a node and adopts its children. Only the parser and subtree
    /// copies call this, and both hand over fresh, parentless children.
    /// [`Tree::add`] is the checked entry point for everything else.
    pub(crate) fn push(&mut self, element: impl Into<Element>) -> NodeId {
        let element = element.into();
        let id = NodeId(self.slots.len());
        for child in element.children() {
            debug_assert!(self.parent(child).is_none(), "{child} already has a parent");
            if let Some(slot) = self.slots.get_mut(child.0) {
                slot.parent = Some(id);
            }
        }
        self.slots.push(Slot {
            element,
            parent: None,
        });
        id
    }

    /// Adds a programmatically built node.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if a child is unknown, already has
    /// a parent, or is listed twice.
    pub fn add(&mut self, element: impl Into<Element>) -> Result<NodeId> {
        let element = element.into();
        let children = element.children();
        for (index, child) in children.iter().enumerate() {
            if !self.contains(*child) {
                return Err(QueryError::construction(format!(
                    "{} refers to unknown node {child}",
                    element.kind().name()
                )));
            }
            if self.parent(*child).is_some() || children[..index].contains(child) {
                return Err(QueryError::construction(format!(
                    "{} cannot adopt {child}: it already has a parent",
                    element.kind().name()
                )));
            }
        }
        Ok(self.push(element))
    }

    /// Returns the element stored at `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots.get(id.0).map(|slot| &slot.element)
    }

    /// Returns the node at `id` if it is a `T`.
    #[must_use]
    pub fn node<T: Node>(&self, id: NodeId) -> Option<&T> {
        self.get(id).and_then(T::cast)
    }

    /// Returns the kind of the node at `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Element::kind)
    }

    /// Returns the parent of `id`, if it is attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    /// Returns the immediate children of `id`, in rendering order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(Element::children).unwrap_or_default()
    }

    /// Returns `id` and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Returns the first node of type `T` in a pre-order walk starting at
    /// (and including) `id`.
    #[must_use]
    pub fn first_element_of_type<T: Node>(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|node| self.kind(*node) == Some(T::KIND))
    }

    /// Returns every node of type `T` under (and including) `id`, in pre-order.
    #[must_use]
    pub fn elements_of_type<T: Node>(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.kind(*node) == Some(T::KIND))
            .collect()
    }

    /// Returns true if the node itself is delimited (a quoted identifier or a
    /// string literal).
    #[must_use]
    pub fn has_quotes(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Element::has_quotes)
    }

    /// Returns true if the node or any of its descendants is delimited.
    #[must_use]
    pub fn has_quotes_recursive(&self, id: NodeId) -> bool {
        self.descendants(id).into_iter().any(|node| self.has_quotes(node))
    }

    /// Renders the canonical SQL of `id`.
    #[must_use]
    pub fn to_sql(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_sql(id, &mut out);
        out
    }

    /// Appends the canonical SQL of `id` to `out`.
    pub fn write_sql(&self, id: NodeId, out: &mut String) {
        SqlWriter::new(self, out, true).node(id);
    }

    /// Renders `id` with identifier and string delimiters stripped.
    #[must_use]
    pub fn to_sql_without_quotes(&self, id: NodeId) -> String {
        let mut out = String::new();
        SqlWriter::new(self, &mut out, false).node(id);
        out
    }

    /// Returns true if `ancestor` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Checks that `new` can be attached under `parent`.
    fn check_attachable(&self, new: NodeId, parent: NodeId) -> Result<()> {
        if !self.contains(new) {
            return Err(QueryError::construction(format!(
                "replacement {new} is not a node of this tree"
            )));
        }
        if self.parent(new).is_some() {
            return Err(QueryError::construction(format!(
                "replacement {new} already has a parent"
            )));
        }
        if self.is_ancestor_or_self(new, parent) {
            return Err(QueryError::construction(format!(
                "replacement {new} is an ancestor of {parent}"
            )));
        }
        Ok(())
    }

    /// Clears the parent link of every descendant of `id`.
    fn clear_parents(&mut self, id: NodeId) {
        for child in self.children(id) {
            if let Some(slot) = self.slots.get_mut(child.0) {
                slot.parent = None;
            }
            self.clear_parents(child);
        }
    }

    /// Detaches `id` from its parent link and clears the links of its subtree.
    fn detach(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.parent = None;
        }
        self.clear_parents(id);
    }

    /// Swaps `new` into the slot `old` occupies in its parent.
    ///
    /// Afterwards `new` is attached to the old parent, `old` has no parent and
    /// every node of the old subtree has had its parent link cleared.
    ///
    /// # Errors
    ///
    /// - [`QueryError::State`] if `old` is unknown or currently has no parent.
    /// - [`QueryError::Construction`] if `new` is unknown, already attached,
    ///   an ancestor of `old`, or not acceptable in the slot.
    pub fn replace_element(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let old_kind = self
            .kind(old)
            .ok_or_else(|| QueryError::state(format!("{old} is not a node of this tree")))?;
        let parent = self.parent(old).ok_or_else(|| {
            QueryError::state(format!(
                "cannot replace {} {old}: it has no parent",
                old_kind.name()
            ))
        })?;
        self.check_attachable(new, parent)?;

        let new_kind = self
            .kind(new)
            .ok_or_else(|| QueryError::construction(format!("{new} is not a node of this tree")))?;
        let parent_kind = self
            .kind(parent)
            .ok_or_else(|| QueryError::state(format!("{parent} is not a node of this tree")))?;
        if !parent_kind.slot_accepts(old_kind, new_kind) {
            return Err(QueryError::construction(format!(
                "{} cannot take the place of {} in {}",
                new_kind.name(),
                old_kind.name(),
                parent_kind.name()
            )));
        }

        let slot = self
            .slots
            .get_mut(parent.0)
            .and_then(|slot| slot.element.child_slots().into_iter().find(|slot| **slot == old))
            .ok_or_else(|| QueryError::state(format!("{old} is not a child of {parent}")))?;
        *slot = new;

        if let Some(slot) = self.slots.get_mut(new.0) {
            slot.parent = Some(parent);
        }
        self.detach(old);
        trace!(%old, %new, parent = %parent, kind = old_kind.name(), "replaced element");
        Ok(())
    }

    /// Replaces the optional child selected by `select` on `parent`.
    ///
    /// Returns the previous child, now detached.
    pub(crate) fn replace_optional<F>(
        &mut self,
        parent: NodeId,
        expected: NodeKind,
        new: Option<NodeId>,
        select: F,
    ) -> Result<Option<NodeId>>
    where
        F: FnOnce(&mut Element) -> Option<&mut Option<NodeId>>,
    {
        if let Some(new) = new {
            self.check_attachable(new, parent)?;
            let kind = self.kind(new);
            if kind != Some(expected) {
                return Err(QueryError::construction(format!(
                    "expected {}, found {}",
                    expected.name(),
                    kind.map_or("nothing", NodeKind::name)
                )));
            }
        }

        let parent_kind = self
            .kind(parent)
            .ok_or_else(|| QueryError::state(format!("{parent} is not a node of this tree")))?;
        let slot = self
            .slots
            .get_mut(parent.0)
            .and_then(|slot| select(&mut slot.element))
            .ok_or_else(|| {
                QueryError::construction(format!(
                    "{} has no optional {} slot",
                    parent_kind.name(),
                    expected.name()
                ))
            })?;
        let old = std::mem::replace(slot, new);

        if let Some(new) = new {
            if let Some(slot) = self.slots.get_mut(new.0) {
                slot.parent = Some(parent);
            }
        }
        if let Some(old) = old {
            self.detach(old);
        }
        Ok(old)
    }

    /// Deep-copies the subtree at `id` within this tree. The copy is detached.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `id` is unknown.
    pub fn copy_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        self.import(None, id)
    }

    /// Deep-copies the subtree at `id` of `source` into this tree. The copy is
    /// detached.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `id` is unknown to `source`.
    pub fn graft(&mut self, source: &Self, id: NodeId) -> Result<NodeId> {
        self.import(Some(source), id)
    }

    fn import(&mut self, source: Option<&Self>, id: NodeId) -> Result<NodeId> {
        let mut element = source
            .map_or_else(|| self.get(id), |source| source.get(id))
            .cloned()
            .ok_or_else(|| QueryError::construction(format!("cannot copy unknown node {id}")))?;
        let mut copies = Vec::new();
        for child in element.children() {
            copies.push(self.import(source, child)?);
        }
        for (slot, copy) in element.child_slots().into_iter().zip(copies) {
            *slot = copy;
        }
        Ok(self.push(element))
    }

    /// Arena length, used as a parser checkpoint.
    pub(crate) fn checkpoint(&self) -> usize {
        self.slots.len()
    }

    /// Drops every node added after `len` and the links that pointed at them.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.slots.len() {
            return;
        }
        self.slots.truncate(len);
        for slot in &mut self.slots {
            if slot.parent.is_some_and(|parent| parent.0 >= len) {
                slot.parent = None;
            }
        }
    }
}

/// An owned tree together with the node that roots it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    tree: Tree,
    root: NodeId,
}

impl Fragment {
    /// Wraps `tree` with `root` as its entry point.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `root` is unknown or attached
    /// to a parent.
    pub fn new(tree: Tree, root: NodeId) -> Result<Self> {
        if !tree.contains(root) {
            return Err(QueryError::construction(format!("unknown root {root}")));
        }
        if tree.parent(root).is_some() {
            return Err(QueryError::construction(format!("root {root} has a parent")));
        }
        Ok(Self { tree, root })
    }

    pub(crate) const fn from_parts(tree: Tree, root: NodeId) -> Self {
        Self { tree, root }
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns the underlying tree for mutation.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the kind of the root node.
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        self.tree.kind(self.root)
    }

    /// Returns the root node if it is a `T`.
    #[must_use]
    pub fn node<T: Node>(&self) -> Option<&T> {
        self.tree.node(self.root)
    }

    /// Returns the first `T` under the root, root included.
    #[must_use]
    pub fn first_element_of_type<T: Node>(&self) -> Option<NodeId> {
        self.tree.first_element_of_type::<T>(self.root)
    }

    /// Renders the canonical SQL of the root.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.tree.to_sql(self.root)
    }

    /// Renders the root with delimiters stripped.
    #[must_use]
    pub fn to_sql_without_quotes(&self) -> String {
        self.tree.to_sql_without_quotes(self.root)
    }

    /// Copies the subtree at `id` into a compact fragment of its own.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Construction`] if `id` is unknown.
    pub fn subtree(&self, id: NodeId) -> Result<Self> {
        let mut tree = Tree::new();
        let root = tree.graft(&self.tree, id)?;
        Ok(Self { tree, root })
    }

    /// Splits the fragment into its tree and root.
    #[must_use]
    pub fn into_parts(self) -> (Tree, NodeId) {
        (self.tree, self.root)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ActualIdentifier, DelimitedIdentifier, RegularIdentifier};

    fn identifier(tree: &mut Tree, name: &str) -> NodeId {
        let inner = tree.push(RegularIdentifier::new(name));
        tree.push(ActualIdentifier { inner })
    }

    #[test]
    fn test_add_rejects_unknown_and_adopted_children() {
        let mut tree = Tree::new();
        let inner = tree.push(RegularIdentifier::new("a"));
        assert!(tree.add(ActualIdentifier { inner }).is_ok());
        assert!(matches!(
            tree.add(ActualIdentifier { inner }),
            Err(QueryError::Construction(_))
        ));
        assert!(matches!(
            tree.add(ActualIdentifier { inner: NodeId(99) }),
            Err(QueryError::Construction(_))
        ));
    }

    #[test]
    fn test_replace_element_relinks_parents() {
        let mut tree = Tree::new();
        let root = identifier(&mut tree, "old");
        let old = tree.children(root)[0];
        let new = tree.push(DelimitedIdentifier::double_quoted("new"));

        tree.replace_element(old, new).unwrap();
        assert_eq!(tree.to_sql(root), "\"new\"");
        assert_eq!(tree.parent(new), Some(root));
        assert_eq!(tree.parent(old), None);
    }

    #[test]
    fn test_replace_element_errors() {
        let mut tree = Tree::new();
        let root = identifier(&mut tree, "a");
        let child = tree.children(root)[0];
        let spare = tree.push(RegularIdentifier::new("b"));

        assert!(matches!(
            tree.replace_element(root, spare),
            Err(QueryError::State(_))
        ));
        assert!(matches!(
            tree.replace_element(child, NodeId(99)),
            Err(QueryError::Construction(_))
        ));
        assert!(matches!(
            tree.replace_element(child, root),
            Err(QueryError::Construction(_))
        ));
    }

    #[test]
    fn test_truncate_clears_dangling_parents() {
        let mut tree = Tree::new();
        let inner = tree.push(RegularIdentifier::new("a"));
        let mark = tree.checkpoint();
        tree.push(ActualIdentifier { inner });
        assert!(tree.parent(inner).is_some());

        tree.truncate(mark);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.parent(inner), None);
    }

    #[test]
    fn test_graft_and_subtree_copy_deeply() {
        let mut source = Tree::new();
        let root = identifier(&mut source, "col");
        let fragment = Fragment::new(source, root).unwrap();

        let copy = fragment.subtree(root).unwrap();
        assert_eq!(copy.tree().len(), 2);
        assert_eq!(copy.to_string(), "col");

        let mut tree = Tree::new();
        let grafted = tree.graft(fragment.tree(), root).unwrap();
        let again = tree.copy_subtree(grafted).unwrap();
        assert_ne!(grafted, again);
        assert_eq!(tree.to_sql(again), "col");
        assert_eq!(tree.parent(again), None);
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let mut tree = Tree::new();
        let root = identifier(&mut tree, "x");
        assert_eq!(tree.descendants(root), vec![root, NodeId(0)]);
        assert_eq!(tree.first_element_of_type::<RegularIdentifier>(root), Some(NodeId(0)));
        assert_eq!(tree.first_element_of_type::<ActualIdentifier>(root), Some(root));
    }
}
