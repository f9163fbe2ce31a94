use super::{NodeKind, Span};

/// A read-only node of the parse tree.
///
/// Nodes live in a [`bumpalo::Bump`] arena owned by the caller. `text` is the
/// exact (lower-cased) source slice the node covers, which is what lock
/// memoization and compile error messages are keyed on.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub kind: NodeKind,
    pub text: &'a str,
    pub span: Span,
    pub children: &'a [Node<'a>],
}

impl<'a> Node<'a> {
    /// Source offset of the node, used to name triggers.
    pub fn start(&self) -> usize {
        self.span.start()
    }

    pub fn child(&self, index: usize) -> Option<&'a Node<'a>> {
        self.children.get(index)
    }

    /// First child of the given kind.
    pub fn find(&self, kind: NodeKind) -> Option<&'a Node<'a>> {
        self.children.iter().find(|n| n.kind == kind)
    }

    pub fn has(&self, kind: NodeKind) -> bool {
        self.children.iter().any(|n| n.kind == kind)
    }
}

/// A parsed program: the root `Start` node and the normalized source it was
/// parsed from.
#[derive(Debug, Clone, Copy)]
pub struct ParseTree<'a> {
    pub source: &'a str,
    pub root: &'a Node<'a>,
}
