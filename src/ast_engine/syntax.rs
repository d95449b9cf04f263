//! Typed syntax tree lowered from the tree-sitter CST.
//!
//! Only the distinctions entity extraction cares about survive lowering:
//! class definitions, function definitions, and everything else. Compound
//! statements (`if`, `try`, `with`, ...) keep their children so that
//! definitions nested inside them stay reachable; expressions are leaves.
//! Block wrappers do not survive, so a node's depth is its depth in Python's
//! own statement tree.

use std::collections::VecDeque;

/// A lowered source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    /// Top-level statements in source order.
    pub body: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Breadth-first walk over every node, module level first.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            queue: self.body.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A node of the lowered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Class(ClassNode),
    Function(FunctionNode),
    Other(OtherNode),
}

impl SyntaxNode {
    /// Direct children in source order.
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Class(class) => &class.body,
            SyntaxNode::Function(function) => &function.body,
            SyntaxNode::Other(other) => &other.children,
        }
    }

    /// 1-based line where the node starts.
    pub fn line(&self) -> usize {
        match self {
            SyntaxNode::Class(class) => class.line,
            SyntaxNode::Function(function) => function.line,
            SyntaxNode::Other(other) => other.line,
        }
    }
}

/// `class Name(...): body`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub name: String,
    pub docstring: Option<String>,
    /// Line of the `class` keyword.
    pub line: usize,
    pub body: Vec<SyntaxNode>,
}

/// `def name(params): body`, sync or async.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    pub name: String,
    /// Parameter names in signature order.
    pub params: Vec<String>,
    pub docstring: Option<String>,
    /// Line of the `def` (or `async def`) keyword.
    pub line: usize,
    pub is_async: bool,
    pub body: Vec<SyntaxNode>,
}

/// Any other statement. `kind` is the grammar's node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherNode {
    pub kind: String,
    pub line: usize,
    pub children: Vec<SyntaxNode>,
}

/// Iterator returned by [`SyntaxTree::walk`].
pub struct Walk<'a> {
    queue: VecDeque<&'a SyntaxNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}
