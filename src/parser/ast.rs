// AST definitions for the macro language

use std::fmt;

/// Index of a node inside an [`Ast`] arena
pub type NodeId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Token classification shared by tokens and AST nodes.
///
/// The set is closed: words outside the keyword table are `Function`
/// (action names such as `click` or `mouseset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Function,
    Keyword,
    String,
    Number,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Function => "Function",
            TokenKind::Keyword => "Keyword",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
        };
        f.write_str(name)
    }
}

/// Block keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Loop,
    End,
    Forever,
}

impl Keyword {
    /// Look up a word in the keyword table
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "loop" => Some(Keyword::Loop),
            "end" => Some(Keyword::End),
            "forever" => Some(Keyword::Forever),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Loop => "loop",
            Keyword::End => "end",
            Keyword::Forever => "forever",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of the tree.
///
/// Leaves carry an action name or an argument literal; `loop` and `forever`
/// nodes own their block body through `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: TokenKind,
    pub value: String,
    pub children: Vec<NodeId>,
}

impl AstNode {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            children: Vec::new(),
        }
    }

    /// Returns the keyword this node was built from, if any
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::from_word(&self.value),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parsed macro program.
///
/// Nodes live in a flat arena and refer to their children by [`NodeId`].
/// Every node reachable from the root has exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: NodeId,
}

impl Ast {
    /// Value carried by the sentinel root node
    pub const ROOT_VALUE: &'static str = "root";

    pub(crate) fn new() -> Self {
        Ast {
            nodes: vec![AstNode::new(TokenKind::Function, Self::ROOT_VALUE)],
            root: 0,
        }
    }

    pub(crate) fn alloc(&mut self, node: AstNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.nodes[id].children = children;
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &AstNode {
        &self.nodes[self.root]
    }

    /// Get a node by id, panicking on an id from another tree
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id)
    }

    /// Iterate over the direct children of `id` in source order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &AstNode> + '_ {
        self.nodes[id].children.iter().map(move |&child| &self.nodes[child])
    }

    /// Number of nodes allocated, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no statements
    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Pre-order depth-first traversal starting at the root
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            ast: self,
            stack: vec![(0, self.root)],
        }
    }
}

/// Iterator returned by [`Ast::walk`], yielding `(depth, id, node)`
pub struct Walk<'a> {
    ast: &'a Ast,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, NodeId, &'a AstNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let node = &self.ast.nodes[id];
        self.stack
            .extend(node.children.iter().rev().map(|&child| (depth + 1, child)));
        Some((depth, id, node))
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, _, node) in self.walk() {
            let indent = "  ".repeat(depth);
            match node.kind {
                TokenKind::String => writeln!(f, "{}{} \"{}\"", indent, node.kind, node.value)?,
                _ => writeln!(f, "{}{} {}", indent, node.kind, node.value)?,
            }
        }
        Ok(())
    }
}
