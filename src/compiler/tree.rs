use crate::compiler::operator::Catalogue;
use crate::compiler::token::Token;
use anyhow::{Context, Result};
use ptree::{write_tree, TreeBuilder};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a node owned by a [`NodeArena`].
    pub struct NodeKey;
}

/// A binary tree cell. Children are handles into the owning arena; there are
/// no parent pointers, so tree rewrites return the new subtree root instead
/// of navigating upwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub token: Token,
    pub left: Option<NodeKey>,
    pub right: Option<NodeKey>,
    /// True iff this subtree came from a parenthesised block. A grouped node
    /// is atomic during precedence rotations.
    pub grouped: bool,
}

/// Owner of every node allocated during one parse call.
///
/// Backtracking abandons partially-built subtrees without freeing them
/// individually; the whole arena is released when it is dropped at the end
/// of the call, on the success and the error path alike.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: SlotMap<NodeKey, Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena {
            nodes: SlotMap::with_key(),
        }
    }

    /// Allocates a leaf node for the token.
    pub fn insert(&mut self, token: Token) -> NodeKey {
        self.nodes.insert(Node {
            token,
            left: None,
            right: None,
            grouped: false,
        })
    }

    pub fn node(&self, key: NodeKey) -> &Node {
        self.nodes.get(key).expect("Arena is missing a node")
    }

    pub fn node_mut(&mut self, key: NodeKey) -> &mut Node {
        self.nodes.get_mut(key).expect("Arena is missing a node")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the subtree in preorder (node, left, right) and emits a copy of
    /// each node's token in visit order. The returned tokens own their data
    /// and outlive the arena.
    pub fn linearize(&self, root: NodeKey) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pending = vec![root];

        while let Some(key) = pending.pop() {
            let node = self.node(key);
            tokens.push(node.token.clone());
            // Right below left so that the left subtree is visited first.
            if let Some(right) = node.right {
                pending.push(right);
            }
            if let Some(left) = node.left {
                pending.push(left);
            }
        }

        tokens
    }

    /// Renders the subtree for diagnostics.
    pub fn render(&self, root: NodeKey, catalogue: &Catalogue) -> Result<String> {
        let mut builder = TreeBuilder::new("statement".into());
        self.write_node(root, catalogue, &mut builder);

        let mut buffer: Vec<u8> = Vec::new();
        write_tree(&builder.build(), &mut buffer).context("Failed to render parse tree")?;
        String::from_utf8(buffer).context("Rendered parse tree is not valid UTF-8")
    }

    fn write_node(&self, key: NodeKey, catalogue: &Catalogue, builder: &mut TreeBuilder) {
        let node = self.node(key);
        let mut name = node.token.text(catalogue);
        if node.grouped {
            name.push_str(" (grouped)");
        }

        if node.left.is_none() && node.right.is_none() {
            builder.add_empty_child(name);
            return;
        }

        builder.begin_child(name);
        if let Some(left) = node.left {
            self.write_node(left, catalogue, builder);
        }
        if let Some(right) = node.right {
            self.write_node(right, catalogue, builder);
        }
        builder.end_child();
    }
}
