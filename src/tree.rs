//! The hybrid trie/radix tree that backs matching.
//!
//! Each [`Node`] holds a radix-compressed literal prefix, a byte-keyed map of literal
//! children, at most one parametric child, and an optional terminal. Exact children are tried
//! before the parametric child, which is tried before falling back to this node's own terminal,
//! expressed here as traversal order rather than a sort key since there's only ever one
//! parametric child.

use std::collections::HashMap;

use crate::error::ConflictError;
use crate::route::{Route, Step};

/// One node of the tree. Generic over `L`, the opaque leaf value stored at a terminal: the
/// router stores a destination index here rather than the payload itself, so the tree never
/// needs to know about the caller's payload type.
#[derive(Debug, Clone)]
pub struct Node<L> {
    prefix: Vec<u8>,
    children: HashMap<u8, Node<L>>,
    parametric: Option<Box<Parametric<L>>>,
    terminal: Option<Terminal<L>>,
}

#[derive(Debug, Clone)]
struct Parametric<L> {
    step: Step,
    source: String,
    child: Node<L>,
}

#[derive(Debug, Clone)]
struct Terminal<L> {
    leaf: L,
}

impl<L> Default for Node<L> {
    fn default() -> Self {
        Node {
            prefix: Vec::new(),
            children: HashMap::new(),
            parametric: None,
            terminal: None,
        }
    }
}

impl<L: Copy> Node<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn child_for(&self, byte: u8) -> Option<&Node<L>> {
        self.children.get(&byte)
    }

    pub fn parametric_step(&self) -> Option<&Step> {
        self.parametric.as_ref().map(|p| &p.step)
    }

    pub fn parametric_child(&self) -> Option<&Node<L>> {
        self.parametric.as_ref().map(|p| &p.child)
    }

    pub fn terminal(&self) -> Option<L> {
        self.terminal.as_ref().map(|t| t.leaf)
    }

    /// Insert `route`'s steps into the tree, attaching `leaf` at the resulting terminal.
    ///
    /// Shadowed exact terminals (a second route registering the identical literal path) are
    /// silently ignored, keeping the first-registered destination. Incompatible parametric
    /// children at the same position are a hard conflict.
    pub fn insert(&mut self, route: &Route, leaf: L) -> Result<(), ConflictError> {
        insert_steps(self, &route.steps, leaf, &route.source)
    }

    /// A human-readable dump of the tree's shape, for debugging and introspection.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        out.push_str(&pad);
        out.push_str(&format!(
            "prefix={:?} terminal={}\n",
            String::from_utf8_lossy(&self.prefix),
            self.terminal.is_some()
        ));

        let mut keys: Vec<&u8> = self.children.keys().collect();
        keys.sort();
        for key in keys {
            self.children[key].write_text(out, indent + 1);
        }

        if let Some(parametric) = &self.parametric {
            out.push_str(&pad);
            out.push_str(&format!("  [param: {:?}]\n", parametric.step));
            parametric.child.write_text(out, indent + 2);
        }
    }
}

fn insert_steps<L: Copy>(
    node: &mut Node<L>,
    steps: &[Step],
    leaf: L,
    source: &str,
) -> Result<(), ConflictError> {
    match steps.split_first() {
        None => {
            if node.terminal.is_none() {
                node.terminal = Some(Terminal { leaf });
            }
            Ok(())
        }
        Some((Step::Exact(bytes), rest)) => insert_literal(node, bytes, rest, leaf, source),
        Some((step, rest)) => insert_parametric(node, step, rest, leaf, source),
    }
}

fn insert_parametric<L: Copy>(
    node: &mut Node<L>,
    step: &Step,
    rest: &[Step],
    leaf: L,
    source: &str,
) -> Result<(), ConflictError> {
    match &mut node.parametric {
        None => {
            let mut child = Node::default();
            insert_steps(&mut child, rest, leaf, source)?;
            node.parametric = Some(Box::new(Parametric {
                step: step.clone(),
                source: source.to_owned(),
                child,
            }));
            Ok(())
        }
        Some(existing) => {
            if existing.step.conflicts_with(step) {
                return Err(ConflictError {
                    existing_pattern: existing.source.clone(),
                    conflicting_pattern: source.to_owned(),
                });
            }
            insert_steps(&mut existing.child, rest, leaf, source)
        }
    }
}

fn insert_literal<L: Copy>(
    node: &mut Node<L>,
    bytes: &[u8],
    rest: &[Step],
    leaf: L,
    source: &str,
) -> Result<(), ConflictError> {
    if bytes.is_empty() {
        return insert_steps(node, rest, leaf, source);
    }

    let key = bytes[0];

    if !node.children.contains_key(&key) {
        let mut child = Node {
            prefix: bytes.to_vec(),
            ..Node::default()
        };
        insert_steps(&mut child, rest, leaf, source)?;
        node.children.insert(key, child);
        return Ok(());
    }

    let common = common_prefix_len(&node.children[&key].prefix, bytes);
    let existing_len = node.children[&key].prefix.len();

    if common < existing_len {
        split_child(node, key, common);
    }

    insert_literal(
        node.children.get_mut(&key).expect("key was just inserted"),
        &bytes[common..],
        rest,
        leaf,
        source,
    )
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Split the child keyed by `key` at byte offset `at`, inserting a new intermediate node that
/// owns the shared prefix and reattaching the old child (now holding only its private suffix)
/// underneath it.
fn split_child<L: Copy>(node: &mut Node<L>, key: u8, at: usize) {
    let mut existing = node
        .children
        .remove(&key)
        .expect("split_child called on a missing key");

    let tail = existing.prefix.split_off(at);
    let head = std::mem::replace(&mut existing.prefix, tail);

    let mut mid = Node {
        prefix: head,
        ..Node::default()
    };

    let tail_key = existing.prefix[0];
    mid.children.insert(tail_key, existing);
    node.children.insert(key, mid);
}
