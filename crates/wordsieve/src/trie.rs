//! Insert-only prefix tree over [`Unit`] sequences.
//!
//! Nodes live in a flat arena and refer to their children by [`NodeId`].
//! Index 0 is always the root. A node is terminal when some inserted phrase
//! ends exactly there; the flag is a field on the node, so no input unit can
//! ever be confused with an end marker.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use crate::error::Result;
use crate::segment::Unit;

/// Index of a node inside a [`Trie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every trie.
    pub const ROOT: Self = Self(0);

    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    children: HashMap<Unit, NodeId>,
    terminal: bool,
}

/// Prefix tree of dictionary phrases.
///
/// Built once through [`Trie::insert`] and read-only afterwards. Readers only
/// need `&Trie`, so a finished trie can be shared freely between threads.
///
/// Every child sits at a higher arena index than its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create a trie holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Insert a phrase, creating one edge per unit that is not already present.
    ///
    /// Inserting the same phrase twice leaves the trie unchanged. An empty
    /// phrase is ignored; the root never becomes terminal.
    pub fn insert(&mut self, phrase: &[Unit]) {
        if phrase.is_empty() {
            return;
        }

        let mut current = NodeId::ROOT;
        for &unit in phrase {
            current = match self.nodes[current.0].children.get(&unit) {
                Some(&child) => child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes.push(Node::default());
                    self.nodes[current.0].children.insert(unit, child);
                    child
                }
            };
        }
        self.nodes[current.0].terminal = true;
    }

    /// Follow the edge labelled `unit` out of `node`, if there is one.
    #[must_use]
    pub fn child_at(&self, node: NodeId, unit: Unit) -> Option<NodeId> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.children.get(&unit))
            .copied()
    }

    /// Whether a phrase ends at `node`.
    #[must_use]
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.terminal)
    }

    /// Whether `node` has any outgoing edge.
    #[must_use]
    pub fn has_children(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| !n.children.is_empty())
    }

    /// Whether the exact unit sequence was inserted as a phrase.
    #[must_use]
    pub fn contains(&self, phrase: &[Unit]) -> bool {
        let mut current = NodeId::ROOT;
        for &unit in phrase {
            match self.child_at(current, unit) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.is_terminal(current)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct phrases stored.
    #[must_use]
    pub fn phrase_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal).count()
    }

    /// Whether no phrase has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Convert to the nested-mapping form used for serialization.
    #[must_use]
    pub fn to_nested(&self) -> TrieNode {
        // Children have higher indices than parents, so building from the
        // back finishes every subtree before its parent needs it.
        let mut built: Vec<Option<TrieNode>> = (0..self.nodes.len()).map(|_| None).collect();

        for (index, node) in self.nodes.iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .map(|(&unit, &child)| (unit, built[child.0].take().unwrap_or_default()))
                .collect();
            built[index] = Some(TrieNode {
                terminal: node.terminal,
                children,
            });
        }

        built
            .first_mut()
            .and_then(Option::take)
            .unwrap_or_default()
    }

    /// Rebuild a trie from its nested-mapping form.
    ///
    /// A terminal flag on the nested root is dropped, matching the rule that
    /// the empty phrase is never stored.
    #[must_use]
    pub fn from_nested(root: &TrieNode) -> Self {
        let mut trie = Self::new();
        let mut stack: Vec<(NodeId, &TrieNode)> = vec![(NodeId::ROOT, root)];

        while let Some((id, nested)) = stack.pop() {
            for (&unit, child) in &nested.children {
                let child_id = NodeId(trie.nodes.len());
                trie.nodes.push(Node {
                    children: HashMap::new(),
                    terminal: child.terminal,
                });
                trie.nodes[id.0].children.insert(unit, child_id);
                stack.push((child_id, child));
            }
        }

        trie
    }

    /// Convert to the flat arena form stored in the trie cache.
    ///
    /// Unlike the nested form, its encoded depth does not grow with phrase
    /// length.
    #[must_use]
    pub fn to_flat(&self) -> FlatTrie {
        FlatTrie {
            nodes: self
                .nodes
                .iter()
                .map(|node| FlatNode {
                    terminal: node.terminal,
                    children: node
                        .children
                        .iter()
                        .map(|(&unit, &child)| (unit, child.0))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a trie from its flat arena form.
    ///
    /// Returns `None` unless the nodes form a single tree rooted at index 0
    /// with every child stored after its parent.
    #[must_use]
    pub fn from_flat(flat: &FlatTrie) -> Option<Self> {
        let len = flat.nodes.len();
        if len == 0 {
            return None;
        }

        let mut referenced = vec![false; len];
        let mut nodes = Vec::with_capacity(len);

        for (index, node) in flat.nodes.iter().enumerate() {
            let mut children = HashMap::with_capacity(node.children.len());
            for (&unit, &child) in &node.children {
                if child <= index || child >= len || std::mem::replace(&mut referenced[child], true)
                {
                    return None;
                }
                children.insert(unit, NodeId(child));
            }
            nodes.push(Node {
                children,
                terminal: node.terminal && index != 0,
            });
        }

        if referenced.iter().skip(1).any(|seen| !seen) {
            return None;
        }
        Some(Self { nodes })
    }

    /// Write the nested form as JSON without recursing per unit.
    ///
    /// Produces the same text as serializing [`Trie::to_nested`] with
    /// `serde_json`, so arbitrarily long phrases can be exported.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_nested_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<()> {
        if pretty {
            self.write_nested_with(&mut writer, &mut PrettyFormatter::new())
        } else {
            self.write_nested_with(&mut writer, &mut CompactFormatter)
        }
    }

    fn write_nested_with<W: Write, F: Formatter>(&self, writer: &mut W, f: &mut F) -> Result<()> {
        // One frame per open node: its remaining children and whether the
        // next one is the first key of the `children` object.
        let mut stack: Vec<(std::vec::IntoIter<(Unit, NodeId)>, bool)> = Vec::new();
        self.open_json_node(writer, f, NodeId::ROOT, &mut stack)?;

        loop {
            let Some((children, first)) = stack.last_mut() else {
                break;
            };
            match children.next() {
                Some((unit, child)) => {
                    let first = std::mem::replace(first, false);
                    f.begin_object_key(writer, first)?;
                    serde_json::to_writer(&mut *writer, &unit)?;
                    f.end_object_key(writer)?;
                    f.begin_object_value(writer)?;
                    self.open_json_node(writer, f, child, &mut stack)?;
                }
                None => {
                    stack.pop();
                    f.end_object(writer)?;
                    f.end_object_value(writer)?;
                    f.end_object(writer)?;
                    if !stack.is_empty() {
                        f.end_object_value(writer)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn open_json_node<W: Write, F: Formatter>(
        &self,
        writer: &mut W,
        f: &mut F,
        id: NodeId,
        stack: &mut Vec<(std::vec::IntoIter<(Unit, NodeId)>, bool)>,
    ) -> Result<()> {
        let node = &self.nodes[id.0];

        f.begin_object(writer)?;
        f.begin_object_key(writer, true)?;
        writer.write_all(b"\"terminal\"")?;
        f.end_object_key(writer)?;
        f.begin_object_value(writer)?;
        f.write_bool(writer, node.terminal)?;
        f.end_object_value(writer)?;

        if node.children.is_empty() {
            f.end_object(writer)?;
            if !stack.is_empty() {
                f.end_object_value(writer)?;
            }
            return Ok(());
        }

        let mut children: Vec<(Unit, NodeId)> =
            node.children.iter().map(|(&unit, &child)| (unit, child)).collect();
        children.sort_unstable_by_key(|&(unit, _)| unit);

        f.begin_object_key(writer, false)?;
        writer.write_all(b"\"children\"")?;
        f.end_object_key(writer)?;
        f.begin_object_value(writer)?;
        f.begin_object(writer)?;
        stack.push((children.into_iter(), true));
        Ok(())
    }
}

/// Flat arena form of a trie, indexed like the trie's own nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTrie {
    /// Nodes in arena order; index 0 is the root.
    pub nodes: Vec<FlatNode>,
}

/// One node of a [`FlatTrie`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    /// Whether a phrase ends at this node.
    #[serde(default, rename = "t", skip_serializing_if = "std::ops::Not::not")]
    pub terminal: bool,
    /// Outgoing edges keyed by unit, valued by arena index.
    #[serde(default, rename = "c", skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<Unit, usize>,
}

/// Serializable nested-mapping form of a trie node.
///
/// Children are kept in a `BTreeMap` so encoding the same trie always yields
/// the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNode {
    /// Whether a phrase ends at this node.
    #[serde(default)]
    pub terminal: bool,
    /// Outgoing edges keyed by unit.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<Unit, TrieNode>,
}

impl TrieNode {
    /// Number of nodes in this subtree, this node included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.values());
        }
        count
    }
}

impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut stack: Vec<TrieNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    fn trie_of(phrases: &[&str]) -> Trie {
        let mut trie = Trie::new();
        for phrase in phrases {
            trie.insert(&segment(phrase));
        }
        trie
    }

    #[test]
    fn test_new_trie_is_empty() {
        let trie = Trie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 1);
        assert_eq!(trie.phrase_count(), 0);
        assert!(!trie.is_terminal(trie.root()));
    }

    #[test]
    fn test_insert_marks_terminal() {
        let trie = trie_of(&["abc"]);
        let a = trie.child_at(trie.root(), 'a').unwrap();
        let b = trie.child_at(a, 'b').unwrap();
        let c = trie.child_at(b, 'c').unwrap();

        assert!(!trie.is_terminal(a));
        assert!(!trie.is_terminal(b));
        assert!(trie.is_terminal(c));
        assert!(!trie.has_children(c));
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let trie = trie_of(&["abc", "abd", "ab"]);
        // root + a + b + c + d
        assert_eq!(trie.node_count(), 5);
        assert_eq!(trie.phrase_count(), 3);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let once = trie_of(&["hello"]);
        let twice = trie_of(&["hello", "hello"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_insert_empty_phrase_is_noop() {
        let mut trie = Trie::new();
        trie.insert(&[]);
        assert!(trie.is_empty());
        assert!(!trie.is_terminal(trie.root()));
    }

    #[test]
    fn test_node_count_bounded_by_phrase_lengths() {
        let phrases = ["spam", "spammer", "scam", "ham"];
        let trie = trie_of(&phrases);
        let total: usize = phrases.iter().map(|p| p.chars().count()).sum();
        assert!(trie.node_count() - 1 <= total);
    }

    #[test]
    fn test_contains() {
        let trie = trie_of(&["ab", "abc"]);
        assert!(trie.contains(&segment("ab")));
        assert!(trie.contains(&segment("abc")));
        assert!(!trie.contains(&segment("a")));
        assert!(!trie.contains(&segment("abcd")));
        assert!(!trie.contains(&[]));
    }

    #[test]
    fn test_child_at_unknown_node() {
        let trie = trie_of(&["x"]);
        assert!(trie.child_at(NodeId(42), 'x').is_none());
        assert!(!trie.is_terminal(NodeId(42)));
    }

    #[test]
    fn test_multibyte_units() {
        let trie = trie_of(&["违禁", "违法"]);
        assert_eq!(trie.node_count(), 4);
        assert!(trie.contains(&segment("违法")));
    }

    #[test]
    fn test_same_input_builds_identical_tries() {
        let phrases = ["one", "two", "three", "tree"];
        assert_eq!(trie_of(&phrases), trie_of(&phrases));
    }

    #[test]
    fn test_nested_round_trip() {
        let trie = trie_of(&["ab", "abc", "b", "违禁"]);
        let nested = trie.to_nested();
        assert_eq!(nested.node_count(), trie.node_count());

        let rebuilt = Trie::from_nested(&nested);
        assert_eq!(rebuilt.node_count(), trie.node_count());
        assert_eq!(rebuilt.phrase_count(), trie.phrase_count());
        assert_eq!(rebuilt.to_nested(), nested);
        assert!(rebuilt.contains(&segment("abc")));
        assert!(rebuilt.contains(&segment("违禁")));
    }

    #[test]
    fn test_nested_json_shape() {
        let trie = trie_of(&["ab"]);
        let json = serde_json::to_value(trie.to_nested()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "terminal": false,
                "children": {
                    "a": {
                        "terminal": false,
                        "children": { "b": { "terminal": true } }
                    }
                }
            })
        );
    }

    #[test]
    fn test_nested_terminal_is_not_a_child_key() {
        // A phrase spelled like a marker must stay an ordinary edge.
        let trie = trie_of(&["e"]);
        let nested = trie.to_nested();
        let e = nested.children.get(&'e').unwrap();
        assert!(e.terminal);
        assert!(!nested.terminal);
    }

    #[test]
    fn test_from_nested_ignores_terminal_root() {
        let nested = TrieNode {
            terminal: true,
            children: BTreeMap::new(),
        };
        let trie = Trie::from_nested(&nested);
        assert!(trie.is_empty());
        assert!(!trie.is_terminal(trie.root()));
    }

    #[test]
    fn test_flat_round_trip() {
        let trie = trie_of(&["ab", "abc", "b", "违禁"]);
        let flat = trie.to_flat();
        assert_eq!(flat.nodes.len(), trie.node_count());

        let rebuilt = Trie::from_flat(&flat).unwrap();
        assert_eq!(rebuilt, trie);
    }

    #[test]
    fn test_flat_json_depth_is_constant() {
        let long: String = "a".repeat(500);
        let trie = trie_of(&[long.as_str()]);

        let json = serde_json::to_string(&trie.to_flat()).unwrap();
        let decoded: FlatTrie = serde_json::from_str(&json).unwrap();
        let rebuilt = Trie::from_flat(&decoded).unwrap();

        assert!(rebuilt.contains(&segment(&long)));
        assert_eq!(rebuilt.node_count(), 501);
    }

    #[test]
    fn test_from_flat_rejects_malformed() {
        let node = |terminal: bool, children: &[(char, usize)]| FlatNode {
            terminal,
            children: children.iter().copied().collect(),
        };

        // no root
        assert!(Trie::from_flat(&FlatTrie::default()).is_none());
        // child pointing back at its parent
        let cycle = FlatTrie {
            nodes: vec![node(false, &[('a', 1)]), node(true, &[('b', 0)])],
        };
        assert!(Trie::from_flat(&cycle).is_none());
        // child index out of range
        let dangling = FlatTrie {
            nodes: vec![node(false, &[('a', 5)])],
        };
        assert!(Trie::from_flat(&dangling).is_none());
        // two edges into one node
        let shared = FlatTrie {
            nodes: vec![
                node(false, &[('a', 1), ('b', 2)]),
                node(false, &[('c', 2)]),
                node(true, &[]),
            ],
        };
        assert!(Trie::from_flat(&shared).is_none());
        // node nothing points at
        let orphan = FlatTrie {
            nodes: vec![node(false, &[('a', 1)]), node(true, &[]), node(true, &[])],
        };
        assert!(Trie::from_flat(&orphan).is_none());
    }

    #[test]
    fn test_from_flat_ignores_terminal_root() {
        let flat = FlatTrie {
            nodes: vec![FlatNode {
                terminal: true,
                children: BTreeMap::new(),
            }],
        };
        let trie = Trie::from_flat(&flat).unwrap();
        assert!(trie.is_empty());
        assert!(!trie.is_terminal(trie.root()));
    }

    #[test]
    fn test_very_long_phrase_nested_form() {
        let units = vec!['a'; 200_000];
        let mut trie = Trie::new();
        trie.insert(&units);

        let nested = trie.to_nested();
        assert_eq!(nested.node_count(), 200_001);
        drop(nested);

        let mut out = Vec::new();
        trie.write_nested_json(&mut out, false).unwrap();
        assert!(out.starts_with(br#"{"terminal":false,"children":{"a":"#));
        assert!(out.ends_with(b"}}}"));
    }

    #[test]
    fn test_write_nested_json_matches_serde() {
        let trie = trie_of(&["ab", "abc", "b", "违禁", "\"q\""]);
        let nested = trie.to_nested();

        let mut compact = Vec::new();
        trie.write_nested_json(&mut compact, false).unwrap();
        assert_eq!(
            String::from_utf8(compact).unwrap(),
            serde_json::to_string(&nested).unwrap()
        );

        let mut pretty = Vec::new();
        trie.write_nested_json(&mut pretty, true).unwrap();
        assert_eq!(
            String::from_utf8(pretty).unwrap(),
            serde_json::to_string_pretty(&nested).unwrap()
        );
    }

    #[test]
    fn test_write_nested_json_write_failure() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = trie_of(&["ab"]).write_nested_json(Closed, false).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_write_nested_json_empty_trie() {
        let mut out = Vec::new();
        Trie::new().write_nested_json(&mut out, false).unwrap();
        assert_eq!(out, br#"{"terminal":false}"#);
    }
}
