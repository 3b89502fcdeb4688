//! Ontology tree: value-keyed successor structure over a symbol sequence.
//!
//! The tree holds one node per distinct symbol value, not per occurrence.
//! A node's link records the predecessor of the symbol's last occurrence,
//! so repeats rewrite history in place: earlier predecessors are forgotten
//! and the node is re-registered under the final one. Node order stays
//! first-occurrence order throughout, which keeps every derived report
//! deterministic. Because links collapse onto last occurrences, the link
//! relation may contain cycles (including self-links); walks over it must
//! guard against revisits.
//!
//! # Citations
//! - Successor structure of symbol streams: Shannon, "A mathematical theory of communication" (1948)
//! - Index-based tree arenas: Knuth, "The Art of Computer Programming" vol. 1 (1997)

use crate::symbol::SymbolId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ----------------------------------------------------------------------------
// Nodes
// ----------------------------------------------------------------------------

/// One node of the ontology tree, keyed by symbol value.
///
/// `occurrence` and `link` always describe the symbol's last occurrence in
/// the sequence; `children` accumulates symbols whose final link points
/// here, in first-occurrence order of the children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyNode {
    /// Symbol value this node represents.
    pub symbol: SymbolId,
    /// Sequence index of the symbol's last occurrence.
    pub occurrence: usize,
    /// Symbol immediately before the last occurrence, if any.
    pub link: Option<SymbolId>,
    /// Hop count to a root along `link` edges, assigned in node order.
    pub depth: usize,
    /// Symbols registered under this node.
    pub children: Vec<SymbolId>,
}

// ----------------------------------------------------------------------------
// Tree
// ----------------------------------------------------------------------------

/// Value-keyed ontology tree built from one symbol sequence.
///
/// Nodes live in a flat arena in first-occurrence order, with a side index
/// from symbol value to arena slot. Serializes as the bare node list; the
/// index is rebuilt on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<OntologyNode>", from = "Vec<OntologyNode>")]
pub struct OntologyTree {
    nodes: Vec<OntologyNode>,
    index: FxHashMap<SymbolId, usize>,
}

impl OntologyTree {
    /// Builds the tree from a symbol sequence.
    ///
    /// Pass one records, for every distinct symbol value, the index and
    /// predecessor of its last occurrence; repeats overwrite in place
    /// without moving the node. Pass two walks nodes in order, registers
    /// each linked node as a child of its final predecessor, and assigns
    /// `depth` as that predecessor's current depth plus one.
    ///
    /// # Determinism
    /// Node order is first-occurrence order of symbol values; children
    /// order is first-occurrence order of the child symbols. Equal inputs
    /// always produce equal trees.
    pub fn link(symbols: &[SymbolId]) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
        };
        for (i, &symbol) in symbols.iter().enumerate() {
            let link = if i > 0 { Some(symbols[i - 1]) } else { None };
            match tree.index.get(&symbol) {
                Some(&slot) => {
                    let node = &mut tree.nodes[slot];
                    node.occurrence = i;
                    node.link = link;
                }
                None => {
                    tree.index.insert(symbol, tree.nodes.len());
                    tree.nodes.push(OntologyNode {
                        symbol,
                        occurrence: i,
                        link,
                        depth: 0,
                        children: Vec::new(),
                    });
                }
            }
        }
        for slot in 0..tree.nodes.len() {
            let Some(parent) = tree.nodes[slot].link else {
                continue;
            };
            // Links always target a symbol seen in pass one.
            let Some(&parent_slot) = tree.index.get(&parent) else {
                continue;
            };
            let parent_depth = tree.nodes[parent_slot].depth;
            let symbol = tree.nodes[slot].symbol;
            tree.nodes[parent_slot].children.push(symbol);
            tree.nodes[slot].depth = parent_depth + 1;
        }
        tree
    }

    /// Number of distinct symbol values.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the sequence was empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in first-occurrence order.
    pub fn nodes(&self) -> &[OntologyNode] {
        &self.nodes
    }

    /// True when the symbol value occurred in the sequence.
    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.index.contains_key(&symbol)
    }

    /// Looks up the node for a symbol value.
    pub fn get(&self, symbol: SymbolId) -> Option<&OntologyNode> {
        self.index.get(&symbol).map(|&slot| &self.nodes[slot])
    }

    /// Children registered under a symbol; unknown symbols have none.
    pub fn children(&self, symbol: SymbolId) -> &[SymbolId] {
        self.get(symbol)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Final predecessor of a symbol, if known and linked.
    pub fn parent(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.get(symbol).and_then(|node| node.link)
    }

    /// Depth of a symbol's node; unknown symbols report zero.
    pub fn depth(&self, symbol: SymbolId) -> usize {
        self.get(symbol).map(|node| node.depth).unwrap_or(0)
    }

    /// Symbols whose last occurrence had no predecessor, in node order.
    ///
    /// At most one node qualifies: only a symbol whose last occurrence sits
    /// at index zero keeps a `None` link. A sequence whose first symbol
    /// recurs later has no roots at all; every node then sits on a link
    /// cycle.
    pub fn roots(&self) -> Vec<SymbolId> {
        self.nodes
            .iter()
            .filter(|node| node.link.is_none())
            .map(|node| node.symbol)
            .collect()
    }

    /// Largest node depth; zero for an empty tree.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Node count per depth, keyed by depth in ascending order.
    pub fn depth_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for node in &self.nodes {
            *histogram.entry(node.depth).or_insert(0) += 1;
        }
        histogram
    }

    /// Walks `link` edges from a symbol toward a root, returned root-first.
    ///
    /// Unknown symbols yield an empty path. Revisiting a symbol ends the
    /// walk, so self-links and link cycles terminate; a cyclic path simply
    /// stops at the last unvisited node instead of reaching a true root.
    pub fn path_to_root(&self, symbol: SymbolId) -> Vec<SymbolId> {
        if !self.contains(symbol) {
            return Vec::new();
        }
        let mut path = Vec::new();
        let mut seen: FxHashSet<SymbolId> = FxHashSet::default();
        let mut current = Some(symbol);
        while let Some(sym) = current {
            if !seen.insert(sym) {
                break;
            }
            path.push(sym);
            current = self.parent(sym);
        }
        path.reverse();
        path
    }
}

impl From<Vec<OntologyNode>> for OntologyTree {
    fn from(nodes: Vec<OntologyNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.symbol, slot))
            .collect();
        Self { nodes, index }
    }
}

impl From<OntologyTree> for Vec<OntologyNode> {
    fn from(tree: OntologyTree) -> Self {
        tree.nodes
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
