use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, trace};

use crate::store::{Neighbor, Relationship, RelationshipStore};
use crate::text::{escape_markup, join_lines};

/// Depth bound used by [`compute`]. The traversal keeps its own stack, so
/// this only guards against runaway input, not stack overflow.
pub const DEFAULT_MAX_DEPTH: usize = 65_536;

/// How a node's children are counted when spreading them horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Spacing {
    /// Spread only the distinct neighbors that are still unvisited.
    #[default]
    Unvisited,
    /// Spread over the whole neighbor list, including the already placed
    /// parent and duplicate entries. Placed entries keep their slot empty.
    RawNeighbors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Start the traversal here instead of at the first person added.
    pub root: Option<String>,
    pub spacing: Spacing,
    pub max_depth: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            root: None,
            spacing: Spacing::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown root `{0}`")]
    UnknownRoot(String),

    #[error("graph too deep: more than {limit} levels below the root")]
    TooDeep { limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Number of traversal steps from the root.
    pub depth: usize,
    /// Relationships declared with this node as the source.
    pub outgoing: Vec<Neighbor>,
}

impl NodePosition {
    /// Traversal level: 0 at the root, decreasing by one per step.
    pub fn level(&self) -> i64 {
        -(self.depth as i64)
    }

    /// The node id followed by one `target: relationship` line per
    /// outgoing relationship. Markup in names is escaped so only the
    /// separators break lines.
    pub fn label(&self) -> String {
        let lines = std::iter::once(escape_markup(&self.id).into_owned()).chain(
            self.outgoing.iter().map(|n| {
                format!("{}: {}", escape_markup(&n.person), escape_markup(&n.label))
            }),
        );
        join_lines(lines)
    }
}

/// Positions of every person reachable from the root, in placement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<Relationship>,
    index: HashMap<String, usize>,
}

impl Layout {
    pub fn get(&self, id: &str) -> Option<&NodePosition> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest level reached, or `None` for an empty layout.
    pub fn max_depth(&self) -> Option<usize> {
        self.nodes.iter().map(|n| n.depth).max()
    }

    /// Edges whose endpoints were both placed.
    pub fn drawable_edges(&self) -> impl Iterator<Item = (&NodePosition, &NodePosition)> {
        self.edges
            .iter()
            .filter_map(|e| Some((self.get(&e.from)?, self.get(&e.to)?)))
    }

    fn place(&mut self, node: NodePosition) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }
}

struct Frame<'a> {
    id: &'a str,
    depth: usize,
    x: f64,
}

/// Lay out `store` from its first person with default options.
///
/// Fails with [`LayoutError::TooDeep`] when a node sits more than
/// [`DEFAULT_MAX_DEPTH`] levels below the root; use
/// [`compute_with_options`] to change the bound.
pub fn compute(store: &RelationshipStore) -> Result<Layout, LayoutError> {
    compute_with_options(store, &LayoutOptions::default())
}

pub fn compute_with_options(
    store: &RelationshipStore,
    options: &LayoutOptions,
) -> Result<Layout, LayoutError> {
    let mut layout = Layout {
        edges: store.edges().to_vec(),
        ..Layout::default()
    };

    let root = match &options.root {
        Some(root) if store.contains(root) => root.as_str(),
        Some(root) => return Err(LayoutError::UnknownRoot(root.clone())),
        None => match store.first() {
            Some(first) => first,
            None => return Ok(layout),
        },
    };

    let mut outgoing: HashMap<&str, Vec<Neighbor>> = HashMap::new();
    for edge in store.edges() {
        outgoing.entry(edge.from.as_str()).or_default().push(Neighbor {
            person: edge.to.clone(),
            label: edge.label.clone(),
        });
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![Frame {
        id: root,
        depth: 0,
        x: 0.0,
    }];

    while let Some(frame) = stack.pop() {
        if !visited.insert(frame.id) {
            continue;
        }
        if frame.depth > options.max_depth {
            return Err(LayoutError::TooDeep {
                limit: options.max_depth,
            });
        }

        trace!(id = frame.id, depth = frame.depth, x = frame.x, "placed");
        layout.place(NodePosition {
            id: frame.id.to_string(),
            x: frame.x,
            y: 0.0 - frame.depth as f64,
            depth: frame.depth,
            outgoing: outgoing.remove(frame.id).unwrap_or_default(),
        });

        let slots = child_slots(store.neighbors(frame.id), &visited, options.spacing);
        // Reversed so the leftmost child is expanded first.
        for (id, offset) in slots.into_iter().rev() {
            stack.push(Frame {
                id,
                depth: frame.depth + 1,
                x: frame.x + offset,
            });
        }
    }

    debug!(
        root,
        placed = layout.len(),
        people = store.len(),
        "layout computed"
    );
    Ok(layout)
}

/// Horizontal offset of each child relative to its parent.
fn child_slots<'a>(
    neighbors: &'a [Neighbor],
    visited: &HashSet<&str>,
    spacing: Spacing,
) -> Vec<(&'a str, f64)> {
    match spacing {
        Spacing::Unvisited => {
            let mut seen: HashSet<&str> = HashSet::new();
            let children: Vec<&str> = neighbors
                .iter()
                .map(|n| n.person.as_str())
                .filter(|id| !visited.contains(*id) && seen.insert(*id))
                .collect();
            let k = children.len();
            children
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id, spread(i, k)))
                .collect()
        }
        Spacing::RawNeighbors => {
            let k = neighbors.len();
            neighbors
                .iter()
                .enumerate()
                .filter(|(_, n)| !visited.contains(n.person.as_str()))
                .map(|(i, n)| (n.person.as_str(), spread(i, k)))
                .collect()
        }
    }
}

/// Children span parent_x - 1 ..= parent_x + 1; a lone child sits straight below.
fn spread(i: usize, k: usize) -> f64 {
    if k <= 1 {
        0.0
    } else {
        -1.0 + i as f64 * (2.0 / (k - 1) as f64)
    }
}
