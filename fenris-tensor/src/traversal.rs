//! Traversal of shared-node expression graphs.
use crate::Expr;
use rustc_hash::FxHashMap;
use std::error::Error;
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

/// A node in a directed graph that is expected to be acyclic.
pub trait DagNode: Sized {
    /// Identifies a node. Two handles with the same key are the same node.
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;

    fn children(&self) -> Vec<Self>;
}

impl<T> DagNode for Expr<T> {
    type Key = usize;

    fn key(&self) -> usize {
        self.node_id()
    }

    fn children(&self) -> Vec<Self> {
        Expr::children(self)
    }
}

/// Returned when a traversal reaches a node that is one of its own ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<K> {
    node: K,
}

impl<K> CycleError<K> {
    /// A node on the detected cycle.
    pub fn node(&self) -> &K {
        &self.node
    }
}

impl<K: Debug> fmt::Display for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Expression graph contains a cycle through node {:?}", self.node)
    }
}

impl<K: Debug> Error for CycleError<K> {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mark {
    Open,
    Done,
}

/// Collects every node reachable from `roots`, children before parents.
///
/// Each distinct node appears exactly once, no matter how many parents refer to it. The
/// traversal uses an explicit stack, so arbitrarily deep graphs are fine.
pub fn traversal<N: DagNode>(roots: impl IntoIterator<Item = N>) -> Result<Vec<N>, CycleError<N::Key>> {
    let mut marks: FxHashMap<N::Key, Mark> = FxHashMap::default();
    let mut order = Vec::new();
    let mut stack = Vec::new();

    for root in roots {
        stack.push((root, false));
        while let Some((node, expanded)) = stack.pop() {
            let key = node.key();
            if expanded {
                marks.insert(key, Mark::Done);
                order.push(node);
                continue;
            }
            match marks.get(&key) {
                Some(Mark::Done) => continue,
                // An open node is still waiting for its own children below us on the stack,
                // so reaching it again means one of its descendants points back to it.
                Some(Mark::Open) => return Err(CycleError { node: key }),
                None => {}
            }
            marks.insert(key, Mark::Open);
            let children = node.children();
            stack.push((node, true));
            for child in children.into_iter().rev() {
                if marks.get(&child.key()) != Some(&Mark::Done) {
                    stack.push((child, false));
                }
            }
        }
    }

    Ok(order)
}
