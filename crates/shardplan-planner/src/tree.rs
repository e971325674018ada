//! Tree traversal and id-set queries.

use std::collections::HashSet;

use shardplan_core::id::NodeId;

use crate::logical::LogicalPlan;

/// Lazy post-order walk: children left to right, then the node.
pub struct PostOrder<'a> {
    stack: Vec<(&'a LogicalPlan, bool)>,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = &'a LogicalPlan;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, expanded)) = self.stack.pop() {
            if expanded {
                return Some(node);
            }
            self.stack.push((node, true));
            for child in node.children().iter().rev() {
                self.stack.push((child.as_ref(), false));
            }
        }
        None
    }
}

impl LogicalPlan {
    pub fn post_order(&self) -> PostOrder<'_> {
        PostOrder {
            stack: vec![(self, false)],
        }
    }

    /// Ids of every node in the subtree, this one included.
    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.post_order().map(|n| n.id()).collect()
    }

    /// True when the two subtrees share no node id.
    pub fn is_disjoint(&self, other: &LogicalPlan) -> bool {
        let mine = self.node_ids();
        other.post_order().all(|n| !mine.contains(&n.id()))
    }

    pub fn num_nodes(&self) -> usize {
        self.post_order().count()
    }
}
