//! # Parallel-Group Adjacency
//!
//! Group pairings are stored as one directed edge row per pair, but the
//! domain relation is undirected: if group A is parallel with group B, B is
//! parallel with A. The builder here symmetrizes the stored edges into an
//! adjacency mapping the input assembler can embed per group.
//!
//! `BTreeMap`/`BTreeSet` keep iteration order deterministic, so the same
//! edge rows always produce the same solver input document.

use std::collections::{BTreeMap, BTreeSet};

use crate::store::GroupId;

/// Adjacency from a group to the set of groups it must never share a slot with.
pub type Adjacency = BTreeMap<GroupId, BTreeSet<GroupId>>;

/// Builds the undirected adjacency mapping from directed edge rows.
///
/// Each edge `(a, b)` inserts `b` into `a`'s set and `a` into `b`'s set.
/// Duplicate and reversed edges collapse; groups with no edges are absent
/// from the mapping (see [`partners`]). A self-edge is inserted as-is: the
/// solver, not this layer, decides what pairing a group with itself means.
pub fn adjacency(edges: impl IntoIterator<Item = (GroupId, GroupId)>) -> Adjacency {
    let mut adj = Adjacency::new();
    for (a, b) in edges {
        adj.entry(a).or_default().insert(b);
        adj.entry(b).or_default().insert(a);
    }
    adj
}

/// The partner list for one group; a missing key is an empty list.
pub fn partners(adj: &Adjacency, group: GroupId) -> Vec<GroupId> {
    adj.get(&group)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_directed_edge_is_symmetrized() {
        let adj = adjacency([(1, 2)]);
        assert_eq!(partners(&adj, 1), vec![2]);
        assert_eq!(partners(&adj, 2), vec![1]);
    }

    #[test]
    fn adjacency_is_symmetric_for_every_pair() {
        let adj = adjacency([(1, 2), (2, 3), (5, 1), (3, 1)]);
        for (&g, set) in &adj {
            for &other in set {
                assert!(
                    adj.get(&other).is_some_and(|s| s.contains(&g)),
                    "{} in adjacency({}) but not the reverse",
                    other,
                    g
                );
            }
        }
    }

    #[test]
    fn duplicate_and_reversed_edges_collapse() {
        let adj = adjacency([(1, 2), (1, 2), (2, 1)]);
        assert_eq!(partners(&adj, 1), vec![2]);
        assert_eq!(partners(&adj, 2), vec![1]);
    }

    #[test]
    fn unpaired_group_has_no_partners() {
        let adj = adjacency([(1, 2)]);
        assert!(partners(&adj, 99).is_empty());
    }

    #[test]
    fn self_edge_is_kept_as_is() {
        let adj = adjacency([(7, 7)]);
        assert_eq!(partners(&adj, 7), vec![7]);
    }
}
